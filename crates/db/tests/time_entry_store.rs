//! Integration tests for the time-entry consistency rules.

mod common;

use assert_matches::assert_matches;
use chrono::{TimeDelta, Utc};
use common::{closed_entry, migrate, minutes_ago, project, task};
use focus_core::error::CoreError;
use focus_core::task_status::TaskStatus;
use focus_core::time_tracking::MAX_DURATION_SECS;
use focus_db::models::time_entry::{
    CreateTimeEntry, StartTimeEntry, StopTimeEntry, UpdateTimeEntry,
};
use focus_db::repositories::{TaskRepo, TimeEntryRepo};
use focus_db::StoreError;
use sqlx::SqlitePool;

async fn setup(pool: &SqlitePool) -> i64 {
    migrate(pool).await;
    let p = project(pool, "Tracking").await;
    task(pool, p.id, "Tracked task").await.id
}

fn start_for(task_id: i64) -> StartTimeEntry {
    StartTimeEntry {
        task_id,
        description: None,
    }
}

fn entry_between(task_id: i64, start_min_ago: i64, end_min_ago: Option<i64>) -> CreateTimeEntry {
    CreateTimeEntry {
        task_id,
        start_time: minutes_ago(start_min_ago),
        end_time: end_min_ago.map(minutes_ago),
        description: None,
    }
}

fn business_rule(err: StoreError) -> String {
    match err {
        StoreError::Core(CoreError::BusinessRule(msg)) => msg,
        other => panic!("expected business rule violation, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn create_round_trips(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let input = CreateTimeEntry {
        description: Some("Deep work".into()),
        ..entry_between(task_id, 90, Some(30))
    };

    let created = TimeEntryRepo::create(&pool, &input).await.unwrap();
    let fetched = TimeEntryRepo::find_by_id(&pool, created.id).await.unwrap().unwrap();

    assert_eq!(fetched.start_time, input.start_time);
    assert_eq!(fetched.end_time, input.end_time);
    assert_eq!(fetched.duration, Some(3600));
    assert_eq!(fetched.description.as_deref(), Some("Deep work"));
}

#[sqlx::test(migrations = false)]
async fn create_for_missing_task_is_referential(pool: SqlitePool) {
    setup(&pool).await;

    let err = TimeEntryRepo::create(&pool, &entry_between(999, 60, Some(30)))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Referential(_)));
}

#[sqlx::test(migrations = false)]
async fn create_enforces_temporal_and_duration_bounds(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    let future = CreateTimeEntry {
        start_time: Utc::now() + TimeDelta::hours(1),
        ..entry_between(task_id, 0, None)
    };
    let msg = business_rule(TimeEntryRepo::create(&pool, &future).await.unwrap_err());
    assert!(msg.contains("in the future"));

    let stale = CreateTimeEntry {
        start_time: Utc::now() - TimeDelta::days(31),
        ..entry_between(task_id, 0, None)
    };
    let msg = business_rule(TimeEntryRepo::create(&pool, &stale).await.unwrap_err());
    assert!(msg.contains("30 days"));

    let backwards = entry_between(task_id, 30, Some(60));
    let msg = business_rule(TimeEntryRepo::create(&pool, &backwards).await.unwrap_err());
    assert!(msg.contains("before start"));

    let too_short = CreateTimeEntry {
        end_time: Some(minutes_ago(60) + TimeDelta::seconds(30)),
        start_time: minutes_ago(60),
        ..entry_between(task_id, 0, None)
    };
    let msg = business_rule(TimeEntryRepo::create(&pool, &too_short).await.unwrap_err());
    assert!(msg.contains("at least 1 minute"));

    let too_long = entry_between(task_id, 26 * 60, Some(60));
    let msg = business_rule(TimeEntryRepo::create(&pool, &too_long).await.unwrap_err());
    assert!(msg.contains("24 hours"));

    assert!(TimeEntryRepo::list_by_task(&pool, task_id).await.unwrap().is_empty());
}

#[sqlx::test(migrations = false)]
async fn overlapping_closed_entries_are_rejected(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let existing = closed_entry(&pool, task_id, 120, 60).await;

    for (start, end) in [(150, 90), (90, 30), (110, 70), (180, 10)] {
        let err = TimeEntryRepo::create(&pool, &entry_between(task_id, start, Some(end)))
            .await
            .unwrap_err();
        assert!(business_rule(err).contains("overlaps"), "[{start}, {end}) should overlap");
    }

    // Touching on either side is fine.
    let before = CreateTimeEntry {
        task_id,
        start_time: existing.start_time - TimeDelta::minutes(30),
        end_time: Some(existing.start_time),
        description: None,
    };
    TimeEntryRepo::create(&pool, &before).await.unwrap();

    let after = CreateTimeEntry {
        task_id,
        start_time: existing.end_time.unwrap(),
        end_time: Some(existing.end_time.unwrap() + TimeDelta::minutes(20)),
        description: None,
    };
    TimeEntryRepo::create(&pool, &after).await.unwrap();
}

#[sqlx::test(migrations = false)]
async fn entries_of_other_tasks_never_overlap(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let tracked = TaskRepo::find_by_id(&pool, task_id).await.unwrap().unwrap();
    let sibling = task(&pool, tracked.project_id, "Sibling").await;

    closed_entry(&pool, task_id, 120, 60).await;
    closed_entry(&pool, sibling.id, 120, 60).await;
}

#[sqlx::test(migrations = false)]
async fn closed_entry_after_running_start_is_rejected(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    TimeEntryRepo::create(&pool, &entry_between(task_id, 30, None))
        .await
        .unwrap();

    let crossing = entry_between(task_id, 60, Some(10));
    let msg = business_rule(TimeEntryRepo::create(&pool, &crossing).await.unwrap_err());
    assert!(msg.contains("overlaps"));

    // Entirely before the running entry is allowed.
    closed_entry(&pool, task_id, 90, 40).await;
}

#[sqlx::test(migrations = false)]
async fn open_entry_backdated_over_closed_entry_is_rejected(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let closed = closed_entry(&pool, task_id, 90, 60).await;

    let backdated = entry_between(task_id, 120, None);
    let msg = business_rule(TimeEntryRepo::create(&pool, &backdated).await.unwrap_err());
    assert!(msg.contains(&closed.id.to_string()), "{msg}");
    assert!(TimeEntryRepo::find_active(&pool, task_id).await.unwrap().is_none());

    // Starting once the closed entry has ended is fine.
    TimeEntryRepo::create(&pool, &entry_between(task_id, 60, None))
        .await
        .unwrap();
}

#[sqlx::test(migrations = false)]
async fn moving_running_start_back_over_closed_entry_is_rejected(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    closed_entry(&pool, task_id, 90, 60).await;
    let running = TimeEntryRepo::create(&pool, &entry_between(task_id, 30, None))
        .await
        .unwrap();

    let patch = UpdateTimeEntry {
        start_time: Some(minutes_ago(75)),
        ..Default::default()
    };
    let msg = business_rule(TimeEntryRepo::update(&pool, running.id, &patch).await.unwrap_err());
    assert!(msg.contains("overlaps"), "{msg}");

    let unchanged = TimeEntryRepo::find_by_id(&pool, running.id).await.unwrap().unwrap();
    assert_eq!(unchanged.start_time, running.start_time);
}

#[sqlx::test(migrations = false)]
async fn second_open_entry_via_create_conflicts(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    TimeEntryRepo::create(&pool, &entry_between(task_id, 30, None))
        .await
        .unwrap();

    let err = TimeEntryRepo::create(&pool, &entry_between(task_id, 10, None))
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(_)));
}

// ---------------------------------------------------------------------------
// Start / stop
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn start_then_stop(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    let started = TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();
    assert!(started.is_active());
    assert_eq!(started.duration, None);

    let active = TimeEntryRepo::find_active(&pool, task_id).await.unwrap().unwrap();
    assert_eq!(active.id, started.id);

    let stopped = TimeEntryRepo::stop(&pool, task_id, &StopTimeEntry::default())
        .await
        .unwrap();
    assert_eq!(stopped.id, started.id);
    assert!(stopped.end_time.unwrap() >= stopped.start_time);
    assert!(stopped.duration.unwrap() >= 0);

    assert!(TimeEntryRepo::find_active(&pool, task_id).await.unwrap().is_none());
}

#[sqlx::test(migrations = false)]
async fn stop_caps_long_running_entry_at_duration_limit(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let running = TimeEntryRepo::create(&pool, &entry_between(task_id, 30 * 60, None))
        .await
        .unwrap();

    let stopped = TimeEntryRepo::stop(&pool, task_id, &StopTimeEntry::default())
        .await
        .unwrap();
    assert_eq!(stopped.id, running.id);
    assert_eq!(stopped.duration, Some(MAX_DURATION_SECS));
    assert_eq!(
        stopped.end_time,
        Some(running.start_time + TimeDelta::seconds(MAX_DURATION_SECS))
    );
}

#[sqlx::test(migrations = false)]
async fn start_while_running_conflicts(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();

    let err = TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Conflict(msg)) if msg.contains("active"));
}

#[sqlx::test(migrations = false)]
async fn at_most_one_open_entry_across_cycles(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    for _ in 0..3 {
        TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();
        assert!(TimeEntryRepo::start(&pool, &start_for(task_id)).await.is_err());
        TimeEntryRepo::stop(&pool, task_id, &StopTimeEntry::default())
            .await
            .unwrap();
    }

    let entries = TimeEntryRepo::list_by_task(&pool, task_id).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert!(entries.iter().all(|e| !e.is_active()));
}

#[sqlx::test(migrations = false)]
async fn start_on_finished_task_is_rejected(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    for status in [TaskStatus::Completed, TaskStatus::Cancelled] {
        TaskRepo::update_status(&pool, task_id, status).await.unwrap();
        let msg = business_rule(TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap_err());
        assert!(msg.contains(status.as_str()), "{msg}");
    }

    TaskRepo::update_status(&pool, task_id, TaskStatus::InProgress).await.unwrap();
    TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();
}

#[sqlx::test(migrations = false)]
async fn start_for_missing_task_is_referential(pool: SqlitePool) {
    setup(&pool).await;

    let err = TimeEntryRepo::start(&pool, &start_for(4242)).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::Referential(_)));
}

#[sqlx::test(migrations = false)]
async fn stop_without_running_entry_is_not_found(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    let err = TimeEntryRepo::stop(&pool, task_id, &StopTimeEntry::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = false)]
async fn stop_description_overwrites_only_when_non_empty(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    let input = StartTimeEntry {
        task_id,
        description: Some("Original".into()),
    };
    TimeEntryRepo::start(&pool, &input).await.unwrap();
    let kept = TimeEntryRepo::stop(
        &pool,
        task_id,
        &StopTimeEntry {
            description: Some(String::new()),
        },
    )
    .await
    .unwrap();
    assert_eq!(kept.description.as_deref(), Some("Original"));

    TimeEntryRepo::start(&pool, &input).await.unwrap();
    let replaced = TimeEntryRepo::stop(
        &pool,
        task_id,
        &StopTimeEntry {
            description: Some("Wrapped up".into()),
        },
    )
    .await
    .unwrap();
    assert_eq!(replaced.description.as_deref(), Some("Wrapped up"));
}

// ---------------------------------------------------------------------------
// Update / delete
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn update_recomputes_duration(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let entry = closed_entry(&pool, task_id, 120, 90).await;

    let input = UpdateTimeEntry {
        end_time: Some(entry.start_time + TimeDelta::minutes(45)),
        ..Default::default()
    };
    let updated = TimeEntryRepo::update(&pool, entry.id, &input).await.unwrap();

    assert_eq!(updated.start_time, entry.start_time);
    assert_eq!(updated.duration, Some(45 * 60));
}

#[sqlx::test(migrations = false)]
async fn update_ignores_itself_but_not_neighbours(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let early = closed_entry(&pool, task_id, 200, 150).await;
    closed_entry(&pool, task_id, 100, 60).await;

    let shift_within = UpdateTimeEntry {
        start_time: Some(early.start_time + TimeDelta::minutes(10)),
        ..Default::default()
    };
    TimeEntryRepo::update(&pool, early.id, &shift_within).await.unwrap();

    let into_neighbour = UpdateTimeEntry {
        end_time: Some(minutes_ago(80)),
        ..Default::default()
    };
    let err = TimeEntryRepo::update(&pool, early.id, &into_neighbour)
        .await
        .unwrap_err();
    assert!(business_rule(err).contains("overlaps"));
}

#[sqlx::test(migrations = false)]
async fn update_validates_merged_row(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let entry = closed_entry(&pool, task_id, 60, 30).await;

    let input = UpdateTimeEntry {
        start_time: Some(minutes_ago(10)),
        ..Default::default()
    };
    let msg = business_rule(TimeEntryRepo::update(&pool, entry.id, &input).await.unwrap_err());
    assert!(msg.contains("before start"));
}

#[sqlx::test(migrations = false)]
async fn update_missing_entry_is_not_found(pool: SqlitePool) {
    setup(&pool).await;

    let err = TimeEntryRepo::update(&pool, 31337, &UpdateTimeEntry::default())
        .await
        .unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

#[sqlx::test(migrations = false)]
async fn delete_removes_entry_once(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let entry = closed_entry(&pool, task_id, 60, 30).await;

    TimeEntryRepo::delete(&pool, entry.id).await.unwrap();
    assert!(TimeEntryRepo::find_by_id(&pool, entry.id).await.unwrap().is_none());

    let err = TimeEntryRepo::delete(&pool, entry.id).await.unwrap_err();
    assert_matches!(err, StoreError::Core(CoreError::NotFound { .. }));
}

// ---------------------------------------------------------------------------
// Queries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = false)]
async fn listings_are_latest_first(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let project_id = TaskRepo::find_by_id(&pool, task_id).await.unwrap().unwrap().project_id;
    let sibling = task(&pool, project_id, "Sibling").await;

    let oldest = closed_entry(&pool, task_id, 300, 240).await;
    let newest = closed_entry(&pool, task_id, 60, 30).await;
    let middle = closed_entry(&pool, sibling.id, 200, 150).await;

    let by_task: Vec<i64> = TimeEntryRepo::list_by_task(&pool, task_id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(by_task, vec![newest.id, oldest.id]);

    let by_project: Vec<i64> = TimeEntryRepo::list_by_project(&pool, project_id)
        .await
        .unwrap()
        .iter()
        .map(|e| e.id)
        .collect();
    assert_eq!(by_project, vec![newest.id, middle.id, oldest.id]);
}

#[sqlx::test(migrations = false)]
async fn listings_for_missing_parents_are_not_found(pool: SqlitePool) {
    setup(&pool).await;

    assert_matches!(
        TimeEntryRepo::list_by_task(&pool, 999).await.unwrap_err(),
        StoreError::Core(CoreError::NotFound { entity: "Task", .. })
    );
    assert_matches!(
        TimeEntryRepo::list_by_project(&pool, 999).await.unwrap_err(),
        StoreError::Core(CoreError::NotFound { entity: "Project", .. })
    );
    assert_matches!(
        TimeEntryRepo::find_active(&pool, 999).await.unwrap_err(),
        StoreError::Core(CoreError::NotFound { .. })
    );
}

#[sqlx::test(migrations = false)]
async fn all_active_spans_tasks(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let project_id = TaskRepo::find_by_id(&pool, task_id).await.unwrap().unwrap().project_id;
    let sibling = task(&pool, project_id, "Sibling").await;

    TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();
    TimeEntryRepo::start(&pool, &start_for(sibling.id)).await.unwrap();
    closed_entry(&pool, task_id, 120, 60).await;

    let active = TimeEntryRepo::list_active(&pool).await.unwrap();
    assert_eq!(active.len(), 2);
    assert!(active.iter().all(|e| e.is_active()));
}

#[sqlx::test(migrations = false)]
async fn time_statistics_cover_closed_entries(pool: SqlitePool) {
    let task_id = setup(&pool).await;
    let first = closed_entry(&pool, task_id, 300, 240).await;
    let last = closed_entry(&pool, task_id, 100, 80).await;
    TimeEntryRepo::start(&pool, &start_for(task_id)).await.unwrap();

    let stats = TimeEntryRepo::time_statistics(&pool, task_id).await.unwrap();
    assert_eq!(stats.task_id, task_id);
    assert_eq!(stats.total_entries, 2);
    assert_eq!(stats.total_duration, 80 * 60);
    assert_eq!(stats.avg_duration, 40 * 60);
    assert_eq!(stats.first_entry, Some(first.start_time));
    assert_eq!(stats.last_entry, Some(last.start_time));
}

#[sqlx::test(migrations = false)]
async fn time_statistics_without_entries_are_zero(pool: SqlitePool) {
    let task_id = setup(&pool).await;

    let stats = TimeEntryRepo::time_statistics(&pool, task_id).await.unwrap();
    assert_eq!(stats.total_entries, 0);
    assert_eq!(stats.total_duration, 0);
    assert_eq!(stats.first_entry, None);
}

//! Repository for the `time_entries` table.
//!
//! Every write runs the consistency pipeline from
//! [`focus_core::time_tracking`] inside the same transaction that performs
//! it: task lookup, trackability (start only), temporal and duration bounds,
//! the single running entry rule, then overlap against the task's other
//! entries.

use chrono::{TimeDelta, Utc};
use focus_core::error::CoreError;
use focus_core::task_status::{ensure_trackable, TaskStatus};
use focus_core::time_tracking::{
    duration_secs, ensure_no_active_entry, ensure_no_overlap, validate_bounds, TrackedInterval,
    MAX_DURATION_SECS,
};
use focus_core::types::{DbId, Timestamp};
use sqlx::SqliteConnection;

use crate::error::StoreResult;
use crate::models::statistics::TimeStatistics;
use crate::models::time_entry::{
    CreateTimeEntry, StartTimeEntry, StopTimeEntry, TimeEntry, UpdateTimeEntry,
};
use crate::DbPool;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, task_id, start_time, end_time, duration, description, created_at";

/// Same columns qualified with the `te` alias, for joins.
const TE_COLUMNS: &str =
    "te.id, te.task_id, te.start_time, te.end_time, te.duration, te.description, te.created_at";

fn not_found(id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: "Time entry",
        id,
    }
}

fn missing_task(task_id: DbId) -> CoreError {
    CoreError::Referential(format!("task {task_id} does not exist"))
}

/// Provides time tracking operations.
pub struct TimeEntryRepo;

impl TimeEntryRepo {
    /// Record an entry with explicit start and optional end.
    pub async fn create(pool: &DbPool, input: &CreateTimeEntry) -> StoreResult<TimeEntry> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        if Self::task_status(&mut *tx, input.task_id).await?.is_none() {
            return Err(missing_task(input.task_id).into());
        }

        validate_bounds(input.start_time, input.end_time, now)?;

        let existing = Self::intervals(&mut *tx, input.task_id).await?;
        ensure_no_overlap(input.start_time, input.end_time, &existing, None)?;

        let duration = input.end_time.map(|end| duration_secs(input.start_time, end));
        let query = format!(
            "INSERT INTO time_entries (task_id, start_time, end_time, duration, description, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(input.task_id)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(duration)
            .bind(&input.description)
            .bind(now)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(entry_id = entry.id, task_id = entry.task_id, "Time entry created");
        Ok(entry)
    }

    /// Open a running entry for a task, starting now.
    pub async fn start(pool: &DbPool, input: &StartTimeEntry) -> StoreResult<TimeEntry> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let status = Self::task_status(&mut *tx, input.task_id)
            .await?
            .ok_or_else(|| missing_task(input.task_id))?;
        ensure_trackable(status)?;

        validate_bounds(now, None, now)?;

        let active = Self::active_entry(&mut *tx, input.task_id).await?;
        ensure_no_active_entry(input.task_id, active.map(|entry| entry.id))?;

        let query = format!(
            "INSERT INTO time_entries (task_id, start_time, description, created_at)
             VALUES ($1, $2, $3, $2)
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(input.task_id)
            .bind(now)
            .bind(&input.description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(entry_id = entry.id, task_id = entry.task_id, "Time entry started");
        Ok(entry)
    }

    /// Close the running entry of a task at the current time.
    pub async fn stop(pool: &DbPool, task_id: DbId, input: &StopTimeEntry) -> StoreResult<TimeEntry> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let active = Self::active_entry(&mut *tx, task_id)
            .await?
            .ok_or(CoreError::NotFound {
                entity: "Active time entry for task",
                id: task_id,
            })?;

        // A start slightly in the future (clock skew) must not yield end < start.
        // An entry left running past the duration limit is closed at the limit.
        let end = now
            .max(active.start_time)
            .min(active.start_time + TimeDelta::seconds(MAX_DURATION_SECS));
        let duration = duration_secs(active.start_time, end);
        let description = input
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(active.description.as_deref());

        let query = format!(
            "UPDATE time_entries SET end_time = $2, duration = $3, description = $4
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(active.id)
            .bind(end)
            .bind(duration)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::info!(
            entry_id = entry.id,
            task_id,
            duration_secs = duration,
            "Time entry stopped"
        );
        Ok(entry)
    }

    /// Find an entry by its ID.
    pub async fn find_by_id(pool: &DbPool, id: DbId) -> StoreResult<Option<TimeEntry>> {
        let query = format!("SELECT {COLUMNS} FROM time_entries WHERE id = $1");
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(entry)
    }

    /// All entries of a task, latest start first.
    pub async fn list_by_task(pool: &DbPool, task_id: DbId) -> StoreResult<Vec<TimeEntry>> {
        let mut conn = pool.acquire().await?;
        if Self::task_status(&mut *conn, task_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }
            .into());
        }

        let query = format!(
            "SELECT {COLUMNS} FROM time_entries WHERE task_id = $1
             ORDER BY start_time DESC, id DESC"
        );
        let entries = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(entries)
    }

    /// All entries of every task in a project, latest start first.
    pub async fn list_by_project(pool: &DbPool, project_id: DbId) -> StoreResult<Vec<TimeEntry>> {
        let mut conn = pool.acquire().await?;
        if !super::row_exists(&mut *conn, "projects", project_id).await? {
            return Err(CoreError::NotFound {
                entity: "Project",
                id: project_id,
            }
            .into());
        }

        let query = format!(
            "SELECT {TE_COLUMNS} FROM time_entries te
             JOIN tasks t ON t.id = te.task_id
             WHERE t.project_id = $1
             ORDER BY te.start_time DESC, te.id DESC"
        );
        let entries = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(project_id)
            .fetch_all(&mut *conn)
            .await?;
        Ok(entries)
    }

    /// The running entry of a task, if any.
    pub async fn find_active(pool: &DbPool, task_id: DbId) -> StoreResult<Option<TimeEntry>> {
        let mut conn = pool.acquire().await?;
        if Self::task_status(&mut *conn, task_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }
            .into());
        }
        Self::active_entry(&mut *conn, task_id).await
    }

    /// Every running entry across all tasks, latest start first.
    pub async fn list_active(pool: &DbPool) -> StoreResult<Vec<TimeEntry>> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries WHERE end_time IS NULL
             ORDER BY start_time DESC, id DESC"
        );
        let entries = sqlx::query_as::<_, TimeEntry>(&query).fetch_all(pool).await?;
        Ok(entries)
    }

    /// Patch an entry. The merged row is validated like a new one, ignoring
    /// the entry itself for overlap.
    pub async fn update(pool: &DbPool, id: DbId, input: &UpdateTimeEntry) -> StoreResult<TimeEntry> {
        let now = Utc::now();
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM time_entries WHERE id = $1");
        let current = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| not_found(id))?;

        let start = input.start_time.unwrap_or(current.start_time);
        let end = input.end_time.or(current.end_time);
        let description = input.description.as_ref().or(current.description.as_ref());

        validate_bounds(start, end, now)?;

        let existing = Self::intervals(&mut *tx, current.task_id).await?;
        ensure_no_overlap(start, end, &existing, Some(id))?;

        let duration = end.map(|end| duration_secs(start, end));
        let query = format!(
            "UPDATE time_entries SET start_time = $2, end_time = $3, duration = $4, description = $5
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(id)
            .bind(start)
            .bind(end)
            .bind(duration)
            .bind(description)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        tracing::debug!(entry_id = id, "Time entry updated");
        Ok(entry)
    }

    /// Delete an entry.
    pub async fn delete(pool: &DbPool, id: DbId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM time_entries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found(id).into());
        }
        tracing::info!(entry_id = id, "Time entry deleted");
        Ok(())
    }

    /// Totals over a task's closed entries.
    pub async fn time_statistics(pool: &DbPool, task_id: DbId) -> StoreResult<TimeStatistics> {
        let mut conn = pool.acquire().await?;
        if Self::task_status(&mut *conn, task_id).await?.is_none() {
            return Err(CoreError::NotFound {
                entity: "Task",
                id: task_id,
            }
            .into());
        }

        let row: (i64, i64, i64, Option<Timestamp>, Option<Timestamp>) = sqlx::query_as(
            "SELECT
                COUNT(*),
                COALESCE(SUM(duration), 0),
                CAST(COALESCE(AVG(duration), 0) AS INTEGER),
                MIN(start_time),
                MAX(start_time)
             FROM time_entries
             WHERE task_id = $1 AND end_time IS NOT NULL",
        )
        .bind(task_id)
        .fetch_one(&mut *conn)
        .await?;

        let (total_entries, total_duration, avg_duration, first_entry, last_entry) = row;
        Ok(TimeStatistics {
            task_id,
            total_entries,
            total_duration,
            avg_duration,
            first_entry,
            last_entry,
        })
    }

    // -- helpers ------------------------------------------------------------

    async fn task_status(
        conn: &mut SqliteConnection,
        task_id: DbId,
    ) -> StoreResult<Option<TaskStatus>> {
        let row: Option<(String,)> = sqlx::query_as("SELECT status FROM tasks WHERE id = $1")
            .bind(task_id)
            .fetch_optional(conn)
            .await?;
        match row {
            Some((status,)) => Ok(Some(TaskStatus::parse(&status)?)),
            None => Ok(None),
        }
    }

    async fn active_entry(
        conn: &mut SqliteConnection,
        task_id: DbId,
    ) -> StoreResult<Option<TimeEntry>> {
        let query = format!(
            "SELECT {COLUMNS} FROM time_entries WHERE task_id = $1 AND end_time IS NULL
             ORDER BY start_time DESC LIMIT 1"
        );
        let entry = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_optional(conn)
            .await?;
        Ok(entry)
    }

    async fn intervals(
        conn: &mut SqliteConnection,
        task_id: DbId,
    ) -> StoreResult<Vec<TrackedInterval>> {
        let query = format!("SELECT {COLUMNS} FROM time_entries WHERE task_id = $1");
        let entries = sqlx::query_as::<_, TimeEntry>(&query)
            .bind(task_id)
            .fetch_all(conn)
            .await?;
        Ok(entries.iter().map(TimeEntry::interval).collect())
    }
}

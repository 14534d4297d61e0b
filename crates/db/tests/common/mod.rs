//! Shared fixtures for repository tests.

#![allow(dead_code)]

use chrono::{TimeDelta, Utc};
use focus_core::types::{DbId, Timestamp};
use focus_db::models::project::{CreateProject, Project};
use focus_db::models::task::{CreateTask, Task};
use focus_db::models::time_entry::{CreateTimeEntry, TimeEntry};
use focus_db::repositories::{ProjectRepo, TaskRepo, TimeEntryRepo};
use sqlx::SqlitePool;

pub async fn migrate(pool: &SqlitePool) {
    focus_db::run_migrations(pool).await.unwrap();
}

pub fn new_project(name: &str) -> CreateProject {
    CreateProject {
        name: name.to_string(),
        description: None,
        color: "#FF0000".to_string(),
        icon: "folder".to_string(),
    }
}

pub fn new_task(project_id: DbId, title: &str) -> CreateTask {
    CreateTask {
        project_id,
        parent_id: None,
        title: title.to_string(),
        description: None,
        status: None,
        priority: 0,
        due_date: None,
    }
}

pub async fn project(pool: &SqlitePool, name: &str) -> Project {
    ProjectRepo::create(pool, &new_project(name)).await.unwrap()
}

pub async fn task(pool: &SqlitePool, project_id: DbId, title: &str) -> Task {
    TaskRepo::create(pool, &new_task(project_id, title)).await.unwrap()
}

pub async fn subtask(pool: &SqlitePool, project_id: DbId, parent_id: DbId, title: &str) -> Task {
    let input = CreateTask {
        parent_id: Some(parent_id),
        ..new_task(project_id, title)
    };
    TaskRepo::create(pool, &input).await.unwrap()
}

pub fn minutes_ago(n: i64) -> Timestamp {
    Utc::now() - TimeDelta::minutes(n)
}

/// A closed entry `[start_min_ago, end_min_ago)` minutes before now.
pub async fn closed_entry(
    pool: &SqlitePool,
    task_id: DbId,
    start_min_ago: i64,
    end_min_ago: i64,
) -> TimeEntry {
    let input = CreateTimeEntry {
        task_id,
        start_time: minutes_ago(start_min_ago),
        end_time: Some(minutes_ago(end_min_ago)),
        description: None,
    };
    TimeEntryRepo::create(pool, &input).await.unwrap()
}

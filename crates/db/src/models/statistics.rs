//! Aggregate read models.

use focus_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Task and time totals for one project.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct ProjectStatistics {
    pub project_id: DbId,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub cancelled_tasks: i64,
    pub total_time_entries: i64,
    pub total_tracked_seconds: i64,
}

/// Task breakdown for one project.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TaskStatistics {
    pub project_id: DbId,
    pub total_tasks: i64,
    pub pending_tasks: i64,
    pub in_progress_tasks: i64,
    pub completed_tasks: i64,
    pub cancelled_tasks: i64,
    pub root_tasks: i64,
    pub subtasks: i64,
    /// Not completed or cancelled, with a due date in the past.
    pub overdue_tasks: i64,
    pub average_priority: f64,
    /// Completed share of all tasks, `0.0..=1.0`.
    pub completion_rate: f64,
}

/// Totals over the closed entries of one task.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct TimeStatistics {
    pub task_id: DbId,
    pub total_entries: i64,
    pub total_duration: i64,
    pub avg_duration: i64,
    pub first_entry: Option<Timestamp>,
    pub last_entry: Option<Timestamp>,
}

//! Time entry model and DTOs.

use focus_core::sanitize::{sanitize_description, sanitize_optional, Sanitize};
use focus_core::time_tracking::TrackedInterval;
use focus_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `time_entries` table. `end_time == None` means running.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TimeEntry {
    pub id: DbId,
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    /// Whole seconds, only set once the entry is closed.
    pub duration: Option<i64>,
    pub description: Option<String>,
    pub created_at: Timestamp,
}

impl TimeEntry {
    pub fn interval(&self) -> TrackedInterval {
        TrackedInterval {
            id: self.id,
            start: self.start_time,
            end: self.end_time,
        }
    }

    pub fn is_active(&self) -> bool {
        self.end_time.is_none()
    }
}

/// DTO for recording an entry with explicit times.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTimeEntry {
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub task_id: DbId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Sanitize for CreateTimeEntry {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

/// DTO for starting a running entry at the current time.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StartTimeEntry {
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub task_id: DbId,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Sanitize for StartTimeEntry {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

/// DTO for stopping the running entry of a task.
///
/// A non-empty description replaces the stored one.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct StopTimeEntry {
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Sanitize for StopTimeEntry {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

/// DTO for editing an entry. Absent fields keep their stored value.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTimeEntry {
    pub start_time: Option<Timestamp>,
    pub end_time: Option<Timestamp>,
    #[validate(length(max = 500, message = "Must be at most 500 characters"))]
    pub description: Option<String>,
}

impl Sanitize for UpdateTimeEntry {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

/// Query filters for `GET /time-entries`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TimeEntryFilter {
    pub task_id: Option<DbId>,
    pub project_id: Option<DbId>,
}

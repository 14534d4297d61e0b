//! Task status values and the time-tracking eligibility rule.
//!
//! There is no transition graph: any status may move to any other status,
//! including reopening a completed task.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_IN_PROGRESS: &str = "in_progress";
pub const STATUS_COMPLETED: &str = "completed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// All valid task statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_PENDING,
    STATUS_IN_PROGRESS,
    STATUS_COMPLETED,
    STATUS_CANCELLED,
];

/// Lifecycle status of a task, stored as TEXT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::InProgress => STATUS_IN_PROGRESS,
            Self::Completed => STATUS_COMPLETED,
            Self::Cancelled => STATUS_CANCELLED,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_IN_PROGRESS => Ok(Self::InProgress),
            STATUS_COMPLETED => Ok(Self::Completed),
            STATUS_CANCELLED => Ok(Self::Cancelled),
            other => Err(CoreError::Validation(format!(
                "Unknown task status: '{other}'. Valid statuses: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }

    /// Whether new time entries may be recorded against a task in this status.
    pub fn is_trackable(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for TaskStatus {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// Reject time tracking on completed or cancelled tasks.
pub fn ensure_trackable(status: TaskStatus) -> Result<(), CoreError> {
    match status {
        TaskStatus::Completed => Err(CoreError::BusinessRule(
            "cannot track time on completed task".to_string(),
        )),
        TaskStatus::Cancelled => Err(CoreError::BusinessRule(
            "cannot track time on cancelled task".to_string(),
        )),
        TaskStatus::Pending | TaskStatus::InProgress => Ok(()),
    }
}

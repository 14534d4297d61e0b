//! Task entity model and DTOs.

use focus_core::sanitize::{sanitize_description, sanitize_optional, sanitize_task_title, Sanitize};
use focus_core::task_status::TaskStatus;
use focus_core::types::{double_option, DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

/// A row from the `tasks` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Task {
    pub id: DbId,
    pub project_id: DbId,
    pub parent_id: Option<DbId>,
    pub title: String,
    pub description: Option<String>,
    #[sqlx(try_from = "String")]
    pub status: TaskStatus,
    pub priority: i64,
    pub due_date: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new task.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTask {
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub project_id: DbId,
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub parent_id: Option<DbId>,
    #[validate(length(min = 1, max = 200, message = "Must be between 1 and 200 characters"))]
    pub title: String,
    #[validate(length(max = 1000, message = "Must be at most 1000 characters"))]
    pub description: Option<String>,
    /// Defaults to `pending`.
    pub status: Option<TaskStatus>,
    #[validate(range(min = 0, max = 10, message = "Must be between 0 and 10"))]
    #[serde(default)]
    pub priority: i64,
    pub due_date: Option<Timestamp>,
}

impl Sanitize for CreateTask {
    fn sanitize(&mut self) {
        self.title = sanitize_task_title(&self.title);
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

/// DTO for updating a task. Absent fields keep their value.
///
/// `parent_id` and `due_date` accept an explicit `null` to clear them.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateTask {
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub project_id: Option<DbId>,
    #[serde(default, deserialize_with = "double_option")]
    pub parent_id: Option<Option<DbId>>,
    #[validate(length(min = 1, max = 200, message = "Must be between 1 and 200 characters"))]
    pub title: Option<String>,
    #[validate(length(max = 1000, message = "Must be at most 1000 characters"))]
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    #[validate(range(min = 0, max = 10, message = "Must be between 0 and 10"))]
    pub priority: Option<i64>,
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<Timestamp>>,
}

impl Sanitize for UpdateTask {
    fn sanitize(&mut self) {
        sanitize_optional(&mut self.title, sanitize_task_title);
        sanitize_optional(&mut self.description, sanitize_description);
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskStatus {
    pub status: TaskStatus,
}

impl Sanitize for UpdateTaskStatus {
    fn sanitize(&mut self) {}
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTaskPriority {
    #[validate(range(min = 0, max = 10, message = "Must be between 0 and 10"))]
    pub priority: i64,
}

impl Sanitize for UpdateTaskPriority {
    fn sanitize(&mut self) {}
}

/// One `{task_id, priority}` pair of a batch reorder.
///
/// `id` / `position` are accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct TaskOrder {
    #[serde(alias = "id")]
    #[validate(range(min = 1, message = "Must be a positive id"))]
    pub task_id: DbId,
    #[serde(alias = "position")]
    #[validate(range(min = 0, max = 10, message = "Must be between 0 and 10"))]
    pub priority: i64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReorderTasks {
    #[validate(length(min = 1, message = "At least one task is required"), nested)]
    pub tasks: Vec<TaskOrder>,
}

impl Sanitize for ReorderTasks {
    fn sanitize(&mut self) {}
}

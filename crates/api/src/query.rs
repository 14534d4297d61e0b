//! Query parameter types for list endpoints.

use focus_core::types::DbId;
use serde::Deserialize;

/// `GET /tasks?project_id=` parameters. `project_id` is required.
#[derive(Debug, Deserialize)]
pub struct TaskListParams {
    pub project_id: Option<DbId>,
}

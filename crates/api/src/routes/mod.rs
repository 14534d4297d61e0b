pub mod health;
pub mod project;
pub mod task;
pub mod time_entry;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /projects        project CRUD, statistics, nested task / time-entry listings
/// /tasks           task CRUD, status, priority, reorder, nested time tracking
/// /time-entries    time-entry CRUD, start, running entries
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/projects", project::router())
        .nest("/tasks", task::router())
        .nest("/time-entries", time_entry::router())
}

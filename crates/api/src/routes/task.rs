//! Route definitions for the `/tasks` resource, including per-task time tracking.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::{task, time_entry};
use crate::state::AppState;

/// Routes mounted at `/tasks`.
///
/// ```text
/// GET    /?project_id=                 -> list
/// POST   /                             -> create
/// POST   /reorder                      -> reorder
/// GET    /{id}                         -> get_by_id
/// PUT    /{id}                         -> update
/// DELETE /{id}                         -> delete
/// PATCH  /{id}/status                  -> update_status
/// PATCH  /{id}/priority                -> update_priority
/// GET    /{id}/subtasks                -> list_subtasks
/// GET    /{id}/time-entries            -> time_entry::list_by_task
/// GET    /{id}/time-entries/active     -> time_entry::get_active
/// POST   /{id}/time-entries/stop       -> time_entry::stop
/// GET    /{id}/time-stats              -> time_entry::time_statistics
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(task::list).post(task::create))
        .route("/reorder", post(task::reorder))
        .route(
            "/{id}",
            get(task::get_by_id).put(task::update).delete(task::delete),
        )
        .route("/{id}/status", patch(task::update_status))
        .route("/{id}/priority", patch(task::update_priority))
        .route("/{id}/subtasks", get(task::list_subtasks))
        .route("/{id}/time-entries", get(time_entry::list_by_task))
        .route("/{id}/time-entries/active", get(time_entry::get_active))
        .route("/{id}/time-entries/stop", post(time_entry::stop))
        .route("/{id}/time-stats", get(time_entry::time_statistics))
}

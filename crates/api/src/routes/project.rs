//! Route definitions for the `/projects` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::{project, task, time_entry};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                        -> list
/// POST   /                        -> create
/// GET    /with-counts             -> list_with_task_counts
/// GET    /{id}                    -> get_by_id
/// PUT    /{id}                    -> update
/// DELETE /{id}                    -> delete
/// GET    /{id}/statistics         -> statistics
/// GET    /{id}/tasks              -> task::list_by_project
/// GET    /{id}/task-statistics    -> task::statistics
/// GET    /{id}/time-entries       -> time_entry::list_by_project
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/with-counts", get(project::list_with_task_counts))
        .route(
            "/{id}",
            get(project::get_by_id)
                .put(project::update)
                .delete(project::delete),
        )
        .route("/{id}/statistics", get(project::statistics))
        .route("/{id}/tasks", get(task::list_by_project))
        .route("/{id}/task-statistics", get(task::statistics))
        .route("/{id}/time-entries", get(time_entry::list_by_project))
}

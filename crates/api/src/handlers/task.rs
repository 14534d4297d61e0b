//! Handlers for the `/tasks` resource.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use focus_core::error::CoreError;
use focus_db::models::statistics::TaskStatistics;
use focus_db::models::task::{
    CreateTask, ReorderTasks, Task, UpdateTask, UpdateTaskPriority, UpdateTaskStatus,
};
use focus_db::repositories::TaskRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{PathId, ValidJson};
use crate::query::TaskListParams;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/tasks?project_id=
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<TaskListParams>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let Query(params) =
        params.map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
    let project_id = match params.project_id {
        Some(id) if id > 0 => id,
        Some(_) => {
            return Err(AppError::BadRequest(
                "project_id must be a positive integer".into(),
            ))
        }
        None => {
            return Err(AppError::BadRequest(
                "project_id query parameter is required".into(),
            ))
        }
    };
    let tasks = TaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(tasks)))
}

/// GET /api/v1/projects/{id}/tasks
pub async fn list_by_project(
    State(state): State<AppState>,
    PathId(project_id): PathId,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = TaskRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(tasks)))
}

/// POST /api/v1/tasks
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateTask>,
) -> AppResult<(StatusCode, Json<DataResponse<Task>>)> {
    let task = TaskRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(task, "Task created successfully")),
    ))
}

/// GET /api/v1/tasks/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Task", id }))?;
    Ok(Json(DataResponse::new(task)))
}

/// PUT /api/v1/tasks/{id}
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateTask>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse::with_message(task, "Task updated successfully")))
}

/// PATCH /api/v1/tasks/{id}/status
pub async fn update_status(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateTaskStatus>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::update_status(&state.pool, id, input.status).await?;
    Ok(Json(DataResponse::with_message(
        task,
        "Task status updated successfully",
    )))
}

/// PATCH /api/v1/tasks/{id}/priority
pub async fn update_priority(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateTaskPriority>,
) -> AppResult<Json<DataResponse<Task>>> {
    let task = TaskRepo::update_priority(&state.pool, id, input.priority).await?;
    Ok(Json(DataResponse::with_message(
        task,
        "Task priority updated successfully",
    )))
}

/// POST /api/v1/tasks/reorder
pub async fn reorder(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<ReorderTasks>,
) -> AppResult<Json<DataResponse<()>>> {
    TaskRepo::reorder(&state.pool, &input.tasks).await?;
    Ok(Json(DataResponse::with_message(
        (),
        "Tasks reordered successfully",
    )))
}

/// GET /api/v1/tasks/{id}/subtasks
pub async fn list_subtasks(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<Vec<Task>>>> {
    let tasks = TaskRepo::list_subtasks(&state.pool, id).await?;
    Ok(Json(DataResponse::new(tasks)))
}

/// DELETE /api/v1/tasks/{id}
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<()>>> {
    TaskRepo::delete(&state.pool, id).await?;
    Ok(Json(DataResponse::with_message((), "Task deleted successfully")))
}

/// GET /api/v1/projects/{id}/task-statistics
pub async fn statistics(
    State(state): State<AppState>,
    PathId(project_id): PathId,
) -> AppResult<Json<DataResponse<TaskStatistics>>> {
    let stats = TaskRepo::statistics(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(stats)))
}

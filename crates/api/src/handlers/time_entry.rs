//! Handlers for time tracking: `/time-entries` plus the per-task routes
//! under `/tasks/{id}/time-entries`.

use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use focus_core::error::CoreError;
use focus_db::models::statistics::TimeStatistics;
use focus_db::models::time_entry::{
    CreateTimeEntry, StartTimeEntry, StopTimeEntry, TimeEntry, TimeEntryFilter, UpdateTimeEntry,
};
use focus_db::repositories::TimeEntryRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{PathId, ValidJson};
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/v1/time-entries?task_id=&project_id=
///
/// `task_id` wins over `project_id`; with neither, lists running entries.
pub async fn list(
    State(state): State<AppState>,
    filter: Result<Query<TimeEntryFilter>, QueryRejection>,
) -> AppResult<Json<DataResponse<Vec<TimeEntry>>>> {
    let Query(filter) =
        filter.map_err(|e| AppError::BadRequest(format!("Invalid query: {}", e.body_text())))?;
    let entries = match (filter.task_id, filter.project_id) {
        (Some(task_id), _) => TimeEntryRepo::list_by_task(&state.pool, task_id).await?,
        (None, Some(project_id)) => {
            TimeEntryRepo::list_by_project(&state.pool, project_id).await?
        }
        (None, None) => TimeEntryRepo::list_active(&state.pool).await?,
    };
    Ok(Json(DataResponse::new(entries)))
}

/// POST /api/v1/time-entries
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateTimeEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<TimeEntry>>)> {
    let entry = TimeEntryRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(
            entry,
            "Time entry created successfully",
        )),
    ))
}

/// POST /api/v1/time-entries/start
pub async fn start(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<StartTimeEntry>,
) -> AppResult<(StatusCode, Json<DataResponse<TimeEntry>>)> {
    let entry = TimeEntryRepo::start(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(entry, "Time tracking started")),
    ))
}

/// POST /api/v1/tasks/{id}/time-entries/stop
///
/// The body is optional; `{"description": "..."}` replaces the stored text.
pub async fn stop(
    State(state): State<AppState>,
    PathId(task_id): PathId,
    body: Option<ValidJson<StopTimeEntry>>,
) -> AppResult<Json<DataResponse<TimeEntry>>> {
    let input = body.map(|ValidJson(input)| input).unwrap_or_default();
    let entry = TimeEntryRepo::stop(&state.pool, task_id, &input).await?;
    Ok(Json(DataResponse::with_message(entry, "Time tracking stopped")))
}

/// GET /api/v1/time-entries/active
pub async fn list_active(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<TimeEntry>>>> {
    let entries = TimeEntryRepo::list_active(&state.pool).await?;
    Ok(Json(DataResponse::new(entries)))
}

/// GET /api/v1/time-entries/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<TimeEntry>>> {
    let entry = TimeEntryRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Time entry",
            id,
        }))?;
    Ok(Json(DataResponse::new(entry)))
}

/// PUT /api/v1/time-entries/{id}
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateTimeEntry>,
) -> AppResult<Json<DataResponse<TimeEntry>>> {
    let entry = TimeEntryRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse::with_message(
        entry,
        "Time entry updated successfully",
    )))
}

/// DELETE /api/v1/time-entries/{id}
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<()>>> {
    TimeEntryRepo::delete(&state.pool, id).await?;
    Ok(Json(DataResponse::with_message(
        (),
        "Time entry deleted successfully",
    )))
}

/// GET /api/v1/tasks/{id}/time-entries
pub async fn list_by_task(
    State(state): State<AppState>,
    PathId(task_id): PathId,
) -> AppResult<Json<DataResponse<Vec<TimeEntry>>>> {
    let entries = TimeEntryRepo::list_by_task(&state.pool, task_id).await?;
    Ok(Json(DataResponse::new(entries)))
}

/// GET /api/v1/projects/{id}/time-entries
pub async fn list_by_project(
    State(state): State<AppState>,
    PathId(project_id): PathId,
) -> AppResult<Json<DataResponse<Vec<TimeEntry>>>> {
    let entries = TimeEntryRepo::list_by_project(&state.pool, project_id).await?;
    Ok(Json(DataResponse::new(entries)))
}

/// GET /api/v1/tasks/{id}/time-entries/active
pub async fn get_active(
    State(state): State<AppState>,
    PathId(task_id): PathId,
) -> AppResult<Json<DataResponse<TimeEntry>>> {
    let entry = TimeEntryRepo::find_active(&state.pool, task_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Active time entry for task",
            id: task_id,
        }))?;
    Ok(Json(DataResponse::new(entry)))
}

/// GET /api/v1/tasks/{id}/time-stats
pub async fn time_statistics(
    State(state): State<AppState>,
    PathId(task_id): PathId,
) -> AppResult<Json<DataResponse<TimeStatistics>>> {
    let stats = TimeEntryRepo::time_statistics(&state.pool, task_id).await?;
    Ok(Json(DataResponse::new(stats)))
}

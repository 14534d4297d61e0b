//! Handlers for the `/projects` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use focus_core::error::CoreError;
use focus_db::models::project::{CreateProject, Project, ProjectWithTaskCount, UpdateProject};
use focus_db::models::statistics::ProjectStatistics;
use focus_db::repositories::ProjectRepo;

use crate::error::{AppError, AppResult};
use crate::extract::{PathId, ValidJson};
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects
pub async fn create(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CreateProject>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let project = ProjectRepo::create(&state.pool, &input).await?;
    Ok((
        StatusCode::CREATED,
        Json(DataResponse::with_message(project, "Project created successfully")),
    ))
}

/// GET /api/v1/projects
pub async fn list(State(state): State<AppState>) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = ProjectRepo::list(&state.pool).await?;
    Ok(Json(DataResponse::new(projects)))
}

/// GET /api/v1/projects/with-counts
pub async fn list_with_task_counts(
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<ProjectWithTaskCount>>>> {
    let projects = ProjectRepo::list_with_task_counts(&state.pool).await?;
    Ok(Json(DataResponse::new(projects)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))?;
    Ok(Json(DataResponse::new(project)))
}

/// PUT /api/v1/projects/{id}
pub async fn update(
    State(state): State<AppState>,
    PathId(id): PathId,
    ValidJson(input): ValidJson<UpdateProject>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = ProjectRepo::update(&state.pool, id, &input).await?;
    Ok(Json(DataResponse::with_message(
        project,
        "Project updated successfully",
    )))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<()>>> {
    ProjectRepo::delete(&state.pool, id).await?;
    Ok(Json(DataResponse::with_message(
        (),
        "Project deleted successfully",
    )))
}

/// GET /api/v1/projects/{id}/statistics
pub async fn statistics(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> AppResult<Json<DataResponse<ProjectStatistics>>> {
    let stats = ProjectRepo::statistics(&state.pool, id).await?;
    Ok(Json(DataResponse::new(stats)))
}

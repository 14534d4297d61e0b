//! Tests for `AppError` → HTTP response mapping.
//!
//! These call `IntoResponse` directly on `AppError` values; no server needed.

use std::collections::BTreeMap;

use assert_matches::assert_matches;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use focus_api::error::AppError;
use focus_core::error::CoreError;
use focus_db::StoreError;
use http_body_util::BodyExt;

async fn error_to_response(err: AppError) -> (StatusCode, serde_json::Value) {
    let response = err.into_response();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    (status, json)
}

#[tokio::test]
async fn not_found_error_returns_404() {
    let err = AppError::Core(CoreError::NotFound {
        entity: "Project",
        id: 42,
    });

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "Project with id 42 not found");
}

#[tokio::test]
async fn referential_and_business_rule_errors_return_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Referential("project not found".into()))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "REFERENTIAL_VIOLATION");
    assert_eq!(json["error"], "project not found");

    let (status, json) = error_to_response(AppError::Core(CoreError::BusinessRule(
        "cannot track time on completed task".into(),
    )))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BUSINESS_RULE_VIOLATION");
}

#[tokio::test]
async fn validation_error_returns_400() {
    let (status, json) =
        error_to_response(AppError::Core(CoreError::Validation("empty batch".into()))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json.get("details").is_none());
}

#[tokio::test]
async fn invalid_input_carries_field_details() {
    let mut details = BTreeMap::new();
    details.insert("name".to_string(), "Must be between 1 and 100 characters".to_string());

    let (status, json) = error_to_response(AppError::InvalidInput { details }).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["details"]["name"], "Must be between 1 and 100 characters");
}

#[tokio::test]
async fn conflict_error_returns_409() {
    let err = AppError::Core(CoreError::Conflict(
        "task 1 already has an active time entry".into(),
    ));

    let (status, json) = error_to_response(err).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
}

#[tokio::test]
async fn bad_request_error_returns_400() {
    let (status, json) = error_to_response(AppError::BadRequest("invalid field value".into())).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
    assert_eq!(json["error"], "invalid field value");
}

#[tokio::test]
async fn rate_limited_returns_429() {
    let (status, json) = error_to_response(AppError::RateLimited).await;

    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["code"], "RATE_LIMITED");
}

#[tokio::test]
async fn internal_errors_hide_their_message() {
    let (status, json) =
        error_to_response(AppError::InternalError("disk on fire".into())).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["code"], "INTERNAL_ERROR");
    assert_eq!(json["error"], "An internal error occurred");

    let (status, json) =
        error_to_response(AppError::Core(CoreError::Internal("invariant broken".into()))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["error"], "An internal error occurred");
}

#[tokio::test]
async fn row_not_found_returns_404() {
    let (status, json) = error_to_response(AppError::Database(sqlx::Error::RowNotFound)).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["code"], "NOT_FOUND");
}

#[tokio::test]
async fn store_errors_convert_by_variant() {
    let core: AppError = StoreError::Core(CoreError::Conflict("busy".into())).into();
    assert_matches!(core, AppError::Core(CoreError::Conflict(_)));

    let db: AppError = StoreError::Database(sqlx::Error::PoolClosed).into();
    let (status, _) = error_to_response(db).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

//! Request extractors that turn malformed input into [`AppError`] responses.
//!
//! - [`ValidJson`] deserializes, sanitizes and validates a JSON body.
//! - [`PathId`] parses a positive `{id}` path segment.

use axum::body::Bytes;
use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, FromRequestParts, OptionalFromRequest, Path, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::Json;
use focus_core::sanitize::Sanitize;
use focus_core::types::DbId;
use focus_core::validation::field_messages;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::AppError;

/// JSON body that has been sanitized and validated.
///
/// Rejections:
/// - unparseable JSON or wrong content type -> `400 BAD_REQUEST`
/// - oversized body -> `413 PAYLOAD_TOO_LARGE`
/// - failed field rules -> `400 VALIDATION_ERROR` with per-field `details`
///
/// Wrapping in `Option` makes the body optional: an empty body yields `None`.
#[derive(Debug, Clone)]
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Sanitize,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = <Json<T> as FromRequest<S>>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        checked(value).map(ValidJson)
    }
}

impl<S, T> OptionalFromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Sanitize,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let bytes = <Bytes as FromRequest<S>>::from_request(req, state).await.map_err(|rejection| {
            if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
                AppError::PayloadTooLarge
            } else {
                AppError::BadRequest(rejection.body_text())
            }
        })?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(None);
        }

        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::BadRequest(format!("Invalid JSON format: {e}")))?;
        checked(value).map(|v| Some(ValidJson(v)))
    }
}

fn checked<T: Validate + Sanitize>(mut value: T) -> Result<T, AppError> {
    value.sanitize();
    value.validate().map_err(|errors| AppError::InvalidInput {
        details: field_messages(&errors),
    })?;
    Ok(value)
}

fn json_rejection(rejection: JsonRejection) -> AppError {
    if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge;
    }
    AppError::BadRequest(format!("Invalid JSON format: {}", rejection.body_text()))
}

/// A positive integer id taken from the single `{id}` path parameter.
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub DbId);

impl<S> FromRequestParts<S> for PathId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = <Path<DbId> as FromRequestParts<S>>::from_request_parts(parts, state)
            .await
            .map_err(|_| AppError::BadRequest("Invalid id: expected a positive integer".into()))?;
        if id <= 0 {
            return Err(AppError::BadRequest(
                "Invalid id: expected a positive integer".into(),
            ));
        }
        Ok(PathId(id))
    }
}

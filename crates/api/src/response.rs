//! Shared response envelope for API handlers.
//!
//! Every successful response is `{ "data": ..., "success": true }`, with an
//! optional `message` on mutations.

use serde::Serialize;

/// Standard success envelope.
///
/// ```ignore
/// Ok(Json(DataResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T: Serialize> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            success: true,
            message: None,
        }
    }

    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            data,
            success: true,
            message: Some(message.into()),
        }
    }
}

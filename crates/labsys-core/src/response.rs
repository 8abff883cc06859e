use axum::{
    Json,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::errors::ErrorCode;

/// The envelope every endpoint answers with.
///
/// Successful calls carry `error_code: "none"` and a `data` payload. Failures carry the error kind and a
/// message with `data` set to null.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub error_code: ErrorCode,
    pub message: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            error_code: ErrorCode::None,
            message: None,
            data: Some(data),
        }
    }

    pub fn failure(error_code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            error_code,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

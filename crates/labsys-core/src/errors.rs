//! Application error type.
//!
//! Every failure a handler can return is an [`AppError`]: an HTTP status, an
//! [`ErrorCode`] rendered into the response envelope, and the underlying
//! [`anyhow::Error`] for logs. System exceptions never echo their detail to
//! the client.

use anyhow::{Error, anyhow};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::permissions::InvalidCapability;
use crate::response::ApiResponse;

/// Machine readable error kind carried in every response envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    None,
    InvalidParams,
    InvalidCredentials,
    Unauthenticated,
    Forbidden,
    SystemException,
}

/// Why a request was rejected as invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum InvalidReason {
    #[error("user name must start with a letter and be 4-16 letters, digits or underscores")]
    MalformedNickname,
    #[error("power contains unknown capabilities")]
    UnknownCapability,
    #[error("password could not be decrypted")]
    UndecryptablePassword,
    #[error("password must be 8-20 printable characters with at least one letter and one digit")]
    WeakPassword,
    #[error("user name is already taken")]
    NicknameTaken,
    #[error("class number must be 4-16 letters, digits or dashes")]
    MalformedClassNo,
    #[error("class number already exists")]
    ClassNoTaken,
    #[error("class does not exist")]
    UnknownClass,
    #[error("user number must be 4-20 letters or digits")]
    MalformedUserNo,
    #[error("user number is already taken")]
    UserNoTaken,
    #[error("real name must be 1-30 letters, spaces, dots, apostrophes or hyphens")]
    MalformedRealName,
    #[error("verification code is wrong or expired")]
    BadVerificationCode,
}

impl From<InvalidCapability> for InvalidReason {
    fn from(_: InvalidCapability) -> Self {
        InvalidReason::UnknownCapability
    }
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub code: ErrorCode,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, code: ErrorCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            code,
            error: err.into(),
        }
    }

    /// Malformed or policy-violating input. Usually an [`InvalidReason`].
    pub fn invalid_params<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, ErrorCode::InvalidParams, err)
    }

    pub fn invalid_credentials() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::InvalidCredentials,
            anyhow!("invalid user name or password"),
        )
    }

    pub fn unauthenticated() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            ErrorCode::Unauthenticated,
            anyhow!("authentication required"),
        )
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            ErrorCode::Forbidden,
            anyhow!(detail.into()),
        )
    }

    /// Persistence failure or broken invariant. Logged, never shown.
    pub fn system<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::SystemException,
            err,
        )
    }

    /// The structured reason behind an `InvalidParams` error, if any.
    pub fn reason(&self) -> Option<InvalidReason> {
        self.error.downcast_ref::<InvalidReason>().copied()
    }

    fn client_message(&self) -> String {
        match self.code {
            ErrorCode::InvalidParams | ErrorCode::InvalidCredentials => self.error.to_string(),
            ErrorCode::Unauthenticated => "authentication required".to_string(),
            ErrorCode::Forbidden => "permission denied".to_string(),
            ErrorCode::SystemException | ErrorCode::None => "system exception".to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.code {
            ErrorCode::SystemException => {
                tracing::error!(error = ?self.error, "system exception");
            }
            ErrorCode::Forbidden => {
                tracing::info!(detail = %self.error, "request forbidden");
            }
            _ => {
                tracing::debug!(code = ?self.code, error = %self.error, "request rejected");
            }
        }

        let body = ApiResponse::<()>::failure(self.code, self.client_message());
        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::system(err)
    }
}

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use http::StatusCode;
use serde_json::json;

use sonora::{CoordinationError, SessionError, StorageError, UserError};

/// Marker left in the response extensions when a handler hit an internal error.
///
/// The logging middleware keys off this to count the failure and log it at error level;
/// the response itself goes out untouched.
#[derive(Clone, Debug)]
pub struct HandlerFailure {
    pub error_id: String,
    pub message: String,
}

/// Errors returned by JSON handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// 400 with the message shown to the caller
    Validation(String),
    /// 401
    Unauthorized,
    /// 404 with the message shown to the caller
    NotFound(String),
    /// 500; the message is logged, never returned
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoordinationError> for AppError {
    fn from(err: CoordinationError) -> Self {
        match err {
            CoordinationError::Validation(msg) => Self::Validation(msg),
            CoordinationError::InvalidCredentials => Self::Validation(err.to_string()),
            CoordinationError::Persistence(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        CoordinationError::from(err).into()
    }
}

impl From<SessionError> for AppError {
    fn from(err: SessionError) -> Self {
        Self::Internal(err.to_string())
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Internal(err.to_string())
    }
}

/// Builds a 500 response carrying [`HandlerFailure`]. `body` receives the error id.
pub(crate) fn internal_failure<F>(message: &str, body: F) -> Response
where
    F: FnOnce(&str) -> Response,
{
    let error_id = uuid::Uuid::new_v4().to_string();
    tracing::error!(
        component = "server",
        %error_id,
        error = %message,
        "Unhandled server error"
    );

    let mut response = body(&error_id);
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response.extensions_mut().insert(HandlerFailure {
        error_id,
        message: message.to_string(),
    });
    response
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        match self {
            Self::Validation(msg) | Self::NotFound(msg) => {
                (status, Json(json!({ "error": msg }))).into_response()
            }
            Self::Unauthorized => (
                status,
                Json(json!({ "error": "Authentication required" })),
            )
                .into_response(),
            Self::Internal(msg) => internal_failure(&msg, |error_id| {
                Json(json!({
                    "message": "Internal server error",
                    "errorId": error_id,
                }))
                .into_response()
            }),
        }
    }
}

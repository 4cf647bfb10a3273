//! HTTP error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use todo_core::{ErrorBody, ErrorDetail, TodoError};
use tracing::{debug, error};

pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const TODO_NOT_FOUND: &str = "TODO_NOT_FOUND";
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Message returned for every 500; the detail only goes to the log.
pub const INTERNAL_MESSAGE: &str = "An internal error occurred";

/// Error returned by every handler.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation {
        field: Option<String>,
        message: String,
    },

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: Some(field.into()),
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => VALIDATION_ERROR,
            Self::NotFound(_) => TODO_NOT_FOUND,
            Self::Internal(_) => INTERNAL_ERROR,
        }
    }
}

impl From<TodoError> for ApiError {
    fn from(err: TodoError) -> Self {
        debug!(kind = err.error_kind(), "request failed in repository");
        match err {
            TodoError::Validation { field, message } => Self::Validation { field, message },
            TodoError::NotFound(_) => Self::NotFound(err.to_string()),
            TodoError::StorageUnavailable(_) => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code().to_string();
        let (message, field) = match self {
            Self::Validation { field, message } => (message, field),
            Self::NotFound(message) => (message, None),
            Self::Internal(detail) => {
                error!(%detail, "request failed");
                (INTERNAL_MESSAGE.to_string(), None)
            }
        };
        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                field,
            },
        };
        (status, Json(body)).into_response()
    }
}

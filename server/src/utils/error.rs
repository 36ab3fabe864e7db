use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::db::RepoError;
use crate::utils::response::error as error_response;
use crate::validation::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid event id: {0}")]
    InvalidId(String),

    #[error("Event {0} not found")]
    NotFound(i64),

    #[error("Repository error: {0}")]
    Repository(#[from] RepoError),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) | AppError::InvalidId(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::InvalidId(_) => "INVALID_ID",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Repository(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => "Bad Request",
            AppError::InvalidId(_) => "invalid event id",
            AppError::NotFound(_) => "Event Not Found",
            AppError::Repository(_) => "Internal Server Error",
        }
    }

    fn log(&self) {
        match self {
            AppError::Repository(e) => error!(error = %e, "Repository error"),
            other => warn!(error = %other, "Request rejected"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();

        // Client mistakes carry their cause; storage failures stay internal.
        let details = match &self {
            AppError::BadRequest(cause) => Some(json!({ "cause": cause })),
            AppError::Validation(cause) => Some(json!({ "cause": cause.to_string() })),
            _ => None,
        };

        error_response(self.code(), self.public_message(), details, self.status_code())
    }
}

// src/error.rs
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use log::error;
use serde::Serialize;
use thiserror::Error;

use crate::repositories::post_repository::RepoError;
use crate::services::image_storage::StorageError;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Error taxonomy of the HTTP surface. Every handler returns this.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("repository error: {0}")]
    Repository(#[from] RepoError),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorResponse<'a> {
    status: &'a str,
    error: &'a str,
    message: String,
}

impl AppError {
    fn kind(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Unauthenticated(_) => "AUTHENTICATION_ERROR",
            AppError::Forbidden(_) => "AUTHORIZATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Repository(_) | AppError::Storage(_) | AppError::Internal(_) => {
                "INTERNAL_ERROR"
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Repository(_) | AppError::Storage(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        // server-side details stay in the log
        let message = if status.is_server_error() {
            error!("request failed: {}", self);
            "Something went wrong, please try again later".to_string()
        } else {
            self.to_string()
        };

        HttpResponse::build(status).json(ErrorResponse {
            status: "error",
            error: self.kind(),
            message,
        })
    }
}

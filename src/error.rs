//! Application error types and HTTP response mapping.
//!
//! Defines `AppError` enum for all error conditions and implements Axum's
//! `IntoResponse` to automatically convert errors to appropriate HTTP responses
//! with JSON error bodies.
//!
//! Error mappings:
//! - `RepoNotFound`, `PathNotFound`, `CommitNotFound`, `RevisionNotFound` → 404
//!   (a repository the caller may not view is reported as `RepoNotFound`)
//! - `InvalidArgument`, `Validation` → 400
//! - `Git`, `Io`, `Json`, `Registry`, `Internal` → 500

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Rejections of a management request. The message is shown to the caller verbatim.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("cannot change own permissions")]
    SelfModification,

    #[error("cannot change permissions of admin")]
    TargetIsAdmin,

    #[error("cannot change nonexistent user")]
    UnknownIdentity,

    #[error("repository name already taken: {0}")]
    NameTaken(String),

    #[error("{0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Commit not found: {0}")]
    CommitNotFound(String),

    #[error("Revision not found: {0}")]
    RevisionNotFound(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Invalid registry: {0}")]
    Registry(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            AppError::Git(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Io(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::Json(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            AppError::RepoNotFound(name) => {
                (StatusCode::NOT_FOUND, format!("Repository not found: {}", name))
            }
            AppError::PathNotFound(path) => {
                (StatusCode::NOT_FOUND, format!("Path not found: {}", path))
            }
            AppError::CommitNotFound(oid) => {
                (StatusCode::NOT_FOUND, format!("Commit not found: {}", oid))
            }
            AppError::RevisionNotFound(rev) => {
                (StatusCode::NOT_FOUND, format!("Revision not found: {}", rev))
            }
            AppError::InvalidArgument(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            AppError::Registry(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
        };

        if status.is_server_error() {
            tracing::error!("{}", error_message);
        }

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

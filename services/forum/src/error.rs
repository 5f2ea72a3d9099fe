//! Error types for the forum service

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::credentials::CredentialError;

/// Every failure the forum core can surface to a caller
#[derive(Error, Debug)]
pub enum ForumError {
    /// Malformed input or a referenced entity that does not exist
    #[error("validation error: {0}")]
    Validation(String),

    /// Uniqueness violation
    #[error("conflict: {0}")]
    Conflict(String),

    /// Missing or invalid session, or bad credentials
    #[error("unauthorized: {0}")]
    Auth(String),

    /// Store round-trip failure on a write path
    #[error("persistence error: {0}")]
    Persistence(#[source] sqlx::Error),

    /// Store failure while aggregating a read
    #[error("query error: {0}")]
    Query(#[source] sqlx::Error),

    /// Password hashing failure
    #[error(transparent)]
    Credential(#[from] CredentialError),

    /// Too many login attempts for one account
    #[error("too many requests: {0}")]
    RateLimited(String),
}

impl ForumError {
    /// Classify a write-path store error.
    ///
    /// A unique index violation means a concurrent writer won the race the
    /// guard checked for, so it surfaces as a conflict.
    pub fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ForumError::Conflict(conflict.to_string())
            }
            sqlx::Error::Database(db) if db.is_foreign_key_violation() => {
                ForumError::Validation(format!("referenced record does not exist: {}", db))
            }
            _ => ForumError::Persistence(err),
        }
    }
}

/// Type alias for forum results
pub type ForumResult<T> = Result<T, ForumError>;

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ForumError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ForumError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ForumError::Auth(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            ForumError::RateLimited(msg) => (StatusCode::TOO_MANY_REQUESTS, msg.clone()),
            ForumError::Persistence(_) | ForumError::Query(_) | ForumError::Credential(_) => {
                error!("Internal error: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

//! Unified error handling with Sentry integration.
//!
//! Every handler returns `Result<T, AppError>`. Errors render as
//! `{"detail": "..."}`; server errors are captured to Sentry and only a
//! generic message reaches the client.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;
use crate::services::auth::AuthError;

/// Detail returned for every 5xx response.
pub const INTERNAL_ERROR_DETAIL: &str = "Error interno del servidor";

/// Detail returned for every failed login or password check.
pub const INVALID_CREDENTIALS_DETAIL: &str = "Credenciales inválidas";

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl AppError {
    /// Map a repository error, naming the missing resource on `NotFound`.
    ///
    /// ```rust,ignore
    /// repo.delete(id).await.map_err(AppError::not_found_as("Pago no encontrado"))?;
    /// ```
    pub fn not_found_as(detail: &'static str) -> impl Fn(RepositoryError) -> Self {
        move |err| match err {
            RepositoryError::NotFound => Self::NotFound(detail.to_owned()),
            other => Self::Database(other),
        }
    }

    /// Whether this is a server-side failure.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(RepositoryError::Database(_))
                | Self::Auth(AuthError::Hash(_) | AuthError::Repository(RepositoryError::Database(_)))
        )
    }

    fn status_and_detail(&self) -> (StatusCode, String) {
        if self.is_server_error() {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_ERROR_DETAIL.to_owned(),
            );
        }

        match self {
            Self::Database(err) | Self::Auth(AuthError::Repository(err)) => repository_status(err),
            Self::Auth(err) => match err {
                AuthError::InvalidCredentials => (
                    StatusCode::UNAUTHORIZED,
                    INVALID_CREDENTIALS_DETAIL.to_owned(),
                ),
                AuthError::WeakPassword(msg) | AuthError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, msg.clone())
                }
                AuthError::Hash(_) | AuthError::Repository(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_ERROR_DETAIL.to_owned(),
                ),
            },
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        }
    }
}

fn repository_status(err: &RepositoryError) -> (StatusCode, String) {
    match err {
        RepositoryError::NotFound => (StatusCode::NOT_FOUND, "Recurso no encontrado".to_owned()),
        RepositoryError::InvalidReference(msg) => (StatusCode::NOT_FOUND, msg.clone()),
        RepositoryError::Conflict(msg) | RepositoryError::Validation(msg) => {
            (StatusCode::BAD_REQUEST, msg.clone())
        }
        RepositoryError::Database(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            INTERNAL_ERROR_DETAIL.to_owned(),
        ),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, detail) = self.status_and_detail();
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

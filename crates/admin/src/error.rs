//! Unified error handling with Sentry integration.
//!
//! Handlers return `Result<T, AppError>`. Server errors are captured to
//! Sentry before the response is rendered; clients only ever see a generic
//! message for them.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use thiserror::Error;

use crate::db::RepositoryError;
use crate::filters;
use crate::models::{CurrentUser, Viewer};
use crate::services::{ProductServiceError, SupplierServiceError, UploadError};

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// User lacks a claim.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Template rendering failure.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Session(_) | Self::Template(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn is_server_error(&self) -> bool {
        self.status().is_server_error()
    }
}

impl From<SupplierServiceError> for AppError {
    fn from(err: SupplierServiceError) -> Self {
        match err {
            SupplierServiceError::NotFound => Self::NotFound("supplier".to_owned()),
            SupplierServiceError::Repository(e) => Self::Database(e),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

impl From<ProductServiceError> for AppError {
    fn from(err: ProductServiceError) -> Self {
        match err {
            ProductServiceError::NotFound => Self::NotFound("product".to_owned()),
            ProductServiceError::Repository(e) => Self::Database(e),
            ProductServiceError::Upload(UploadError::Io(e)) => Self::Internal(e.to_string()),
            other => Self::BadRequest(other.to_string()),
        }
    }
}

/// Friendly error page.
#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorTemplate {
    pub viewer: Viewer,
    pub status: u16,
    pub title: &'static str,
    pub message: String,
}

impl ErrorTemplate {
    /// Page for a status code; unknown codes read as a server error.
    #[must_use]
    pub fn for_status(status: StatusCode, viewer: Viewer) -> Self {
        let (title, message) = match status {
            StatusCode::NOT_FOUND => (
                "Page not found",
                "The page you are looking for does not exist.",
            ),
            StatusCode::FORBIDDEN => (
                "Access denied",
                "You do not have permission to do this.",
            ),
            StatusCode::UNAUTHORIZED => ("Sign in required", "Please sign in to continue."),
            StatusCode::BAD_REQUEST => ("Bad request", "The request could not be processed."),
            _ => (
                "Something went wrong",
                "An error occurred. Please try again later or contact support.",
            ),
        };

        Self {
            viewer,
            status: status.as_u16(),
            title,
            message: message.to_owned(),
        }
    }

    /// Render with the given status; falls back to plain text if the
    /// template itself fails.
    #[must_use]
    pub fn into_response_with(self, status: StatusCode) -> Response {
        match self.render() {
            Ok(html) => (status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to render error page");
                (status, self.title).into_response()
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }

        let status = self.status();
        let mut page = ErrorTemplate::for_status(status, Viewer::default());
        // Client errors carry a message meant for the user.
        if let Self::BadRequest(msg) = &self {
            page.message.clone_from(msg);
        }
        page.into_response_with(status)
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context after sign-in.
pub fn set_sentry_user(user: &CurrentUser) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user.id.to_string()),
            email: Some(user.email.to_string()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context on sign-out.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("supplier".to_string());
        assert_eq!(err.to_string(), "Not found: supplier");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Forbidden("test".to_string())),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Internal("test".to_string())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_service_errors_map_to_status() {
        assert_eq!(
            AppError::from(SupplierServiceError::NotFound).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(SupplierServiceError::HasProducts).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(ProductServiceError::Upload(UploadError::Io(
                std::io::Error::other("disk")
            )))
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_page_titles() {
        assert_eq!(
            ErrorTemplate::for_status(StatusCode::NOT_FOUND, Viewer::default()).title,
            "Page not found"
        );
        assert_eq!(
            ErrorTemplate::for_status(StatusCode::IM_A_TEAPOT, Viewer::default()).title,
            "Something went wrong"
        );
    }
}

//! Error pages reachable by URL.
//!
//! Claim guards redirect to `/error/403`; other codes are only rendered
//! through [`AppError`](crate::error::AppError).

use axum::{
    extract::Path,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::error::ErrorTemplate;
use crate::middleware::OptionalAuth;
use crate::models::Viewer;

/// Map a requested code to the page shown. Anything unexpected is a 404.
fn page_status(code: u16) -> StatusCode {
    match code {
        403 => StatusCode::FORBIDDEN,
        500 => StatusCode::INTERNAL_SERVER_ERROR,
        _ => StatusCode::NOT_FOUND,
    }
}

/// `GET /error/{code}`
pub async fn show(OptionalAuth(user): OptionalAuth, Path(code): Path<u16>) -> Response {
    let status = page_status(code);
    ErrorTemplate::for_status(status, Viewer::new(user)).into_response_with(status)
}

/// Fallback for unmatched routes.
pub async fn not_found(OptionalAuth(user): OptionalAuth) -> impl IntoResponse {
    ErrorTemplate::for_status(StatusCode::NOT_FOUND, Viewer::new(user))
        .into_response_with(StatusCode::NOT_FOUND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_status() {
        assert_eq!(page_status(403), StatusCode::FORBIDDEN);
        assert_eq!(page_status(500), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(page_status(404), StatusCode::NOT_FOUND);
        assert_eq!(page_status(418), StatusCode::NOT_FOUND);
    }
}

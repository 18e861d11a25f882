//! Route-level HTTP errors.
//!
//! Very little in this app ends as an error response: public reads degrade
//! to empty collections, admin mutations convert repository failures into a
//! flash message plus redirect, and server-side failures reach Sentry
//! through the tracing layer's event filter. What remains is the plain HTTP
//! error for requests that never reach an operation at all.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Errors rendered directly as an HTTP response.
#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("material-123".to_string());
        assert_eq!(err.to_string(), "Not found: material-123");
    }

    #[test]
    fn test_not_found_status_code() {
        let response = AppError::NotFound("/no-such-page".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

//! Error-to-HTTP response conversion.
//!
//! Implements `IntoResponse` for the crate [`Error`](crate::error::Error) so
//! that route handlers can return `Result<T, AppError>` directly. Every
//! failure body has the same shape:
//! `{"status": "error", "error": {"code": <status>, "message": <text>}}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::error::Error;

/// Wrapper so we can implement `IntoResponse` for the core error type.
pub struct AppError(Error);

impl AppError {
    pub fn new(inner: Error) -> Self {
        Self(inner)
    }

    pub fn inner(&self) -> &Error {
        &self.0
    }
}

impl From<Error> for AppError {
    fn from(e: Error) -> Self {
        Self::new(e)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        // Server faults are unexpected and log-worthy; client-facing
        // outcomes (404, 415, ...) are not.
        if self.0.is_server_fault() {
            tracing::error!(
                status = %status,
                code = self.0.code(),
                error = %self.0,
                "Server error in API handler"
            );
        }

        let body = json!({
            "status": "error",
            "error": {
                "code": status.as_u16(),
                "message": self.0.to_string(),
            },
        });

        (status, axum::Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_produces_404() {
        let response = AppError::new(Error::not_found("abc")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn unsupported_conversion_produces_415() {
        let err = AppError::new(Error::UnsupportedConversion {
            from: "text/plain".into(),
            to: "png".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }

    #[test]
    fn type_mismatch_produces_400() {
        let err = AppError::new(Error::TypeMismatch {
            stored: "text/plain".into(),
            declared: "application/json".into(),
        });
        assert_eq!(err.into_response().status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn conflict_produces_409() {
        let err = AppError::new(Error::Conflict {
            expected: 1,
            current: 2,
        });
        assert_eq!(err.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn storage_error_produces_500() {
        let response = AppError::new(Error::storage("backend gone")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn unauthorized_produces_401() {
        let response = AppError::new(Error::Unauthorized).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}

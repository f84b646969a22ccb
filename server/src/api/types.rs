//! Shared API types
//!
//! Error handling for both surfaces: JSON for `/api/*` and static assets,
//! and an HTML page for form submissions.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use thiserror::Error;

use super::render;

/// Standard API error response
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{message}")]
    BadRequest { code: String, message: String },
    #[error("{message}")]
    NotFound { code: String, message: String },
    #[error("{message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn bad_request(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BadRequest {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFound {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    fn parts(&self) -> (StatusCode, &'static str, &str) {
        match self {
            Self::BadRequest { code, .. } => (StatusCode::BAD_REQUEST, "bad_request", code),
            Self::NotFound { code, .. } => (StatusCode::NOT_FOUND, "not_found", code),
            Self::Internal { .. } => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "INTERNAL",
            ),
        }
    }

    /// Render the error as a full HTML page for browser-facing routes
    pub fn into_page(self) -> Response {
        let (status, _, _) = self.parts();
        let body = render::error_page(status, &self.to_string());
        (status, Html(body)).into_response()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, code) = self.parts();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (
            status,
            Json(serde_json::json!({
                "error": error_type,
                "code": code,
                "message": self.to_string()
            })),
        )
            .into_response()
    }
}

//! Helper types and traits for cleaner route handlers.
//!
//! Every failure leaves the server as a JSON `{ "error": ... }` body with a
//! 4xx or 5xx status.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{error, warn};

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorBody { error: self.message })).into_response()
    }
}

impl From<pdf_overlay_core::Error> for ApiError {
    fn from(err: pdf_overlay_core::Error) -> Self {
        if err.is_client_error() {
            warn!("Rejected request: {}", err);
            Self::new(StatusCode::BAD_REQUEST, err.to_string())
        } else {
            error!("Overlay failed: {}", err);
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to process PDF: {err}"),
            )
        }
    }
}

/// Standard result type for route handlers.
pub type RouteResult<T> = Result<T, ApiError>;

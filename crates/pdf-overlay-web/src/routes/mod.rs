//! HTTP route handlers for the PDF overlay service.
//!
//! Requests and responses are JSON; PDFs travel as base64.

mod overlay;

pub use overlay::{method_not_allowed, overlay_pdf};

use axum::{Router, extract::DefaultBodyLimit, routing::post};
use std::sync::Arc;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router with its middleware stack.
pub fn app(state: Arc<AppState>) -> Router {
    let body_limit = state.body_limit();

    Router::new()
        .route("/", post(overlay_pdf).fallback(method_not_allowed))
        .route("/api/overlay", post(overlay_pdf).fallback(method_not_allowed))
        .layer(CompressionLayer::new())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

//! Overlay route - stamps text and watermarks onto a posted PDF.

use axum::{
    Json,
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use pdf_overlay_core::{OverlayRequest, encode_pdf_base64};
use serde::Serialize;
use std::sync::Arc;
use tracing::{Instrument, info, info_span};
use uuid::Uuid;

use crate::helpers::{ApiError, RouteResult};
use crate::state::AppState;

/// Successful overlay response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayResponse {
    pub pdf_base64: String,
    pub page_count: usize,
}

/// Apply the overlays described by the JSON body and return the new PDF.
///
/// The body is read as raw bytes so malformed JSON becomes a 400 with the
/// parser's message rather than axum's rejection text.
pub async fn overlay_pdf(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> RouteResult<Json<OverlayResponse>> {
    let span = info_span!("overlay", request_id = %Uuid::new_v4());
    let response = process(&state, &body).instrument(span).await?;
    Ok(Json(response))
}

async fn process(state: &AppState, body: &[u8]) -> RouteResult<OverlayResponse> {
    let request = OverlayRequest::from_json(body)?;
    let output = state.service.process(request).await?;

    info!("Returning {} page PDF", output.page_count);

    Ok(OverlayResponse {
        pdf_base64: encode_pdf_base64(&output.pdf_bytes),
        page_count: output.page_count,
    })
}

/// Any method other than POST.
pub async fn method_not_allowed() -> Response {
    let mut response =
        ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response();
    response
        .headers_mut()
        .insert(header::ALLOW, header::HeaderValue::from_static("POST"));
    response
}

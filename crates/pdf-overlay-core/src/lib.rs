//! PDF Overlay Core Library
//!
//! This library stamps text overlays and watermarks onto PDF documents:
//! - Lenient request normalization into placement instructions
//! - Page targeting and watermark anchoring
//! - Text drawing into PDF content streams (lopdf)
//! - Inline base64 and remote URL document sources

pub mod config;
pub mod error;
pub mod fetch;
pub mod overlay;
pub mod pdf;
pub mod source;
pub mod util;

pub use config::{AppConfig, FetchConfig, ServerConfig};
pub use error::{Error, Result};
pub use fetch::{ByteFetcher, HttpFetcher};
pub use overlay::{
    OverlayEngine, OverlayReport, OverlayRequest, PageSelector, PageSize, PlacementInstruction,
    Rgb, WatermarkPosition,
};
pub use pdf::{PdfDocument, TextRenderer, TextRun};
pub use source::{DocumentSource, decode_pdf_base64, encode_pdf_base64};

use std::sync::Arc;
use tracing::{Span, debug, info};

/// Result of overlaying a document
#[derive(Debug, Clone)]
pub struct OverlayOutput {
    /// Modified PDF bytes
    pub pdf_bytes: Vec<u8>,
    /// Number of pages, same as the input
    pub page_count: usize,
}

/// Apply a request's overlays to PDF bytes.
///
/// Runs synchronously: load, reject zero-page documents, normalize, draw, save.
/// Failures inside the engine are logged under the current span.
pub fn overlay_pdf(pdf_bytes: &[u8], request: &OverlayRequest) -> Result<OverlayOutput> {
    overlay_pdf_with_engine(pdf_bytes, request, &OverlayEngine::new())
}

/// Like [`overlay_pdf`], logging engine failures through `engine`'s span.
pub fn overlay_pdf_with_engine(
    pdf_bytes: &[u8],
    request: &OverlayRequest,
    engine: &OverlayEngine,
) -> Result<OverlayOutput> {
    let mut doc = PdfDocument::from_bytes(pdf_bytes)?;
    let page_count = doc.page_count();
    if page_count == 0 {
        return Err(Error::EmptyDocument);
    }

    let instructions = request.normalize(doc.page_sizes())?;
    debug!("Normalized request into {} instructions", instructions.len());

    let report = engine.apply(&mut doc, page_count, &instructions)?;
    let pdf_bytes = doc.save()?;

    info!(
        "Applied {} overlay draws to {} pages",
        report.draw_count, report.page_count
    );

    Ok(OverlayOutput {
        pdf_bytes,
        page_count: report.page_count,
    })
}

/// High-level service: resolves the document source, then overlays it.
pub struct OverlayService {
    fetcher: Arc<dyn ByteFetcher>,
    config: AppConfig,
}

impl OverlayService {
    /// Create a service fetching remote documents over HTTP
    pub fn new(config: AppConfig) -> Result<Self> {
        let fetcher = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self { fetcher, config })
    }

    /// Create with a custom fetcher
    pub fn with_fetcher(fetcher: Arc<dyn ByteFetcher>, config: AppConfig) -> Self {
        Self { fetcher, config }
    }

    pub const fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Resolve the request's document to raw PDF bytes.
    pub async fn load_document(&self, request: &OverlayRequest) -> Result<Vec<u8>> {
        match DocumentSource::from_request(request)? {
            DocumentSource::Inline(payload) => decode_pdf_base64(&payload),
            DocumentSource::Remote(url) => Ok(self.fetcher.fetch(&url).await?.to_vec()),
        }
    }

    /// Process a request end to end.
    ///
    /// The document is fully loaded before any overlay work starts; the
    /// CPU-bound part runs on the blocking pool.
    pub async fn process(&self, request: OverlayRequest) -> Result<OverlayOutput> {
        let bytes = self.load_document(&request).await?;
        let span = Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let engine = OverlayEngine::with_span(span.clone());
            overlay_pdf_with_engine(&bytes, &request, &engine)
        })
        .await
        .map_err(|e| Error::Task(e.to_string()))?
    }
}

use thiserror::Error;

/// Unified error type for pdf-overlay-core
///
/// Errors fall into two classes:
/// - Client input errors: the caller sent something unusable (no document,
///   bad base64, a zero-page document, nothing to draw)
/// - Processing failures: the document could not be loaded, fetched,
///   rendered or saved
///
/// Numeric and color values never produce errors; they fall back to defaults.
#[derive(Error, Debug)]
pub enum Error {
    // ==========================================================================
    // Request Errors
    // ==========================================================================
    /// The request body could not be understood at all
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Neither `pdfBase64` nor `pdfUrl` was supplied
    #[error("missing document: provide either pdfBase64 or pdfUrl")]
    MissingDocument,

    /// The `pdfBase64` payload was empty or not valid base64
    #[error("invalid pdfBase64: {0}")]
    InvalidBase64(String),

    /// The document loaded but has no pages
    #[error("document has no pages")]
    EmptyDocument,

    /// No text, texts or watermark.text was supplied
    #[error("nothing to render: provide text, texts, or watermark.text")]
    NoOverlays,

    // ==========================================================================
    // PDF Errors
    // ==========================================================================
    /// Failed to parse the PDF bytes
    #[error("failed to open PDF: {0}")]
    PdfOpen(String),

    /// Failed to draw overlay text onto a page
    #[error("failed to render page {page}: {reason}")]
    PdfRender { page: usize, reason: String },

    /// Failed to serialize the modified PDF
    #[error("failed to save PDF: {0}")]
    PdfSave(String),

    // ==========================================================================
    // Fetch Errors
    // ==========================================================================
    /// The HTTP request for `pdfUrl` failed before a response arrived
    #[error("failed to fetch PDF: {0}")]
    FetchRequest(String),

    /// The remote server answered with a non-success status
    #[error("failed to fetch PDF from {url}: HTTP {status}")]
    FetchStatus { url: String, status: u16 },

    /// The remote server answered with an empty body
    #[error("fetched PDF from {0} is empty")]
    FetchEmpty(String),

    /// The remote document exceeds the configured size limit
    #[error("fetched PDF is larger than {limit} bytes")]
    FetchTooLarge { limit: u64 },

    // ==========================================================================
    // Configuration Errors
    // ==========================================================================
    /// Failed to load configuration file
    #[error("failed to load config: {0}")]
    ConfigLoad(String),

    // ==========================================================================
    // Runtime Errors
    // ==========================================================================
    /// A background processing task panicked or was cancelled
    #[error("overlay task failed: {0}")]
    Task(String),
}

impl Error {
    /// Whether the caller can fix this error by changing the request.
    ///
    /// HTTP callers map `true` to 400 and `false` to 500.
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidRequest(_)
                | Self::MissingDocument
                | Self::InvalidBase64(_)
                | Self::EmptyDocument
                | Self::NoOverlays
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_classification() {
        assert!(Error::MissingDocument.is_client_error());
        assert!(Error::EmptyDocument.is_client_error());
        assert!(Error::NoOverlays.is_client_error());
        assert!(Error::InvalidBase64("bad".to_string()).is_client_error());

        assert!(!Error::PdfOpen("broken".to_string()).is_client_error());
        assert!(!Error::FetchEmpty("https://example.com/a.pdf".to_string()).is_client_error());
        assert!(!Error::PdfRender { page: 0, reason: "x".to_string() }.is_client_error());
    }

    #[test]
    fn test_messages_name_fields() {
        assert!(Error::MissingDocument.to_string().contains("pdfBase64"));
        assert!(Error::MissingDocument.to_string().contains("pdfUrl"));
        assert!(Error::NoOverlays.to_string().contains("watermark.text"));
    }
}

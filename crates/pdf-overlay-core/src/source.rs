//! Where the input PDF comes from, and base64 transport encoding.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::error::{Error, Result};
use crate::overlay::OverlayRequest;

/// The document named by a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSource {
    /// Inline base64 payload (prefix not yet stripped)
    Inline(String),
    /// Remote URL to fetch
    Remote(String),
}

impl DocumentSource {
    /// Pick the document source out of a request.
    ///
    /// Exactly one of `pdfBase64` / `pdfUrl` must be set. Blank strings
    /// count as absent.
    pub fn from_request(request: &OverlayRequest) -> Result<Self> {
        let inline = request.pdf_base64.as_deref().filter(|s| !s.trim().is_empty());
        let remote = request.pdf_url.as_deref().map(str::trim).filter(|s| !s.is_empty());

        match (inline, remote) {
            (Some(data), None) => Ok(Self::Inline(data.to_string())),
            (None, Some(url)) => Ok(Self::Remote(url.to_string())),
            (Some(_), Some(_)) => Err(Error::InvalidRequest(
                "provide only one of pdfBase64 or pdfUrl".to_string(),
            )),
            (None, None) => Err(Error::MissingDocument),
        }
    }
}

/// Decode a base64 PDF payload, tolerating a `data:...;base64,` prefix and
/// embedded whitespace.
pub fn decode_pdf_base64(payload: &str) -> Result<Vec<u8>> {
    let data = strip_data_uri(payload.trim());
    let compact: String = data.chars().filter(|c| !c.is_ascii_whitespace()).collect();

    if compact.is_empty() {
        return Err(Error::InvalidBase64("payload is empty".to_string()));
    }

    let bytes = STANDARD
        .decode(compact.as_bytes())
        .map_err(|e| Error::InvalidBase64(e.to_string()))?;

    if bytes.is_empty() {
        return Err(Error::InvalidBase64("payload decodes to nothing".to_string()));
    }

    Ok(bytes)
}

/// Encode PDF bytes as plain base64, never with a data-URI prefix.
pub fn encode_pdf_base64(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

fn strip_data_uri(payload: &str) -> &str {
    if payload.starts_with("data:")
        && let Some(index) = payload.find(',')
    {
        return &payload[index + 1..];
    }
    payload
}

//! Overlay requests and their normalization into placement instructions.
//!
//! Three request shapes are accepted and may be mixed in one body:
//!
//! ```json
//! { "text": "Legacy", "x": 50, "y": 700, "pageNumber": 0 }
//! { "texts": [{ "text": "One" }, { "text": "Two", "pageNumber": -1 }] }
//! { "watermark": { "text": "DRAFT", "applyToAll": true, "position": "center" } }
//! ```
//!
//! Normalization happens once, here. The resulting list holds watermark
//! instructions first (they are the background layer), then text
//! instructions in request order. When a `texts` array is present the
//! top-level `text` field is ignored.

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::anchor::PageSize;
use super::instruction::PlacementInstruction;
use super::normalize::coerce_text;
use crate::error::{Error, Result};

/// One raw text entry, as found in `texts[]` or at the top level.
///
/// Every field is kept as raw JSON so that loosely-typed values can be
/// coerced instead of rejected.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextSpec {
    pub text: Option<Value>,
    pub x: Option<Value>,
    pub y: Option<Value>,
    pub page_number: Option<Value>,
    pub font_size: Option<Value>,
    pub color: Option<Value>,
    pub opacity: Option<Value>,
    pub rotate: Option<Value>,
}

/// The raw `watermark` object.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatermarkSpec {
    pub text: Option<Value>,
    pub apply_to_all: Option<Value>,
    pub position: Option<Value>,
    pub font_size: Option<Value>,
    pub opacity: Option<Value>,
    pub rotate: Option<Value>,
    pub color: Option<Value>,
}

impl WatermarkSpec {
    /// Whether the watermark goes on every page (the default) or only the first.
    pub fn applies_to_all(&self) -> bool {
        matches!(self.apply_to_all, None | Some(Value::Bool(true)))
    }
}

/// A complete overlay request body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayRequest {
    /// Base64 PDF, optionally with a `data:application/pdf;base64,` prefix.
    pub pdf_base64: Option<String>,
    /// URL to fetch the PDF from.
    pub pdf_url: Option<String>,
    /// Legacy single-text fields at the top level.
    #[serde(flatten)]
    pub legacy: TextSpec,
    /// Multi-text entries. Non-array values are ignored.
    pub texts: Option<Value>,
    /// Watermark object. Non-object values are ignored.
    pub watermark: Option<Value>,
}

impl OverlayRequest {
    /// Parse a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self> {
        serde_json::from_slice(body).map_err(|e| Error::InvalidRequest(format!("malformed JSON body: {e}")))
    }

    /// The watermark object, if present and shaped like one.
    pub fn watermark_spec(&self) -> Option<WatermarkSpec> {
        match self.watermark.as_ref()? {
            value @ Value::Object(_) => WatermarkSpec::deserialize(value).ok(),
            _ => None,
        }
    }

    /// The `texts` entries, if `texts` is an array. Non-object entries are skipped.
    pub fn text_specs(&self) -> Option<Vec<TextSpec>> {
        match self.texts.as_ref()? {
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter(|item| item.is_object())
                    .filter_map(|item| TextSpec::deserialize(item).ok())
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Turn this request into an ordered instruction list for a document
    /// whose pages have the given sizes.
    ///
    /// Fails with [`Error::EmptyDocument`] for a zero-page document and with
    /// [`Error::NoOverlays`] when the request carries no watermark text, no
    /// `texts` array and no top-level text. An empty `texts` array is a valid
    /// request that draws nothing.
    pub fn normalize(&self, pages: &[PageSize]) -> Result<Vec<PlacementInstruction>> {
        let page_count = pages.len();
        if page_count == 0 {
            return Err(Error::EmptyDocument);
        }

        let mut instructions = Vec::new();
        let mut has_overlay_source = false;

        if let Some(watermark) = self.watermark_spec()
            && coerce_text(watermark.text.as_ref()).is_some()
        {
            has_overlay_source = true;
            let targets = if watermark.applies_to_all() { page_count } else { 1 };
            instructions.extend(
                pages
                    .iter()
                    .take(targets)
                    .enumerate()
                    .filter_map(|(page, size)| {
                        PlacementInstruction::watermark_for_page(&watermark, page, *size)
                    }),
            );
            debug!("Watermark targets {} of {} pages", targets, page_count);
        }

        if let Some(specs) = self.text_specs() {
            has_overlay_source = true;
            let before = instructions.len();
            instructions.extend(
                specs
                    .iter()
                    .filter_map(|spec| PlacementInstruction::from_text_spec(spec, page_count)),
            );
            debug!(
                "Normalized {} of {} texts entries",
                instructions.len() - before,
                specs.len()
            );
        } else if let Some(instruction) =
            PlacementInstruction::from_text_spec(&self.legacy, page_count)
        {
            has_overlay_source = true;
            instructions.push(instruction);
        }

        if !has_overlay_source {
            return Err(Error::NoOverlays);
        }

        Ok(instructions)
    }
}

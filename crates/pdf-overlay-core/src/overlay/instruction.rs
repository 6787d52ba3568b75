//! Canonical placement instructions and their per-kind defaults.

use super::anchor::{PageSize, WatermarkPosition, watermark_anchor};
use super::normalize::{Rgb, clamp_unit, coerce_color, coerce_number, coerce_text};
use super::page_selector::PageSelector;
use super::request::{TextSpec, WatermarkSpec};

/// Where an instruction came from. Selects the default table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    Text,
    Watermark,
}

/// Default values for one overlay kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlayDefaults {
    /// Default `(x, y)`. Watermarks have none: their anchor is always computed.
    pub position: Option<(f64, f64)>,
    pub font_size: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub rotation_degrees: f64,
}

pub const TEXT_DEFAULTS: OverlayDefaults = OverlayDefaults {
    position: Some((50.0, 750.0)),
    font_size: 12.0,
    color: Rgb::black(),
    opacity: 1.0,
    rotation_degrees: 0.0,
};

pub const WATERMARK_DEFAULTS: OverlayDefaults = OverlayDefaults {
    position: None,
    font_size: 48.0,
    color: Rgb::gray(),
    opacity: 0.15,
    rotation_degrees: 45.0,
};

impl OverlayKind {
    pub const fn defaults(self) -> &'static OverlayDefaults {
        match self {
            Self::Text => &TEXT_DEFAULTS,
            Self::Watermark => &WATERMARK_DEFAULTS,
        }
    }
}

/// One fully-defaulted directive: draw `text` at `(x, y)` on `page`.
///
/// `text` is never empty; requests with empty text never become instructions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementInstruction {
    pub kind: OverlayKind,
    pub text: String,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub rotation_degrees: f64,
    pub page: PageSelector,
}

impl PlacementInstruction {
    /// Build a text instruction from a raw text entry.
    ///
    /// Returns `None` when the entry has no usable text.
    pub fn from_text_spec(spec: &TextSpec, page_count: usize) -> Option<Self> {
        let text = coerce_text(spec.text.as_ref())?;
        let defaults = OverlayKind::Text.defaults();
        let (default_x, default_y) = defaults.position.unwrap_or_default();

        Some(Self {
            kind: OverlayKind::Text,
            text,
            x: coerce_number(spec.x.as_ref(), default_x),
            y: coerce_number(spec.y.as_ref(), default_y),
            font_size: coerce_number(spec.font_size.as_ref(), defaults.font_size),
            color: coerce_color(spec.color.as_ref(), defaults.color),
            opacity: clamp_unit(spec.opacity.as_ref(), defaults.opacity),
            rotation_degrees: coerce_number(spec.rotate.as_ref(), defaults.rotation_degrees),
            page: PageSelector::resolve(spec.page_number.as_ref(), page_count),
        })
    }

    /// Build the watermark instruction for a single page.
    ///
    /// Returns `None` when the watermark has no usable text.
    pub fn watermark_for_page(spec: &WatermarkSpec, page: usize, size: PageSize) -> Option<Self> {
        let text = coerce_text(spec.text.as_ref())?;
        let defaults = OverlayKind::Watermark.defaults();
        let font_size = coerce_number(spec.font_size.as_ref(), defaults.font_size);
        let position = WatermarkPosition::from_value(spec.position.as_ref());
        let anchor = watermark_anchor(position, size, &text, font_size);

        Some(Self {
            kind: OverlayKind::Watermark,
            x: anchor.x,
            y: anchor.y,
            font_size,
            color: coerce_color(spec.color.as_ref(), defaults.color),
            opacity: clamp_unit(spec.opacity.as_ref(), defaults.opacity),
            rotation_degrees: coerce_number(spec.rotate.as_ref(), defaults.rotation_degrees),
            page: PageSelector::Single(page),
            text,
        })
    }

    /// Rotation to apply, or `None` when the rotation is exactly zero.
    #[allow(clippy::float_cmp)]
    pub fn rotation(&self) -> Option<f64> {
        (self.rotation_degrees != 0.0).then_some(self.rotation_degrees)
    }
}

//! Watermark anchor placement for named positions.
//!
//! # Coordinate System
//!
//! PDF uses a **bottom-left origin**: `(0, 0)` is the bottom-left corner of
//! the page, X grows to the right and Y grows upward. Anchors are expressed
//! in that space.
//!
//! # Centering
//!
//! There is no glyph measurement here. The centered anchor shifts left by
//! `chars * font_size / 6`, a rough half-width for typical Latin text, so
//! wide or narrow strings will sit visibly off-center. Callers that need
//! exact centering must compute their own coordinates and use a text overlay.

use serde_json::Value;

/// Distance from the page edges for corner positions, in points.
pub const CORNER_PADDING: f64 = 24.0;

/// Divisor of `chars * font_size` giving the approximate half text width.
const HALF_WIDTH_DIVISOR: f64 = 6.0;

/// Page dimensions in points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// US Letter, used when a page declares no usable media box.
    pub const fn letter() -> Self {
        Self::new(612.0, 792.0)
    }
}

/// Named watermark position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatermarkPosition {
    #[default]
    Center,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WatermarkPosition {
    /// Parse a position name. Unknown names mean [`WatermarkPosition::Center`].
    pub fn parse(name: &str) -> Self {
        match name.trim().to_lowercase().replace('_', "-").as_str() {
            "top-left" => Self::TopLeft,
            "top-right" => Self::TopRight,
            "bottom-left" => Self::BottomLeft,
            "bottom-right" => Self::BottomRight,
            _ => Self::Center,
        }
    }

    /// Read a position from a request value; anything but a string is `Center`.
    pub fn from_value(value: Option<&Value>) -> Self {
        value
            .and_then(Value::as_str)
            .map_or(Self::Center, Self::parse)
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }
}

/// The point at which a watermark's text origin is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

/// Compute the watermark anchor for `position` on a page of `page` size.
pub fn watermark_anchor(
    position: WatermarkPosition,
    page: PageSize,
    text: &str,
    font_size: f64,
) -> Anchor {
    let pad = CORNER_PADDING;
    let (x, y) = match position {
        WatermarkPosition::TopLeft => (pad, page.height - pad),
        WatermarkPosition::TopRight => (page.width - pad, page.height - pad),
        WatermarkPosition::BottomLeft => (pad, pad),
        WatermarkPosition::BottomRight => (page.width - pad, pad),
        WatermarkPosition::Center => {
            #[allow(clippy::cast_precision_loss)]
            let chars = text.chars().count() as f64;
            let shift = chars * font_size / HALF_WIDTH_DIVISOR;
            (page.width / 2.0 - shift, page.height / 2.0)
        }
    };

    Anchor { x, y }
}

//! Lenient coercion of request values into usable numbers, colors and text.
//!
//! Requests come from browser forms and scripts that send numbers as
//! numbers, as strings, or not at all. Nothing in here fails: every
//! function produces a value, falling back to the caller's default when the
//! input cannot be read as a finite number.
//!
//! Number conversion follows the usual loose-typing rules of JSON producers:
//! - numbers are taken as-is
//! - strings are trimmed and parsed (empty means `0`, `0x`/`0o`/`0b` prefixes
//!   are honoured)
//! - `true`/`false` are `1`/`0`, `null` is `0`
//! - an empty array is `0`, a one-element array is its element
//! - anything else is not a number

use serde_json::Value;

/// An RGB color with channels in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Rgb {
    pub const fn new(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b }
    }

    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    pub const fn gray() -> Self {
        Self::new(0.5, 0.5, 0.5)
    }

    pub const fn red() -> Self {
        Self::new(0.8, 0.0, 0.0)
    }

    pub const fn blue() -> Self {
        Self::new(0.0, 0.0, 0.8)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "black" => Some(Self::black()),
            "gray" | "grey" => Some(Self::gray()),
            "red" => Some(Self::red()),
            "blue" => Some(Self::blue()),
            _ => None,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::black()
    }
}

/// Read `value` as a number, or `None` if it has no numeric reading.
///
/// The result may be infinite or NaN; callers filter for finiteness.
fn to_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_numeric_str(s),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::Array(items) => match items.as_slice() {
            [] => Some(0.0),
            [single] => to_number(single),
            _ => None,
        },
        Value::Object(_) => None,
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return Some(0.0);
    }

    let radix_prefixed = [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)];
    for (prefix, radix) in radix_prefixed {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            #[allow(clippy::cast_precision_loss)]
            return u64::from_str_radix(digits, radix).ok().map(|n| n as f64);
        }
    }

    trimmed.parse::<f64>().ok()
}

/// Convert `value` to a finite number, or return `default`.
pub fn coerce_number(value: Option<&Value>, default: f64) -> f64 {
    value
        .and_then(to_number)
        .filter(|n| n.is_finite())
        .unwrap_or(default)
}

/// Coerce `value` and clamp the result into `[0, 1]`.
pub fn clamp_unit(value: Option<&Value>, default: f64) -> f64 {
    coerce_number(value, default).clamp(0.0, 1.0)
}

/// Coerce a `{r, g, b}` object into a color.
///
/// A non-object yields `default` as a whole. Inside an object, each channel
/// is clamped on its own and a missing or non-numeric channel falls back to
/// the matching channel of `default`.
pub fn coerce_color(value: Option<&Value>, default: Rgb) -> Rgb {
    let Some(Value::Object(map)) = value else {
        return default;
    };

    let channel = |key: &str, fallback: f64| {
        clamp_unit(map.get(key).filter(|v| !v.is_null()), fallback)
    };

    Rgb {
        r: channel("r", default.r),
        g: channel("g", default.g),
        b: channel("b", default.b),
    }
}

/// Read overlay text. Strings and numbers are accepted; empty text is `None`.
pub fn coerce_text(value: Option<&Value>) -> Option<String> {
    let text = match value? {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };

    (!text.is_empty()).then_some(text)
}

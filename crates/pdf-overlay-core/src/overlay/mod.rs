pub mod anchor;
mod engine;
pub mod instruction;
pub mod normalize;
mod page_selector;
pub mod request;

pub use anchor::{Anchor, CORNER_PADDING, PageSize, WatermarkPosition, watermark_anchor};
pub use engine::{OverlayEngine, OverlayReport};
pub use instruction::{OverlayDefaults, OverlayKind, PlacementInstruction, TEXT_DEFAULTS, WATERMARK_DEFAULTS};
pub use normalize::{Rgb, clamp_unit, coerce_color, coerce_number, coerce_text};
pub use page_selector::{ALL_PAGES, PageSelector};
pub use request::{OverlayRequest, TextSpec, WatermarkSpec};

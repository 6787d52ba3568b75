mod document;
mod render;

pub use document::PdfDocument;
pub use render::{TextRenderer, TextRun};

//! Applies normalized instructions to a document through a text renderer.

use tracing::{Span, debug, error};

use super::instruction::PlacementInstruction;
use crate::error::Result;
use crate::pdf::{TextRenderer, TextRun};

/// Summary of one engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayReport {
    /// Pages in the document, unchanged by the run.
    pub page_count: usize,
    /// Number of (instruction, page) draws performed.
    pub draw_count: usize,
}

/// Drives a [`TextRenderer`] over an instruction list.
///
/// Draws happen strictly in list order, one per target page, so later
/// instructions paint over earlier ones. Failures are logged under the span
/// given at construction, which lets callers attach request context.
#[derive(Debug, Clone)]
pub struct OverlayEngine {
    span: Span,
}

impl Default for OverlayEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayEngine {
    /// An engine logging under the current span.
    pub fn new() -> Self {
        Self { span: Span::current() }
    }

    /// An engine logging under `span`.
    pub const fn with_span(span: Span) -> Self {
        Self { span }
    }

    /// Apply every instruction to `renderer`, a document of `page_count` pages.
    ///
    /// `page_count` must be at least 1.
    pub fn apply<R>(
        &self,
        renderer: &mut R,
        page_count: usize,
        instructions: &[PlacementInstruction],
    ) -> Result<OverlayReport>
    where
        R: TextRenderer + ?Sized,
    {
        let mut draw_count = 0;

        for (index, instruction) in instructions.iter().enumerate() {
            let run = TextRun {
                text: &instruction.text,
                x: instruction.x,
                y: instruction.y,
                font_size: instruction.font_size,
                color: instruction.color,
                opacity: instruction.opacity,
                rotation: instruction.rotation(),
            };

            for page in instruction.page.pages(page_count) {
                if let Err(e) = renderer.draw_text(page, &run) {
                    error!(
                        parent: &self.span,
                        "Instruction {} ({:?}) failed on page {}: {}",
                        index, instruction.kind, page, e
                    );
                    return Err(e);
                }
                draw_count += 1;
            }
        }

        debug!(parent: &self.span, "Applied {} draws across {} pages", draw_count, page_count);

        Ok(OverlayReport {
            page_count,
            draw_count,
        })
    }
}

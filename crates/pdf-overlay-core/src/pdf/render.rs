//! Text drawing into PDF content streams.
//!
//! # Font
//!
//! All overlay text uses the standard Helvetica font with WinAnsiEncoding.
//! Nothing is embedded, so every viewer can display it, but only Latin-1
//! and a handful of typographic characters are available; anything else is
//! drawn as `?`.
//!
//! # Content Layout
//!
//! Draws are buffered per page. On save each touched page gets:
//! 1. a leading `q` stream, so the page's own graphics state is saved
//! 2. its original content streams
//! 3. one overlay stream starting with `Q`, holding every draw in order
//!
//! Each draw is wrapped in its own `q`/`Q`, positioned with `Td` when it has
//! no rotation and with a rotation `Tm` about the anchor otherwise.

use std::fmt::Write;

use lopdf::{Dictionary, Object, ObjectId, Stream};
use tracing::debug;

use super::document::{MAX_INHERITANCE_DEPTH, PdfDocument};
use crate::error::{Error, Result};
use crate::overlay::Rgb;

/// Resource name of the overlay font.
const FONT_RESOURCE: &str = "FOvl";

/// Prefix for per-opacity graphics state resource names.
const GSTATE_PREFIX: &str = "GSOvl";

/// Everything needed to draw one string once.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub x: f64,
    pub y: f64,
    pub font_size: f64,
    pub color: Rgb,
    pub opacity: f64,
    /// Rotation in degrees; `None` means no rotation transform at all.
    pub rotation: Option<f64>,
}

/// A target that can draw text onto its pages.
pub trait TextRenderer {
    /// Draw `run` onto the zero-based `page`.
    fn draw_text(&mut self, page: usize, run: &TextRun<'_>) -> Result<()>;
}

impl TextRenderer for PdfDocument {
    fn draw_text(&mut self, page: usize, run: &TextRun<'_>) -> Result<()> {
        if page >= self.page_count() {
            return Err(Error::PdfRender {
                page,
                reason: format!("document has {} pages", self.page_count()),
            });
        }

        let gstate = (run.opacity < 1.0).then(|| self.opacity_state(run.opacity));
        let operators = text_operators(run, gstate.as_deref());
        self.pending.entry(page).or_default().push_str(&operators);

        Ok(())
    }
}

impl PdfDocument {
    /// Resource name of the graphics state for `opacity`, registering it if new.
    fn opacity_state(&mut self, opacity: f64) -> String {
        let key = format_number(opacity);
        let next = self.opacity_states.len();
        self.opacity_states
            .entry(key)
            .or_insert_with(|| format!("{GSTATE_PREFIX}{next}"))
            .clone()
    }

    /// Write buffered draws into the document.
    pub(crate) fn flush_overlays(&mut self) -> Result<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let font_id = self.inner.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
            ("Encoding", Object::Name(b"WinAnsiEncoding".to_vec())),
        ]));

        let mut resources = vec![(b"Font".as_slice(), FONT_RESOURCE.to_string(), font_id)];
        for (value, name) in &self.opacity_states {
            let alpha: f32 = value.parse().unwrap_or(1.0);
            let gstate_id = self.inner.add_object(Dictionary::from_iter([
                ("Type", Object::Name(b"ExtGState".to_vec())),
                ("ca", Object::Real(alpha)),
                ("CA", Object::Real(alpha)),
            ]));
            resources.push((b"ExtGState".as_slice(), name.clone(), gstate_id));
        }

        let pending = std::mem::take(&mut self.pending);
        for (page, content) in pending {
            let page_id = self.page_ids[page];
            self.register_resources(page_id, &resources)?;
            self.append_content(page_id, &content)?;
            debug!("Wrote {} bytes of overlay content to page {}", content.len(), page);
        }

        Ok(())
    }

    /// Put the overlay resources into the page's own resource dictionary.
    ///
    /// Inherited or referenced resources are copied onto the page first so
    /// other pages sharing them are untouched.
    fn register_resources(
        &mut self,
        page_id: ObjectId,
        entries: &[(&[u8], String, ObjectId)],
    ) -> Result<()> {
        let mut resources = effective_resources(&self.inner, page_id);

        for (category, name, id) in entries {
            let mut group = match resources.get(category) {
                Ok(Object::Dictionary(dict)) => dict.clone(),
                Ok(Object::Reference(group_id)) => self
                    .inner
                    .get_dictionary(*group_id)
                    .cloned()
                    .unwrap_or_else(|_| Dictionary::new()),
                _ => Dictionary::new(),
            };
            group.set(name.as_str(), Object::Reference(*id));
            resources.set(*category, Object::Dictionary(group));
        }

        self.page_dict_mut(page_id)?
            .set("Resources", Object::Dictionary(resources));
        Ok(())
    }

    /// Append `content` after the page's existing content streams.
    fn append_content(&mut self, page_id: ObjectId, content: &str) -> Result<()> {
        let existing: Vec<Object> = match self.page_dict_mut(page_id)?.get(b"Contents") {
            Ok(Object::Reference(id)) => vec![Object::Reference(*id)],
            Ok(Object::Array(arr)) => arr.clone(),
            _ => Vec::new(),
        };
        let existing = self.flatten_contents(existing);

        let contents = if existing.is_empty() {
            let overlay_id = self.add_stream(content.as_bytes().to_vec());
            Object::Reference(overlay_id)
        } else {
            let save_id = self.add_stream(b"q\n".to_vec());
            let overlay_id = self.add_stream(format!("Q\n{content}").into_bytes());

            let mut streams = Vec::with_capacity(existing.len() + 2);
            streams.push(Object::Reference(save_id));
            streams.extend(existing);
            streams.push(Object::Reference(overlay_id));
            Object::Array(streams)
        };

        self.page_dict_mut(page_id)?.set("Contents", contents);
        Ok(())
    }

    /// Replace a reference to an indirect contents array by its elements.
    fn flatten_contents(&self, contents: Vec<Object>) -> Vec<Object> {
        if let [Object::Reference(id)] = contents.as_slice()
            && let Ok(Object::Array(arr)) = self.inner.get_object(*id)
        {
            return arr.clone();
        }
        contents
    }

    fn add_stream(&mut self, bytes: Vec<u8>) -> ObjectId {
        self.inner
            .add_object(Object::Stream(Stream::new(Dictionary::new(), bytes)))
    }

    fn page_dict_mut(&mut self, page_id: ObjectId) -> Result<&mut Dictionary> {
        self.inner
            .get_object_mut(page_id)
            .and_then(Object::as_dict_mut)
            .map_err(|e| Error::PdfSave(format!("page object {page_id:?}: {e}")))
    }
}

/// The resource dictionary in effect for a page, as an owned copy.
fn effective_resources(doc: &lopdf::Document, page_id: ObjectId) -> Dictionary {
    let mut current = page_id;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };

        match dict.get(b"Resources") {
            Ok(Object::Dictionary(resources)) => return resources.clone(),
            Ok(Object::Reference(id)) => {
                return doc
                    .get_dictionary(*id)
                    .cloned()
                    .unwrap_or_else(|_| Dictionary::new());
            }
            _ => {}
        }

        match dict.get(b"Parent").and_then(Object::as_reference) {
            Ok(parent) => current = parent,
            Err(_) => break,
        }
    }

    Dictionary::new()
}

/// Content stream operators for one draw.
fn text_operators(run: &TextRun<'_>, gstate: Option<&str>) -> String {
    let mut ops = String::from("q\n");

    if let Some(name) = gstate {
        let _ = writeln!(ops, "/{name} gs");
    }

    let _ = writeln!(
        ops,
        "{} {} {} rg",
        format_number(run.color.r),
        format_number(run.color.g),
        format_number(run.color.b)
    );
    ops.push_str("BT\n");
    let _ = writeln!(ops, "/{FONT_RESOURCE} {} Tf", format_number(run.font_size));

    let (x, y) = (format_number(run.x), format_number(run.y));
    match run.rotation {
        Some(degrees) => {
            let (sin, cos) = degrees.to_radians().sin_cos();
            let _ = writeln!(
                ops,
                "{} {} {} {} {x} {y} Tm",
                format_number(cos),
                format_number(sin),
                format_number(-sin),
                format_number(cos)
            );
        }
        None => {
            let _ = writeln!(ops, "{x} {y} Td");
        }
    }

    let _ = writeln!(ops, "<{}> Tj", win_ansi_hex(run.text));
    ops.push_str("ET\nQ\n");
    ops
}

/// Format a number for a content stream: at most four decimals, no exponent.
fn format_number(value: f64) -> String {
    let formatted = format!("{value:.4}");
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "-0" | "" => "0".to_string(),
        other => other.to_string(),
    }
}

/// Encode text as WinAnsiEncoding hex; unmappable characters become `?`.
fn win_ansi_hex(text: &str) -> String {
    text.chars().fold(String::new(), |mut acc, c| {
        let _ = write!(acc, "{:02X}", win_ansi_byte(c));
        acc
    })
}

fn win_ansi_byte(c: char) -> u8 {
    match c {
        ' '..='~' | '\u{A0}'..='\u{FF}' => u8::try_from(u32::from(c)).unwrap_or(b'?'),
        '€' => 0x80,
        '‚' => 0x82,
        '„' => 0x84,
        '…' => 0x85,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '™' => 0x99,
        _ => b'?',
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::pdf::document::tests::create_test_pdf;

    fn run(text: &str) -> TextRun<'_> {
        TextRun {
            text,
            x: 50.0,
            y: 750.0,
            font_size: 12.0,
            color: Rgb::black(),
            opacity: 1.0,
            rotation: None,
        }
    }

    fn page_content(doc: &lopdf::Document, page_number: u32) -> String {
        let page_id = doc.get_pages()[&page_number];
        String::from_utf8_lossy(&doc.get_page_content(page_id).unwrap()).into_owned()
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(12.0), "12");
        assert_eq!(format_number(0.15), "0.15");
        assert_eq!(format_number(-0.00001), "0");
        assert_eq!(format_number(0.707_106_781), "0.7071");
        assert_eq!(format_number(-24.5), "-24.5");
    }

    #[test]
    fn test_win_ansi_hex() {
        assert_eq!(win_ansi_hex("Hi"), "4869");
        assert_eq!(win_ansi_hex("é"), "E9");
        assert_eq!(win_ansi_hex("€"), "80");
        assert_eq!(win_ansi_hex("漢"), "3F");
    }

    #[test]
    fn test_unrotated_text_uses_td() {
        let ops = text_operators(&run("Hi"), None);
        assert!(ops.contains("50 750 Td"));
        assert!(!ops.contains("Tm"));
        assert!(!ops.contains(" gs"));
        assert!(ops.contains("/FOvl 12 Tf"));
        assert!(ops.contains("<4869> Tj"));
    }

    #[test]
    fn test_rotated_text_uses_tm() {
        let rotated = TextRun {
            rotation: Some(45.0),
            ..run("W")
        };
        let ops = text_operators(&rotated, Some("GSOvl0"));
        assert!(ops.contains("0.7071 0.7071 -0.7071 0.7071 50 750 Tm"));
        assert!(ops.contains("/GSOvl0 gs"));
    }

    #[test]
    fn test_draw_out_of_range_page_fails() {
        let mut doc = PdfDocument::from_bytes(&create_test_pdf(&[(612, 792)])).unwrap();
        let result = doc.draw_text(1, &run("X"));
        assert!(matches!(result, Err(Error::PdfRender { page: 1, .. })));
    }

    #[test]
    fn test_saved_document_contains_overlay() {
        let mut doc = PdfDocument::from_bytes(&create_test_pdf(&[(612, 792), (612, 792)])).unwrap();
        doc.draw_text(1, &TextRun { opacity: 0.5, ..run("Hi") }).unwrap();
        let saved = doc.save().unwrap();

        let reloaded = lopdf::Document::load_mem(&saved).unwrap();
        let second = page_content(&reloaded, 2);
        assert!(second.contains("(Original) Tj"));
        assert!(second.contains("<4869> Tj"));
        assert!(second.contains("/GSOvl0 gs"));
        assert!(second.trim_start().starts_with('q'));

        let first = page_content(&reloaded, 1);
        assert!(!first.contains("<4869>"));
    }

    #[test]
    fn test_shared_resources_are_not_mutated() {
        let mut doc = PdfDocument::from_bytes(&create_test_pdf(&[(612, 792), (612, 792)])).unwrap();
        doc.draw_text(0, &run("Hi")).unwrap();
        let saved = doc.save().unwrap();

        let reloaded = lopdf::Document::load_mem(&saved).unwrap();
        let pages = reloaded.get_pages();
        let font_names = |page_number: u32| -> Vec<Vec<u8>> {
            let page = reloaded.get_dictionary(pages[&page_number]).unwrap();
            let resources = match page.get(b"Resources").unwrap() {
                Object::Reference(id) => reloaded.get_dictionary(*id).unwrap(),
                Object::Dictionary(dict) => dict,
                other => panic!("unexpected resources {other:?}"),
            };
            let fonts = resources.get(b"Font").unwrap().as_dict().unwrap();
            fonts.iter().map(|(k, _)| k.clone()).collect()
        };

        assert!(font_names(1).contains(&b"FOvl".to_vec()));
        assert!(font_names(1).contains(&b"F1".to_vec()));
        assert!(!font_names(2).contains(&b"FOvl".to_vec()));
    }
}

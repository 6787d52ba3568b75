use std::collections::BTreeMap;

use lopdf::{Document, Object, ObjectId};

use crate::error::{Error, Result};
use crate::overlay::PageSize;

/// Inherited attributes are looked up at most this many `Parent` levels up.
pub(crate) const MAX_INHERITANCE_DEPTH: usize = 32;

/// A loaded PDF whose pages can receive overlay text.
///
/// Page order and geometry are read once at load time and never change.
/// Drawn text is buffered per page and written into the document by
/// [`PdfDocument::save`].
pub struct PdfDocument {
    pub(crate) inner: Document,
    /// Page object ids in document order
    pub(crate) page_ids: Vec<ObjectId>,
    page_sizes: Vec<PageSize>,
    /// Pending content stream operators, per zero-based page index
    pub(crate) pending: BTreeMap<usize, String>,
    /// Opacity value (formatted) to ExtGState resource name
    pub(crate) opacity_states: BTreeMap<String, String>,
}

impl PdfDocument {
    /// Parse a PDF from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let inner = Document::load_mem(bytes)
            .map_err(|e| Error::PdfOpen(e.to_string()))?;

        let page_ids: Vec<ObjectId> = inner.get_pages().into_values().collect();
        let page_sizes = page_ids
            .iter()
            .map(|&id| media_box(&inner, id).map_or_else(PageSize::letter, page_size))
            .collect();

        Ok(Self {
            inner,
            page_ids,
            page_sizes,
            pending: BTreeMap::new(),
            opacity_states: BTreeMap::new(),
        })
    }

    /// Get number of pages
    pub fn page_count(&self) -> usize {
        self.page_ids.len()
    }

    /// Page sizes in document order
    pub fn page_sizes(&self) -> &[PageSize] {
        &self.page_sizes
    }

    /// Write pending overlays and serialize the document.
    pub fn save(mut self) -> Result<Vec<u8>> {
        self.flush_overlays()?;

        let mut output = Vec::new();
        self.inner
            .save_to(&mut output)
            .map_err(|e| Error::PdfSave(e.to_string()))?;

        Ok(output)
    }
}

impl std::fmt::Debug for PdfDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PdfDocument")
            .field("page_count", &self.page_ids.len())
            .field("page_sizes", &self.page_sizes)
            .field("pending_pages", &self.pending.len())
            .finish_non_exhaustive()
    }
}

fn page_size(media_box: [f64; 4]) -> PageSize {
    PageSize::new(
        (media_box[2] - media_box[0]).abs(),
        (media_box[3] - media_box[1]).abs(),
    )
}

/// Look up the `MediaBox` of a page, following `Parent` links for inherited boxes.
fn media_box(doc: &Document, page_id: ObjectId) -> Option<[f64; 4]> {
    let mut current = page_id;

    for _ in 0..MAX_INHERITANCE_DEPTH {
        let dict = doc.get_dictionary(current).ok()?;

        let declared = match dict.get(b"MediaBox") {
            Ok(Object::Array(arr)) => Some(arr.clone()),
            Ok(Object::Reference(id)) => doc
                .get_object(*id)
                .ok()
                .and_then(|o| o.as_array().ok())
                .cloned(),
            _ => None,
        };

        if let Some(arr) = declared
            && let [x0, y0, x1, y1] = arr.as_slice()
            && let (Some(x0), Some(y0), Some(x1), Some(y1)) =
                (number(x0), number(y0), number(x1), number(y1))
        {
            return Some([x0, y0, x1, y1]);
        }

        current = dict.get(b"Parent").and_then(Object::as_reference).ok()?;
    }

    None
}

fn number(object: &Object) -> Option<f64> {
    match object {
        #[allow(clippy::cast_precision_loss)]
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use lopdf::{Dictionary, Stream};

    /// Build a PDF whose pages have the given sizes, each with a line of text.
    pub(crate) fn create_test_pdf(sizes: &[(i64, i64)]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let page_tree_id = doc.new_object_id();

        let font_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Font".to_vec())),
            ("Subtype", Object::Name(b"Type1".to_vec())),
            ("BaseFont", Object::Name(b"Helvetica".to_vec())),
        ]));
        let resources_id = doc.add_object(Dictionary::from_iter([(
            "Font",
            Object::Dictionary(Dictionary::from_iter([("F1", Object::Reference(font_id))])),
        )]));

        let kids: Vec<Object> = sizes
            .iter()
            .map(|&(width, height)| {
                let content_id = doc.add_object(Stream::new(
                    Dictionary::new(),
                    b"BT /F1 24 Tf 100 700 Td (Original) Tj ET".to_vec(),
                ));
                Object::Reference(doc.add_object(Dictionary::from_iter([
                    ("Type", Object::Name(b"Page".to_vec())),
                    ("Parent", Object::Reference(page_tree_id)),
                    ("Contents", Object::Reference(content_id)),
                    ("Resources", Object::Reference(resources_id)),
                    (
                        "MediaBox",
                        Object::Array(vec![0.into(), 0.into(), width.into(), height.into()]),
                    ),
                ])))
            })
            .collect();

        #[allow(clippy::cast_possible_wrap)]
        let count = kids.len() as i64;
        doc.objects.insert(
            page_tree_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(kids)),
                ("Count", Object::Integer(count)),
            ])),
        );

        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(page_tree_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut output = Vec::new();
        doc.save_to(&mut output).unwrap();
        output
    }

    #[test]
    fn test_page_count_and_sizes() {
        let doc = PdfDocument::from_bytes(&create_test_pdf(&[(612, 792), (842, 595)])).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert_eq!(doc.page_sizes()[0], PageSize::new(612.0, 792.0));
        assert_eq!(doc.page_sizes()[1], PageSize::new(842.0, 595.0));
    }

    #[test]
    fn test_zero_page_document_loads() {
        let doc = PdfDocument::from_bytes(&create_test_pdf(&[])).unwrap();
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_garbage_is_rejected() {
        let err = PdfDocument::from_bytes(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, Error::PdfOpen(_)));
        let message = err.to_string();
        assert!(message.starts_with("failed to open PDF: "));
        assert_eq!(message.matches("failed to open PDF").count(), 1, "{message}");
        assert!(!message.contains("Failed to parse"), "{message}");
    }

    #[test]
    fn test_save_without_overlays_keeps_pages() {
        let doc = PdfDocument::from_bytes(&create_test_pdf(&[(612, 792); 3])).unwrap();
        let saved = doc.save().unwrap();
        let reloaded = PdfDocument::from_bytes(&saved).unwrap();
        assert_eq!(reloaded.page_count(), 3);
    }

    #[test]
    fn test_inherited_media_box() {
        let mut doc = Document::with_version("1.5");
        let page_tree_id = doc.new_object_id();
        let page_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(page_tree_id)),
        ]));
        doc.objects.insert(
            page_tree_id,
            Object::Dictionary(Dictionary::from_iter([
                ("Type", Object::Name(b"Pages".to_vec())),
                ("Kids", Object::Array(vec![Object::Reference(page_id)])),
                ("Count", Object::Integer(1)),
                (
                    "MediaBox",
                    Object::Array(vec![0.into(), 0.into(), 300.into(), 400.into()]),
                ),
            ])),
        );
        let catalog_id = doc.add_object(Dictionary::from_iter([
            ("Type", Object::Name(b"Catalog".to_vec())),
            ("Pages", Object::Reference(page_tree_id)),
        ]));
        doc.trailer.set("Root", Object::Reference(catalog_id));
        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();

        let loaded = PdfDocument::from_bytes(&bytes).unwrap();
        assert_eq!(loaded.page_sizes(), &[PageSize::new(300.0, 400.0)]);
    }
}

//! Mapping of a requested `pageNumber` onto concrete pages.
//!
//! Indices are zero-based. `-1` targets every page. Any other out-of-range
//! index is clamped to the nearest valid page instead of being rejected, since
//! callers routinely send 1-based or unchecked numbers.

use std::ops::Range;

use serde_json::Value;

use super::normalize::coerce_number;

/// Sentinel `pageNumber` meaning "every page".
pub const ALL_PAGES: i64 = -1;

/// The resolved target of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageSelector {
    /// One zero-based page index, already clamped into the document.
    Single(usize),
    /// Every page, in document order.
    All,
}

impl PageSelector {
    /// Resolve a raw `pageNumber` against a document of `page_count` pages.
    ///
    /// `page_count` must be at least 1; a zero-page document never reaches
    /// selector resolution.
    pub fn resolve(value: Option<&Value>, page_count: usize) -> Self {
        let raw = coerce_number(value, 0.0);

        // Only an exact -1 selects every page; -1.5 clamps like any negative.
        #[allow(clippy::float_cmp, clippy::cast_precision_loss)]
        if raw == ALL_PAGES as f64 {
            return Self::All;
        }

        // Float-to-int `as` truncates toward zero and saturates.
        #[allow(clippy::cast_possible_truncation)]
        let index = raw.trunc() as i64;

        let last = page_count.saturating_sub(1);
        let clamped = usize::try_from(index.max(0)).map_or(last, |i| i.min(last));
        Self::Single(clamped)
    }

    /// Zero-based page indices this selector targets, in document order.
    pub fn pages(self, page_count: usize) -> Range<usize> {
        match self {
            Self::Single(index) => index..index + 1,
            Self::All => 0..page_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_minus_one_is_all_pages() {
        for page_count in [1, 2, 10] {
            assert_eq!(PageSelector::resolve(Some(&json!(-1)), page_count), PageSelector::All);
        }
        assert_eq!(PageSelector::resolve(Some(&json!("-1")), 3), PageSelector::All);
    }

    #[test]
    fn test_in_range_index_unchanged() {
        for k in 0..5 {
            assert_eq!(PageSelector::resolve(Some(&json!(k)), 5), PageSelector::Single(k));
        }
        assert_eq!(PageSelector::resolve(Some(&json!("2")), 5), PageSelector::Single(2));
    }

    #[test]
    fn test_out_of_range_clamps() {
        assert_eq!(PageSelector::resolve(Some(&json!(-5)), 4), PageSelector::Single(0));
        assert_eq!(PageSelector::resolve(Some(&json!(9)), 4), PageSelector::Single(3));
        assert_eq!(PageSelector::resolve(Some(&json!(1e300)), 4), PageSelector::Single(3));
    }

    #[test]
    fn test_missing_or_junk_defaults_to_first_page() {
        assert_eq!(PageSelector::resolve(None, 3), PageSelector::Single(0));
        assert_eq!(PageSelector::resolve(Some(&json!("last")), 3), PageSelector::Single(0));
    }

    #[test]
    fn test_fractional_index_truncates() {
        assert_eq!(PageSelector::resolve(Some(&json!(1.9)), 3), PageSelector::Single(1));
    }

    #[test]
    fn test_fractional_near_minus_one_clamps_to_first_page() {
        for raw in [json!(-1.5), json!("-1.9"), json!(-1.0001)] {
            assert_eq!(PageSelector::resolve(Some(&raw), 3), PageSelector::Single(0), "for {raw}");
        }
        assert_eq!(PageSelector::resolve(Some(&json!(-1.0)), 3), PageSelector::All);
    }

    #[test]
    fn test_pages() {
        assert_eq!(PageSelector::Single(2).pages(4).collect::<Vec<_>>(), vec![2]);
        assert_eq!(PageSelector::All.pages(3).collect::<Vec<_>>(), vec![0, 1, 2]);
    }
}

//! Pulls the JSON literal a storefront page assigns to a JS constant.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StorefrontError;

static PRODUCT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const product = (\{.*\})").expect("valid regex"));
static COLLECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"const collection = (\{.*\})").expect("valid regex"));

/// Which embedded object a page is expected to carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageMode {
    /// Direct-link product page: `const product = {...}`.
    Product,
    /// Collection listing: `const collection = {"products": [...]}`.
    Collection,
}

impl PageMode {
    #[must_use]
    pub fn for_task(task: &peak_core::Task) -> Self {
        if task.is_direct_link() {
            PageMode::Product
        } else {
            PageMode::Collection
        }
    }
}

impl std::fmt::Display for PageMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PageMode::Product => write!(f, "product"),
            PageMode::Collection => write!(f, "collection"),
        }
    }
}

/// Returns the raw JSON text of the first embedded assignment for `mode`.
///
/// The match is a single first-match scan: `.` stops at line breaks and is
/// greedy, so the capture runs to the last `}` on the assignment's line. The
/// text is not checked for well-formed JSON here.
///
/// # Errors
///
/// Returns [`StorefrontError::ExtractionFailed`] if the page has no such
/// assignment.
pub fn extract_embedded_json(body: &str, mode: PageMode) -> Result<&str, StorefrontError> {
    let re = match mode {
        PageMode::Product => &*PRODUCT_RE,
        PageMode::Collection => &*COLLECTION_RE,
    };
    re.captures(body)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str())
        .ok_or(StorefrontError::ExtractionFailed { mode })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_product_object() {
        let html = r#"<script>
            var x = 1;
            const product = {"id":7,"name":"Dunk","variants":[{"id":1}]};
            </script>"#;
        let raw = extract_embedded_json(html, PageMode::Product).unwrap();
        assert_eq!(raw, r#"{"id":7,"name":"Dunk","variants":[{"id":1}]}"#);
    }

    #[test]
    fn extracts_collection_object() {
        let html = r#"<script>const collection = {"products":[{"id":1,"name":"a"}]}</script>"#;
        let raw = extract_embedded_json(html, PageMode::Collection).unwrap();
        assert_eq!(raw, r#"{"products":[{"id":1,"name":"a"}]}"#);
    }

    #[test]
    fn capture_is_greedy_to_last_brace_on_the_line() {
        let html = r#"const product = {"id":1}; window.meta = {"x":2};"#;
        let raw = extract_embedded_json(html, PageMode::Product).unwrap();
        assert_eq!(raw, r#"{"id":1}; window.meta = {"x":2}"#);
    }

    #[test]
    fn capture_does_not_cross_lines() {
        let html = "const product = {\"id\":1}\nvar other = {\"y\":2};";
        let raw = extract_embedded_json(html, PageMode::Product).unwrap();
        assert_eq!(raw, r#"{"id":1}"#);
    }

    #[test]
    fn product_pattern_does_not_match_collection_page() {
        let html = r#"const collection = {"products":[]}"#;
        let err = extract_embedded_json(html, PageMode::Product).unwrap_err();
        assert!(matches!(
            err,
            StorefrontError::ExtractionFailed {
                mode: PageMode::Product
            }
        ));
    }

    #[test]
    fn missing_assignment_is_extraction_failure() {
        let err = extract_embedded_json("<html></html>", PageMode::Collection).unwrap_err();
        assert!(!err.is_retryable());
        assert_eq!(err.to_string(), "no embedded collection data found in page");
    }
}

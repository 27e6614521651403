// src/extract/record.rs
// =============================================================================
// The data we keep for every crawled page.
//
// A PageRecord is built once, right after a page has been fetched and
// parsed, and never changes afterwards. Pages that were claimed by the
// crawler but never produced data (fetch failed, crawl was stopped) get an
// empty "stub" record instead, built with PageRecord::stub().
// =============================================================================

use serde::Serialize;

/// Extracted content of one page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    /// The URL exactly as it was used to fetch the page (not normalized)
    pub url: String,
    /// Text of the first <h1>, or empty
    pub heading: String,
    /// First paragraph of the main content region, or empty
    pub lead_paragraph: String,
    /// Absolute URLs of every anchor, in document order (duplicates kept)
    pub outgoing_links: Vec<String>,
    /// Absolute URLs of every image, in document order (duplicates kept)
    pub image_urls: Vec<String>,
}

impl PageRecord {
    /// An empty record standing in for a page that never produced data.
    pub fn stub(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.heading.is_empty()
            && self.lead_paragraph.is_empty()
            && self.outgoing_links.is_empty()
            && self.image_urls.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stub_has_only_url() {
        let stub = PageRecord::stub("https://example.com/missing");
        assert_eq!(stub.url, "https://example.com/missing");
        assert!(stub.is_empty());
    }
}

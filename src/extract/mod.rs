// src/extract/mod.rs
// =============================================================================
// This module turns a fetched HTML page into a PageRecord.
//
// Submodules:
// - record: The PageRecord type shared by the crawler and the report writer
// - html: Finds the heading, lead paragraph, links and images in a page
//
// Extraction never fails: a page without an <h1> simply gets an empty
// heading, and links that can't be resolved are dropped.
// =============================================================================

mod html;
mod record;

pub use html::extract_page;
pub use record::PageRecord;

// src/report/mod.rs
// =============================================================================
// This module writes the crawl results to a file.
//
// Formats:
// - CSV (default): one row per page, lists joined with ';'
// - JSON (--json): an array of page objects, each with a "status" field
//
// Only settled crawls are reported, so every row is either a populated page
// or a stub for a page that couldn't be fetched.
// =============================================================================

mod writer;

pub use writer::{write_report, ReportFormat};

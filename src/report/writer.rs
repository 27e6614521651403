// src/report/writer.rs
// =============================================================================
// Serializes a CrawlOutcome as CSV or JSON.
//
// CSV columns:
//   page_url, h1, first_paragraph, outgoing_link_urls, image_urls
//
// The csv crate takes care of quoting, so headings or paragraphs containing
// commas, quotes or newlines stay in their own cell.
// =============================================================================

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use thiserror::Error;

use crate::crawl::{CrawlOutcome, PageEntry};
use crate::extract::PageRecord;

/// Separator between URLs inside one CSV cell.
pub const LIST_DELIMITER: &str = ";";

const CSV_HEADER: [&str; 5] = [
    "page_url",
    "h1",
    "first_paragraph",
    "outgoing_link_urls",
    "image_urls",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Csv,
    Json,
}

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("could not write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not write CSV row: {0}")]
    Csv(#[from] csv::Error),
    #[error("could not serialize JSON report: {0}")]
    Json(#[from] serde_json::Error),
}

// One page in the JSON report
#[derive(Serialize)]
struct JsonPage<'a> {
    status: &'static str,
    #[serde(flatten)]
    record: &'a PageRecord,
}

// Writes the report for a finished crawl to `path`
//
// Parameters:
//   path: file to create (overwritten if it exists)
//   format: CSV or JSON
//   outcome: the settled crawl
pub fn write_report(
    path: &Path,
    format: ReportFormat,
    outcome: &CrawlOutcome,
) -> Result<(), ReportError> {
    let mut out = BufWriter::new(File::create(path)?);

    match format {
        ReportFormat::Csv => write_csv_report(outcome, &mut out)?,
        ReportFormat::Json => write_json_report(outcome, &mut out)?,
    }

    out.flush()?;
    Ok(())
}

pub fn write_csv_report<W: Write>(outcome: &CrawlOutcome, out: W) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(CSV_HEADER)?;

    for record in outcome.records() {
        let links = record.outgoing_links.join(LIST_DELIMITER);
        let images = record.image_urls.join(LIST_DELIMITER);
        writer.write_record([
            record.url.as_str(),
            record.heading.as_str(),
            record.lead_paragraph.as_str(),
            links.as_str(),
            images.as_str(),
        ])?;
    }

    writer.flush()?;
    Ok(())
}

pub fn write_json_report<W: Write>(outcome: &CrawlOutcome, out: W) -> Result<(), ReportError> {
    let pages: Vec<JsonPage<'_>> = outcome
        .entries()
        .filter_map(|(_, entry)| {
            let status = match entry {
                PageEntry::Populated(_) => "populated",
                PageEntry::Stub(_) => "stub",
                PageEntry::Reserved { .. } => return None,
            };
            entry.record().map(|record| JsonPage { status, record })
        })
        .collect();

    serde_json::to_writer_pretty(out, &pages)?;
    Ok(())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why take `W: Write` instead of a file path?
//    - Anything that implements std::io::Write works: a File, a Vec<u8>,
//      stdout...
//    - Tests write into a Vec<u8> and check the bytes, no files needed
//
// 2. What does #[serde(flatten)] do?
//    - It inlines the PageRecord's fields into the JsonPage object, so the
//      output is {"status": "...", "url": "...", ...} instead of nesting
//
// 3. What is #[from] in the error enum?
//    - thiserror generates From<io::Error> for ReportError
//    - That lets `?` convert the error automatically
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlConfig;
    use crate::crawl::crawl_site;
    use crate::fetch::{FetchError, FetchResponse, Transport};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct TwoPages;

    #[async_trait]
    impl Transport for TwoPages {
        async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
            match url {
                "https://ex.com" => Ok(FetchResponse::html(
                    r#"<h1>Home, sweet "home"</h1>
                       <main><p>Welcome.</p></main>
                       <a href="/missing">M</a><a href="https://other.com/x">X</a>
                       <img src="/a.png"><img src="/b.png">"#,
                )),
                _ => Err(FetchError::HttpStatus(404)),
            }
        }
    }

    async fn outcome() -> CrawlOutcome {
        let config = CrawlConfig::new("https://ex.com", 2, 10).unwrap();
        crawl_site(config, Arc::new(TwoPages)).await
    }

    #[tokio::test]
    async fn test_csv_report_rows() {
        let outcome = outcome().await;
        let mut buffer = Vec::new();
        write_csv_report(&outcome, &mut buffer).unwrap();

        let mut reader = csv::Reader::from_reader(buffer.as_slice());
        let headers: Vec<&str> = reader.headers().unwrap().iter().collect();
        assert_eq!(headers, CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
        assert_eq!(rows.len(), 2);

        assert_eq!(&rows[0][0], "https://ex.com");
        assert_eq!(&rows[0][1], r#"Home, sweet "home""#);
        assert_eq!(&rows[0][2], "Welcome.");
        assert_eq!(&rows[0][3], "https://ex.com/missing;https://other.com/x");
        assert_eq!(&rows[0][4], "https://ex.com/a.png;https://ex.com/b.png");

        // The 404 page is a stub row with only its URL
        assert_eq!(&rows[1][0], "https://ex.com/missing");
        assert_eq!(&rows[1][1], "");
        assert_eq!(&rows[1][3], "");
    }

    #[tokio::test]
    async fn test_json_report_marks_stubs() {
        let outcome = outcome().await;
        let mut buffer = Vec::new();
        write_json_report(&outcome, &mut buffer).unwrap();

        let json: serde_json::Value = serde_json::from_slice(&buffer).unwrap();
        let pages = json.as_array().unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0]["status"], "populated");
        assert_eq!(pages[0]["heading"], r#"Home, sweet "home""#);
        assert_eq!(pages[1]["status"], "stub");
        assert_eq!(pages[1]["url"], "https://ex.com/missing");
    }

    #[tokio::test]
    async fn test_write_report_to_file() {
        let outcome = outcome().await;
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");

        write_report(&path, ReportFormat::Csv, &outcome).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("page_url,h1,first_paragraph,outgoing_link_urls,image_urls"));
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_missing_directory_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/report.csv");
        let outcome_result = tokio::runtime::Runtime::new().unwrap().block_on(outcome());

        let result = write_report(&path, ReportFormat::Json, &outcome_result);
        assert!(matches!(result, Err(ReportError::Io(_))));
    }
}

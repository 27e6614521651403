// src/extract/html.rs
// =============================================================================
// This module extracts the structured content of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser), so broken markup still
//   produces a usable tree instead of an error
//
// We also use the `url` crate to resolve relative links and image sources
// against the URL of the page they were found on.
//
// What we pull out of each page:
// - heading: text of the first <h1>
// - lead paragraph: first <p> inside <main> when the page has a <main>,
//   otherwise the first <p> anywhere
// - outgoing links: every <a href>, resolved to an absolute URL
// - images: every <img src>, resolved to an absolute URL
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use tracing::warn;
use url::Url;

use super::record::PageRecord;

// Builds a PageRecord from an HTML document
//
// Parameters:
//   html: the HTML content to parse (borrowed as &str)
//   page_url: the URL the page was fetched from (for resolving relative links)
//
// Returns: a PageRecord; missing elements give empty fields, never an error
//
// Example:
//   html = "<h1>Hi</h1><a href='/docs'>Docs</a>"
//   page_url = "https://example.com"
//   result.heading = "Hi", result.outgoing_links = ["https://example.com/docs"]
pub fn extract_page(html: &str, page_url: &str) -> PageRecord {
    let document = Html::parse_document(html);

    // Parse the page URL once; every link on the page is resolved against it
    let base = match Url::parse(page_url) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!(url = page_url, error = %e, "invalid page URL, links will not be resolved");
            None
        }
    };

    let (outgoing_links, image_urls) = match &base {
        Some(base) => (
            collect_references(&document, "a[href]", "href", base),
            collect_references(&document, "img[src]", "src", base),
        ),
        None => (Vec::new(), Vec::new()),
    };

    PageRecord {
        url: page_url.to_string(),
        heading: first_heading(&document),
        lead_paragraph: lead_paragraph(&document),
        outgoing_links,
        image_urls,
    }
}

// Text of the first <h1> in the document, or "" when there is none
fn first_heading(document: &Html) -> String {
    let Some(h1) = selector("h1") else {
        return String::new();
    };

    document
        .select(&h1)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

// First paragraph of the primary content region
//
// When the page has a <main> element we only look inside it, even if it
// happens to contain no paragraph. Pages without <main> fall back to the
// first <p> anywhere in the document.
fn lead_paragraph(document: &Html) -> String {
    let (Some(main), Some(p)) = (selector("main"), selector("p")) else {
        return String::new();
    };

    let paragraph = match document.select(&main).next() {
        Some(main_region) => main_region.select(&p).next(),
        None => document.select(&p).next(),
    };

    paragraph.map(element_text).unwrap_or_default()
}

// Resolves one attribute of every element matching `css` to an absolute URL
//
// Empty attribute values are skipped. Values the url crate can't resolve are
// logged and dropped so one bad link never spoils the rest of the page.
fn collect_references(document: &Html, css: &str, attr: &str, base: &Url) -> Vec<String> {
    let Some(selector) = selector(css) else {
        return Vec::new();
    };

    let mut urls = Vec::new();

    for element in document.select(&selector) {
        let Some(value) = element.value().attr(attr) else {
            continue;
        };
        if value.trim().is_empty() {
            continue;
        }

        match base.join(value) {
            Ok(absolute) => urls.push(absolute.to_string()),
            Err(e) => warn!(reference = value, error = %e, "dropping unresolvable reference"),
        }
    }

    urls
}

// Joins the element's text nodes, trimming each one and dropping the blanks
fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

// Our selectors are constants, so parsing only fails on a programming error.
// Returning None keeps extraction total instead of panicking.
fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. What does "main p" style selection look like here?
//    - document.select(&main) finds <main> elements
//    - main_region.select(&p) then searches only *inside* that element
//    - This is the same as the CSS selector "main p", done in two steps so
//      we can fall back when <main> is missing
//
// 2. What is let-else?
//    - `let Some(x) = value else { return ...; };`
//    - Binds x when the pattern matches, otherwise runs the else block,
//      which must leave the function (return, continue, break)
//
// 3. Why does Url::join handle absolute links too?
//    - join() follows the same rules a browser uses for <a href>
//    - "https://other.com/b" joined onto anything is still that URL
//    - "/a" joined onto "https://example.com/x" is "https://example.com/a"
// -----------------------------------------------------------------------------

// src/crawl/normalize.rs
// =============================================================================
// Turns a URL into the key we use to decide "have we seen this page?".
//
// Two URLs are the same page for us when they only differ in:
// - scheme (http vs https)
// - letter case of the host or path
// - a trailing slash
// - query string or fragment
//
// So all of these map to "example.com/a":
//   https://example.com/a
//   http://example.com/a/
//   HTTPS://EXAMPLE.COM/A?page=2#top
//
// Normalizing never fails. Input the url crate can't parse still gets a
// best-effort key, because one weird link must not stop the crawl.
// =============================================================================

use url::Url;

use crate::config::scope_key;

// Computes the deduplication key for a URL
//
// Parameters:
//   url: any string found in a page or given on the command line
//
// Returns: host (with explicit port) + path, lowercased, one trailing '/'
//          removed
pub fn normalize_url(url: &str) -> String {
    let key = match Url::parse(url) {
        Ok(parsed) => match scope_key(&parsed) {
            Some(host) => format!("{}{}", host, parsed.path()),
            None => lossy_key(url),
        },
        Err(_) => lossy_key(url),
    };

    let mut key = key.to_lowercase();
    if key.ends_with('/') {
        key.pop();
    }
    key
}

// Fallback for strings that aren't absolute URLs with a host:
// drop a leading "scheme://", then cut at the first '?' or '#'.
// Keys start with a host, not a scheme, so they come back unchanged through
// here even when their path carries another URL.
fn lossy_key(url: &str) -> String {
    let rest = match url.split_once("://") {
        Some((scheme, rest)) if is_scheme(scheme) => rest,
        _ => url,
    };
    let end = rest.find(['?', '#']).unwrap_or(rest.len());
    rest[..end].to_string()
}

// scheme = ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )
fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_url_https() {
        assert_eq!(normalize_url("https://blog.boot.dev/path"), "blog.boot.dev/path");
    }

    #[test]
    fn test_normalize_url_http_trailing_slash() {
        assert_eq!(normalize_url("http://blog.boot.dev/path/"), "blog.boot.dev/path");
    }

    #[test]
    fn test_normalize_url_capitals() {
        assert_eq!(normalize_url("HTTPS://BLOG.boot.dev/PATH"), "blog.boot.dev/path");
    }

    #[test]
    fn test_variants_share_one_key() {
        let keys = [
            normalize_url("https://X.com/a"),
            normalize_url("http://x.com/a/"),
            normalize_url("HTTPS://X.COM/A"),
            normalize_url("https://x.com/a?page=2#top"),
        ];
        assert!(keys.iter().all(|k| k == "x.com/a"), "{keys:?}");
    }

    #[test]
    fn test_root_without_path() {
        assert_eq!(normalize_url("https://example.com"), "example.com");
        assert_eq!(normalize_url("https://example.com/"), "example.com");
    }

    #[test]
    fn test_only_one_trailing_slash_removed() {
        assert_eq!(normalize_url("https://example.com/a//"), "example.com/a/");
    }

    #[test]
    fn test_port_is_kept() {
        assert_eq!(normalize_url("http://localhost:8080/docs/"), "localhost:8080/docs");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for url in [
            "https://example.com/Docs/",
            "http://localhost:8080/a?b=c",
            "not a url at all/",
            "https://ex.com/share/https://other.com/x",
            "http://[bad host/share/https://other.com/x",
        ] {
            let once = normalize_url(url);
            assert_eq!(normalize_url(&once), once, "{url}");
        }
    }

    #[test]
    fn test_embedded_url_stays_in_the_path() {
        assert_eq!(
            normalize_url("https://ex.com/share/https://other.com/x"),
            "ex.com/share/https://other.com/x"
        );
        assert_eq!(normalize_url("not a scheme/x://y"), "not a scheme/x://y");
    }

    #[test]
    fn test_malformed_input_still_gets_a_key() {
        assert_eq!(normalize_url("http://[bad host/Page?q=1"), "[bad host/page");
        assert_eq!(normalize_url(""), "");
    }
}

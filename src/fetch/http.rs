// src/fetch/http.rs
// =============================================================================
// This module downloads pages for the crawler.
//
// Key functionality:
// - A Transport trait: "give me the status, content type and body of a URL"
// - HttpTransport: the real implementation on top of reqwest
// - Classifying a response: only successful HTML responses are usable
//
// Rust concepts:
// - Traits: An interface the crawler depends on instead of a concrete type
// - async_trait: Lets us call async methods through `dyn Transport`
// - thiserror: Derives Display/Error for our error enum
// =============================================================================

use async_trait::async_trait;
use reqwest::{header::CONTENT_TYPE, Client};
use std::time::Duration;
use thiserror::Error;

/// Why a page could not be used.
///
/// None of these stop the crawl. The crawler logs them and abandons only
/// the page that failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// The request never produced a response (DNS, TLS, timeout, reset...)
    #[error("request failed: {0}")]
    Transport(String),
    /// The server answered with a 4xx or 5xx status
    #[error("HTTP {0}")]
    HttpStatus(u16),
    /// The server answered with something that isn't HTML
    #[error("non-HTML content '{0}'")]
    NotHtml(String),
}

/// What the transport got back for one URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    pub content_type: String,
    pub body: String,
}

impl FetchResponse {
    /// A 200 text/html response.
    #[cfg(test)]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            content_type: "text/html; charset=utf-8".to_string(),
            body: body.into(),
        }
    }

    pub fn is_usable(&self) -> bool {
        self.status < 400 && self.content_type.contains("text/html")
    }

    // Returns the HTML body if this response is one we can extract from
    //
    // Returns:
    //   Ok(body) for a non-error status with an HTML content type
    //   Err(FetchError::HttpStatus) for status >= 400
    //   Err(FetchError::NotHtml) for any other content type
    pub fn into_html(self) -> Result<String, FetchError> {
        if self.status >= 400 {
            return Err(FetchError::HttpStatus(self.status));
        }
        if !self.content_type.contains("text/html") {
            return Err(FetchError::NotHtml(self.content_type));
        }
        Ok(self.body)
    }
}

/// Anything that can fetch a URL for the crawler.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError>;
}

/// Settings for the HTTP client.
#[derive(Debug, Clone)]
pub struct TransportOptions {
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            user_agent: format!("site-harvest/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Transport backed by a shared reqwest client.
///
/// Dropping it closes the client's pooled connections, which is how a crawl
/// tears its network state down when it finishes.
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    // Creates the HTTP client used for the whole crawl
    //
    // We reuse one client for all requests (connection pooling). The timeout
    // is the only time limit in the whole crawler.
    pub fn new(options: &TransportOptions) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.clone())
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let mut fetched = FetchResponse {
            status,
            content_type,
            body: String::new(),
        };

        // Only download the body when we are going to parse it.
        // Error pages and binary files are dropped unread.
        if fetched.is_usable() {
            fetched.body = response
                .text()
                .await
                .map_err(|e| FetchError::Transport(e.to_string()))?;
        }

        Ok(fetched)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait instead of calling reqwest everywhere?
//    - The crawler only needs "fetch this URL"
//    - In tests we implement Transport for a HashMap of fake pages, so the
//      crawl logic can be tested without a network
//
// 2. What does #[async_trait] do?
//    - Plain traits can't be used as `dyn Trait` if they have async methods
//    - async_trait rewrites `async fn` into a method returning a boxed future
//
// 3. Why is content_type a String and not a header value?
//    - The crawler only needs to check for "text/html"
//    - A String keeps the Transport trait independent of reqwest's types
// -----------------------------------------------------------------------------

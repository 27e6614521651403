// src/fetch/mod.rs
// =============================================================================
// This module fetches pages over HTTP.
//
// The crawler never talks to reqwest directly. It goes through the
// Transport trait, so tests can swap in an in-memory site and the real
// program can use HttpTransport.
//
// Every way a fetch can go wrong (network error, 4xx/5xx status, a PDF
// instead of HTML) is a FetchError. The crawler treats all of them the same:
// log it and move on.
// =============================================================================

mod http;

pub use http::{FetchResponse, HttpTransport, Transport, TransportOptions};

// Only fake transports outside this module need to name the error type
#[cfg(test)]
pub use http::FetchError;

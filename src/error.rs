//! Error taxonomy for the ingestion pipeline.
//!
//! Network failures (transport errors and non-success statuses) and store
//! failures are fatal to the current run and are surfaced to the caller.
//! Items with a missing or unparsable publish date are not errors at all:
//! the extractor skips them.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The request never produced a response (DNS, connect, timeout, body read).
    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    HttpStatus {
        url: String,
        status: u16,
        /// Excerpt of the response body, for diagnostics.
        body: String,
    },

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("word store error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("invalid date {input:?}: expected YYYY-MM-DD")]
    Validation { input: String },

    #[error("invalid configuration in {path}: {message}")]
    Config { path: String, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error belongs to the network class (feed or search
    /// endpoint unreachable, or answering with a non-success status).
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Http { .. } | Error::HttpStatus { .. })
    }
}

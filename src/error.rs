use ::scraper::error::SelectorErrorKind;
use std::path::PathBuf;

/// All errors that can occur while syncing a tournament archive.
#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    /// HTTP request failed (network, DNS, TLS, timeout, etc.).
    #[error("http request failed for {url}: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// Server returned a non-success HTTP status code.
    #[error("unexpected status {status} for {url}")]
    UnexpectedStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// Failed to read the response body as text.
    #[error("failed to read response body from {url}: {source}")]
    ResponseBody {
        url: String,
        source: reqwest::Error,
    },

    /// A CSS selector string could not be parsed.
    #[error("invalid CSS selector: {0}")]
    Selector(String),

    /// A bounded wait for an element ran out.
    #[error("timed out after {waited_ms}ms waiting for {selector}")]
    Timeout { selector: String, waited_ms: u64 },

    /// An expected HTML element was not found on the page.
    #[error("expected element not found: {context}")]
    ElementNotFound { context: &'static str },

    /// The renderer cannot perform the requested interaction.
    #[error("renderer does not support {0}")]
    Unsupported(&'static str),

    /// The renderer session itself is gone; nothing more can be fetched this cycle.
    #[error("renderer session failed: {0}")]
    Session(String),

    /// Reading or writing a file failed.
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A JSON document could not be encoded or decoded.
    #[error("invalid json in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Invalid configuration value.
    #[error("configuration error: {0}")]
    Config(String),

    /// No source URL is configured for the requested year.
    #[error("year {year} is not configured (available: {available:?})")]
    UnknownYear { year: i32, available: Vec<i32> },
}

impl SyncError {
    /// Whether the error ends the whole cycle rather than a single record.
    pub fn is_session_fatal(&self) -> bool {
        matches!(self, SyncError::Session(_))
    }
}

impl<'a> From<SelectorErrorKind<'a>> for SyncError {
    fn from(err: SelectorErrorKind<'a>) -> Self {
        SyncError::Selector(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;

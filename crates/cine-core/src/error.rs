//! Unified error type for cineanalytics.
//!
//! Every failure the fetch client can produce is funnelled into [`Error`].
//! Nothing in the stack turns an error into an empty result list; callers
//! that display results carry the error alongside them instead.

use std::fmt;

/// Unified error type covering every way a movie lookup can fail.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The request never produced an HTTP response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The metadata API answered with a non-2xx status.
    #[error("Fetch failed with HTTP {status}")]
    FetchFailed {
        /// The HTTP status code returned upstream.
        status: u16,
    },

    /// The response body was not the JSON shape we expected.
    #[error("Parse error: {0}")]
    ParseFailed(String),

    /// The requested entity does not exist upstream.
    #[error("{entity} not found: {id}")]
    NotFound {
        /// The kind of entity (e.g. "movie").
        entity: String,
        /// The identifier that was looked up.
        id: String,
    },

    /// No response arrived inside the request window.
    #[error("Request timed out after {after_ms} ms")]
    Timeout {
        /// Length of the window that elapsed.
        after_ms: u64,
    },

    /// The caller broke a request precondition (empty search term, id 0).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Map this error to the HTTP status the JSON API should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            Error::NotFound { .. } => 404,
            Error::InvalidRequest(_) => 400,
            Error::Timeout { .. } => 504,
            Error::Network(_) => 502,
            Error::FetchFailed { .. } => 502,
            Error::ParseFailed(_) => 502,
        }
    }

    /// Stable machine-readable code for JSON bodies and SSE payloads.
    pub fn code(&self) -> &'static str {
        match self {
            Error::Network(_) => "network_error",
            Error::FetchFailed { .. } => "fetch_failed",
            Error::ParseFailed(_) => "parse_failed",
            Error::NotFound { .. } => "not_found",
            Error::Timeout { .. } => "timeout",
            Error::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Whether repeating the same request could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Network(_) | Error::Timeout { .. } => true,
            Error::FetchFailed { status } => *status == 429 || *status >= 500,
            Error::ParseFailed(_) | Error::NotFound { .. } | Error::InvalidRequest(_) => false,
        }
    }

    /// Convenience constructor for [`Error::NotFound`].
    pub fn not_found(entity: impl Into<String>, id: impl fmt::Display) -> Self {
        Error::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

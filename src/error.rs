// src/error.rs
// =============================================================================
// Error types shared across the library.
//
// There are three families:
// - FetchError: one HTTP request (with or without retries) went wrong
// - PageLoadError: the page renderer could not produce a page
// - InitError: something needed by the WHOLE run could not be set up
//
// Only InitError is allowed to stop a batch. Everything else is turned into
// a KO outcome for a single URL by the validator.
// =============================================================================

use std::time::Duration;

use thiserror::Error;

/// Errors from a single HTTP exchange.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection refused, DNS failure, reset, TLS, etc.
    #[error("network error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The request did not complete within the client timeout.
    #[error("timeout fetching {url}")]
    Timeout { url: String },

    /// The server answered with a non-success status.
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        url: String,
        status: u16,
        /// Parsed Retry-After header, when the server sent one.
        retry_after: Option<Duration>,
    },

    /// The request could not even be built or followed (bad URL, redirect loop).
    #[error("invalid request for {url}: {source}")]
    InvalidRequest {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl FetchError {
    /// Sorts a reqwest send error into our taxonomy.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else if source.is_builder() || source.is_redirect() {
            Self::InvalidRequest { url, source }
        } else {
            Self::Transport { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16, retry_after: Option<Duration>) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
            retry_after,
        }
    }

    /// Transport failures, timeouts, 429 and 5xx are worth another attempt.
    /// Every other 4xx (and anything we could not send at all) is terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::Timeout { .. } => true,
            Self::HttpStatus { status, .. } => *status == 429 || (500..600).contains(status),
            Self::InvalidRequest { .. } => false,
        }
    }

    /// Server-requested wait before the next attempt, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::HttpStatus { retry_after, .. } => *retry_after,
            _ => None,
        }
    }
}

/// The renderer could not load a page. The reason is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct PageLoadError {
    pub reason: String,
}

impl PageLoadError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl From<FetchError> for PageLoadError {
    fn from(error: FetchError) -> Self {
        let reason = match &error {
            FetchError::HttpStatus { status, .. } => format!("HTTP {}", status),
            FetchError::Timeout { .. } => "navigation timeout".to_string(),
            FetchError::Transport { source, .. } => format!("network error: {}", source),
            FetchError::InvalidRequest { source, .. } => format!("invalid request: {}", source),
        };
        Self { reason }
    }
}

/// Failures that prevent the whole batch from running.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),

    #[error("invalid documentation class signature: {0}")]
    InvalidSignature(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

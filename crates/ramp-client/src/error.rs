//! Error types for the Ramp client.

use crate::shape::ShapeMismatch;
use thiserror::Error;

/// Result type alias using `RampError`.
pub type RampResult<T> = Result<T, RampError>;

/// Errors that can occur when talking to the Ramp developer API.
#[derive(Debug, Error)]
pub enum RampError {
    /// Client configuration is incomplete or malformed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Token acquisition failed or the API rejected our credentials.
    #[error("Authentication error: {0}")]
    AuthError(String),

    /// A request was rejected locally before being sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found (404).
    #[error("Not found: {0}")]
    NotFound(String),

    /// Conflicting resource, e.g. a reused idempotency key (409).
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Rate limited (429).
    #[error("Rate limited{}", retry_after_suffix(.retry_after_secs))]
    RateLimited { retry_after_secs: Option<u64> },

    /// Any other non-success status returned by the API.
    #[error("Ramp API error (HTTP {status}): {detail}")]
    Api { status: u16, detail: String },

    /// The API host could not be reached.
    #[error("Ramp API unreachable: {0}")]
    Unreachable(String),

    /// The HTTP request timed out.
    #[error("Timed out: {0}")]
    Timeout(String),

    /// A deferred task had not finished when polling stopped.
    #[error("Deferred task {task_id} still running after {polls} poll(s)")]
    TaskPending { task_id: String, polls: u32 },

    /// Response body could not be decoded.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// A response did not match its expected shape.
    #[error("Response shape mismatch: {0}")]
    ShapeMismatch(#[from] ShapeMismatch),

    /// Retry budget exhausted.
    #[error("Maximum retries exceeded after {attempts} attempt(s): {message}")]
    MaxRetriesExceeded { attempts: u32, message: String },

    /// Lower-level HTTP failure not covered above.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
}

fn retry_after_suffix(retry_after_secs: &Option<u64>) -> String {
    match retry_after_secs {
        Some(secs) => format!(", retry after {secs}s"),
        None => String::new(),
    }
}

impl RampError {
    /// Transient failures worth retrying.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::Unreachable(_) | Self::Timeout(_)
        )
    }

    /// Whether this is a 5xx response from the API.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}

impl From<reqwest::Error> for RampError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            Self::Unreachable(e.to_string())
        } else if e.is_timeout() {
            Self::Timeout(e.to_string())
        } else if e.is_decode() {
            Self::ParseError(e.to_string())
        } else {
            Self::Http(e)
        }
    }
}

impl From<serde_json::Error> for RampError {
    fn from(e: serde_json::Error) -> Self {
        Self::ParseError(e.to_string())
    }
}

//! Errors from the generation service client

use thiserror::Error;

/// Result type for generation client calls
pub type Result<T> = std::result::Result<T, Error>;

/// A failed call to the generation service.
///
/// Nothing here is retried; each variant is terminal for the request that
/// produced it.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure or local timeout
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status other than auth or quota
    #[error("Generation service returned {status_code}: {message}")]
    Api { status_code: u16, message: String },

    /// The API key was rejected
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Quota exhausted
    #[error("Rate limit exceeded, retry after {retry_after_secs}s")]
    RateLimit { retry_after_secs: u64 },

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A success response that could not be decoded
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

//! Error types for the fetcher module

use thiserror::Error;

/// Error type for fetch operations
#[derive(Debug, Error)]
pub enum FetchError {
    /// Scraping credentials are not configured
    #[error("{0} is not configured")]
    MissingCredentials(&'static str),

    /// Transport failure or local timeout talking to the scraper
    #[error("Scraping service unreachable: {0}")]
    Http(#[from] reqwest::Error),

    /// The scraper answered with a non-success status
    #[error("Scraping failed ({status})")]
    Upstream { status: u16, message: String },

    /// The scraper reported failure or returned no markdown
    #[error("Scraping service returned no content for {url}")]
    NoContent { url: String },

    /// The scraper response could not be decoded
    #[error("Unexpected scraping response: {0}")]
    UnexpectedResponse(String),
}

//! # Content Fetcher
//!
//! First stage of the enrichment pipeline: retrieve the rendered main content
//! of a company's website through an external scraping service and bound its
//! size for the extraction stage.
//!
//! ## Key Components
//!
//! - `ContentFetcher`: the capability the controller depends on
//! - `FirecrawlFetcher`: implementation backed by the Firecrawl scrape API
//! - `FetcherConfig`: scrape options and the content character budget
//! - `PageContent`: the normalised page handed to the extractor
//!
//! The fetcher never persists anything; its only side effect is the outbound
//! scrape request.

mod config;
mod error;
mod firecrawl;

pub use config::{DEFAULT_FIRECRAWL_BASE_URL, FetcherConfig, FetcherConfigBuilder};
pub use error::FetchError;
pub use firecrawl::FirecrawlFetcher;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::subject::Subject;

/// Character budget applied to scraped markdown before extraction
pub const DEFAULT_MAX_CONTENT_CHARS: usize = 12_000;

/// Retrieves page content for a subject
#[async_trait]
pub trait ContentFetcher: Send + Sync {
    async fn fetch(&self, subject: &Subject) -> Result<PageContent, FetchError>;
}

/// Main content of a fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageContent {
    /// URL reported by the scraper, or the requested URL when absent
    pub source_url: String,

    /// Page title, empty when the scraper reported none
    pub title: String,

    /// Markdown body, capped at the configured character budget
    pub markdown_body: String,
}

impl PageContent {
    /// Build page content, truncating the body to `max_chars` characters
    pub fn new(
        source_url: impl Into<String>,
        title: impl Into<String>,
        markdown_body: &str,
        max_chars: usize,
    ) -> Self {
        Self {
            source_url: source_url.into(),
            title: title.into().trim().to_string(),
            markdown_body: truncate_chars(markdown_body, max_chars).to_string(),
        }
    }
}

/// Returns the first `max_chars` characters of `text`.
///
/// Counts Unicode scalar values, so a multi-byte character is never split.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_offset, _)) => &text[..byte_offset],
        None => text,
    }
}

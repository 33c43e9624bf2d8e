//! # Fetcher Configuration Module
//!
//! Options sent to the scraping service with every request, plus the
//! character budget applied to the returned markdown. Uses a builder pattern
//! for flexible configuration.

use std::time::Duration;

use super::DEFAULT_MAX_CONTENT_CHARS;

/// Default base URL of the Firecrawl API
pub const DEFAULT_FIRECRAWL_BASE_URL: &str = "https://api.firecrawl.dev";

/// Configuration for the content fetcher
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    /// Base URL of the scraping service
    pub base_url: String,

    /// Only return the primary readable content of the page
    pub only_main_content: bool,

    /// Upstream scrape timeout in milliseconds
    pub timeout_ms: u64,

    /// Strip embedded base64 images from the returned markdown
    pub remove_base64_images: bool,

    /// Ask the scraper to block ads while rendering
    pub block_ads: bool,

    /// Character budget for the markdown body
    pub max_content_chars: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_FIRECRAWL_BASE_URL.to_string(),
            only_main_content: true,
            timeout_ms: 30_000,
            remove_base64_images: true,
            block_ads: true,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }
}

/// Builder for FetcherConfig
#[derive(Debug, Default)]
pub struct FetcherConfigBuilder {
    config: FetcherConfig,
}

impl FetcherConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: FetcherConfig::default(),
        }
    }

    /// Set the base URL of the scraping service
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn only_main_content(mut self, only_main_content: bool) -> Self {
        self.config.only_main_content = only_main_content;
        self
    }

    /// Set the upstream scrape timeout in milliseconds
    pub fn timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.config.timeout_ms = timeout_ms;
        self
    }

    pub fn remove_base64_images(mut self, remove_base64_images: bool) -> Self {
        self.config.remove_base64_images = remove_base64_images;
        self
    }

    pub fn block_ads(mut self, block_ads: bool) -> Self {
        self.config.block_ads = block_ads;
        self
    }

    /// Set the character budget for the markdown body
    pub fn max_content_chars(mut self, max_content_chars: usize) -> Self {
        self.config.max_content_chars = max_content_chars;
        self
    }

    /// Build the configuration
    pub fn build(self) -> FetcherConfig {
        self.config
    }
}

impl FetcherConfig {
    /// Create a new builder
    pub fn builder() -> FetcherConfigBuilder {
        FetcherConfigBuilder::new()
    }

    /// Upstream scrape timeout as a Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Local HTTP timeout. Leaves the upstream room to report its own timeout first.
    pub fn http_timeout(&self) -> Duration {
        self.timeout() + Duration::from_secs(15)
    }
}

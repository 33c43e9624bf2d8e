//! # Settings
//!
//! Runtime settings read from the environment. Credentials are optional at
//! this level: a missing key produces a pipeline that fails every request
//! with a configuration error, rather than a process that refuses to start.

use std::num::{NonZeroU32, NonZeroU64};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;

use crate::cache::{DEFAULT_CACHE_DIR, FileStore};
use crate::enrichment::{Enricher, EnricherConfig};
use crate::extractor::{DEFAULT_MODEL, ExtractError, GeminiExtractor, RateLimitedExtractor, StructuredExtractor};
use crate::fetcher::{DEFAULT_FIRECRAWL_BASE_URL, FetchError, FetcherConfig, FirecrawlFetcher};

pub const FIRECRAWL_API_KEY: &str = "FIRECRAWL_API_KEY";
pub const FIRECRAWL_BASE_URL: &str = "FIRECRAWL_BASE_URL";
pub const GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const GEMINI_MODEL: &str = "DEALFLOW_GEMINI_MODEL";
pub const CACHE_DIR: &str = "DEALFLOW_CACHE_DIR";
pub const EXTRACTION_TIMEOUT_SECS: &str = "DEALFLOW_EXTRACTION_TIMEOUT_SECS";
pub const EXTRACTIONS_PER_MINUTE: &str = "DEALFLOW_EXTRACTIONS_PER_MINUTE";

/// Error type for settings and pipeline construction
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Failed to build fetcher: {0}")]
    Fetcher(#[from] FetchError),

    #[error("Failed to build extractor: {0}")]
    Extractor(#[from] ExtractError),
}

/// Runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub firecrawl_api_key: Option<String>,
    pub firecrawl_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub cache_dir: PathBuf,
    pub extraction_timeout: Duration,
    /// Client-side pacing of extraction calls, unlimited when `None`
    pub extractions_per_minute: Option<NonZeroU32>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            firecrawl_api_key: None,
            firecrawl_base_url: DEFAULT_FIRECRAWL_BASE_URL.to_string(),
            gemini_api_key: None,
            gemini_model: DEFAULT_MODEL.to_string(),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            extraction_timeout: EnricherConfig::default().extraction_timeout,
            extractions_per_minute: None,
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build settings from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let extraction_timeout = match get(EXTRACTION_TIMEOUT_SECS) {
            Some(value) => {
                let secs: NonZeroU64 = parse(EXTRACTION_TIMEOUT_SECS, &value)?;
                Duration::from_secs(secs.get())
            }
            None => defaults.extraction_timeout,
        };
        let extractions_per_minute = get(EXTRACTIONS_PER_MINUTE)
            .map(|value| parse(EXTRACTIONS_PER_MINUTE, &value))
            .transpose()?;

        Ok(Self {
            firecrawl_api_key: get(FIRECRAWL_API_KEY),
            firecrawl_base_url: get(FIRECRAWL_BASE_URL).unwrap_or(defaults.firecrawl_base_url),
            gemini_api_key: get(GEMINI_API_KEY),
            gemini_model: get(GEMINI_MODEL).unwrap_or(defaults.gemini_model),
            cache_dir: get(CACHE_DIR).map(PathBuf::from).unwrap_or(defaults.cache_dir),
            extraction_timeout,
            extractions_per_minute,
        })
    }

    pub fn fetcher_config(&self) -> FetcherConfig {
        FetcherConfig::builder()
            .base_url(&self.firecrawl_base_url)
            .build()
    }

    pub fn enricher_config(&self) -> EnricherConfig {
        EnricherConfig::builder()
            .extraction_timeout(self.extraction_timeout)
            .build()
    }

    pub fn file_store(&self) -> FileStore {
        FileStore::new(&self.cache_dir)
    }

    /// Assemble the full pipeline backed by the file store
    pub fn build_enricher(&self) -> Result<Enricher, ConfigError> {
        let fetcher = FirecrawlFetcher::new(self.firecrawl_api_key.clone(), self.fetcher_config())?;
        let gemini = GeminiExtractor::new(self.gemini_api_key.clone(), &self.gemini_model)?;
        let extractor: Arc<dyn StructuredExtractor> = match self.extractions_per_minute {
            Some(quota) => Arc::new(RateLimitedExtractor::per_minute(gemini, quota)),
            None => Arc::new(gemini),
        };

        Ok(Enricher::with_config(
            Arc::new(fetcher),
            extractor,
            Arc::new(self.file_store()),
            self.enricher_config(),
        ))
    }
}

fn parse<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::InvalidValue {
        var,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

//! # Structured Extractor
//!
//! Turns fetched page content into a validated [`CompanyProfile`]. The
//! generation backend is asked for schema-constrained JSON, and the output is
//! checked again locally before anything downstream sees it.

use async_trait::async_trait;

use crate::fetcher::PageContent;

mod error;
mod gemini;
mod prompt;
mod ratelimited;
pub mod schema;

pub use error::ExtractError;
pub use gemini::{DEFAULT_MODEL, GeminiExtractor};
pub use prompt::build_prompt;
pub use ratelimited::RateLimitedExtractor;
pub use schema::{
    CompanyProfile, SchemaViolation, Signal, parse_profile, response_schema, validate_profile,
};

/// Produces a structured profile from page content
#[async_trait]
pub trait StructuredExtractor: Send + Sync {
    /// Wait until a call to `extract` may start without queueing.
    ///
    /// Callers that put a deadline on `extract` await this first, so time
    /// spent waiting for quota is not counted against the deadline.
    async fn ready(&self) {}

    async fn extract(&self, page: &PageContent) -> Result<CompanyProfile, ExtractError>;
}

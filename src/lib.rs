//! # dealflow - Company Website Enrichment
//!
//! Given a company's website URL, dealflow fetches the page's main content
//! through a scraping service, extracts structured investor-relevant
//! intelligence with a schema-constrained generation call, and caches the
//! result per company.
//!
//! ## Features
//!
//! - Content fetching via Firecrawl with a bounded character budget
//! - Schema-constrained extraction via Gemini, validated locally
//! - Durable per-subject cache with no expiry and optional forced refresh
//! - One in-flight enrichment per subject; concurrent callers share it
//! - An HTTP surface and a CLI over the same controller
//!
//! ## Example
//!
//! ```rust,no_run
//! use dealflow::config::Settings;
//! use dealflow::subject::EnrichmentRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let enricher = Settings::from_env()?.build_enricher()?;
//!
//!     let result = enricher
//!         .enrich(&EnrichmentRequest::new("https://example.com"))
//!         .await?;
//!
//!     println!("{}", result.summary);
//!     for signal in &result.signals {
//!         println!("{} {}", if signal.positive { "+" } else { "-" }, signal.label);
//!     }
//!     Ok(())
//! }
//! ```

mod error;

pub mod cache;
pub mod config;
pub mod enrichment;
pub mod extractor;
pub mod fetcher;
pub mod gemini;
pub mod server;
pub mod subject;

#[cfg(test)]
mod testing;

pub use error::{Error, Result};

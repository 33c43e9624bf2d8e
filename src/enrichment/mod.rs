//! # Enrichment Controller
//!
//! Orchestrates one enrichment: cache lookup, then fetch, then extraction,
//! then a cache write. Any failure short-circuits without touching the cache.
//!
//! ## Key Components
//!
//! - `Enricher`: the request controller, with per-subject in-flight dedup
//! - `EnrichmentResult`: the cached artifact
//! - `EnrichmentStatus`: loading/ready/failed state observable by callers
//! - `EnrichmentError`: the flattened error surfaced to callers

mod controller;
mod error;
mod result;

pub use controller::{Enricher, EnricherConfig, EnricherConfigBuilder, EnrichmentStatus, Refresh};
pub use error::{EnrichmentError, ErrorKind};
pub use result::{EnrichmentResult, Source};

//! # Enrichment Cache
//!
//! Key-value storage for finished enrichments, keyed by a subject's canonical
//! URL. Entries never expire; the controller is the only writer and only
//! writes after a fully successful pipeline run.
//!
//! The backend is injected into the controller through [`EnrichmentStore`],
//! so a file-backed store, an in-memory store, or anything else can be used
//! without touching pipeline logic.

use async_trait::async_trait;

use crate::enrichment::EnrichmentResult;

mod error;
mod file;
mod memory;

pub use error::StoreError;
pub use file::{DEFAULT_CACHE_DIR, FileStore};
pub use memory::MemoryStore;

/// Persistent storage for enrichment results
#[async_trait]
pub trait EnrichmentStore: Send + Sync {
    /// Look up the entry for `key`, `None` when absent
    async fn get(&self, key: &str) -> Result<Option<EnrichmentResult>, StoreError>;

    /// Insert or replace the entry for `key`
    async fn put(&self, key: &str, result: &EnrichmentResult) -> Result<(), StoreError>;

    /// All entries, ordered by key
    async fn list(&self) -> Result<Vec<(String, EnrichmentResult)>, StoreError>;
}

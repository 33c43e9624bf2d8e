use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{EnrichmentStore, StoreError};
use crate::enrichment::EnrichmentResult;

/// Process-local store, lost on exit
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<BTreeMap<String, EnrichmentResult>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EnrichmentStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<EnrichmentResult>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, result: &EnrichmentResult) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), result.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, EnrichmentResult)>, StoreError> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .map(|(key, result)| (key.clone(), result.clone()))
            .collect())
    }
}

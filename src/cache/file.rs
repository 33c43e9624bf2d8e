use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};
use url::{Position, Url, form_urlencoded};

use super::{EnrichmentStore, StoreError};
use crate::enrichment::EnrichmentResult;

/// Default directory for cached enrichments
pub const DEFAULT_CACHE_DIR: &str = ".dealflow/enrichments";

// Leaves room for the `.json.tmp` suffix under the usual 255-byte limit
const MAX_NAME_LEN: usize = 200;

fn encode(s: &str) -> String {
    form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

/// On-disk representation of one cache entry
#[derive(Debug, Serialize, Deserialize)]
struct Entry {
    key: String,
    result: EnrichmentResult,
}

/// Store keeping one JSON file per subject under `<base>/<scheme>/<host>/`.
///
/// Entries survive across sessions. The key recorded inside each file is
/// authoritative; a file whose key does not match the lookup is treated as
/// absent.
#[derive(Debug, Clone)]
pub struct FileStore {
    base_path: PathBuf,
}

impl Default for FileStore {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_DIR)
    }
}

impl FileStore {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Gets the storage path for a cache key.
    ///
    /// Layout is `<base>/<scheme>/<authority>/<path-and-query>.json` with each
    /// component percent-encoded, so distinct keys never share a file. Long
    /// names are split into directory chunks ending in `~` to stay under the
    /// file name limit.
    fn entry_path(&self, key: &str) -> Result<PathBuf, StoreError> {
        let url = Url::parse(key).map_err(|_| StoreError::InvalidKey(key.to_string()))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(StoreError::InvalidKey(key.to_string()));
        }

        let authority = encode(&url[Position::BeforeUsername..Position::AfterPort]);
        let name = encode(&url[Position::BeforePath..]);

        let mut path = self.base_path.join(url.scheme()).join(authority);
        let mut rest = name.as_str();
        while rest.len() > MAX_NAME_LEN {
            let (chunk, tail) = rest.split_at(MAX_NAME_LEN);
            path.push(format!("{chunk}~"));
            rest = tail;
        }
        path.push(format!("{rest}.json"));
        Ok(path)
    }

    async fn read_entry(path: &Path) -> Result<Option<Entry>, StoreError> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl EnrichmentStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<EnrichmentResult>, StoreError> {
        let path = self.entry_path(key)?;
        match Self::read_entry(&path).await? {
            Some(entry) if entry.key == key => Ok(Some(entry.result)),
            Some(entry) => {
                debug!(path = %path.display(), stored = %entry.key, "Cache file belongs to another key");
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, result: &EnrichmentResult) -> Result<(), StoreError> {
        let path = self.entry_path(key)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let entry = Entry {
            key: key.to_string(),
            result: result.clone(),
        };
        let json = serde_json::to_vec_pretty(&entry)?;

        // Readers never see a half-written entry
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).await?;
        fs::rename(&tmp, &path).await?;

        debug!(path = %path.display(), "Stored enrichment");
        Ok(())
    }

    async fn list(&self) -> Result<Vec<(String, EnrichmentResult)>, StoreError> {
        if !fs::try_exists(&self.base_path).await? {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        let mut dirs = vec![self.base_path.clone()];
        while let Some(dir) = dirs.pop() {
            let mut children = fs::read_dir(&dir).await?;
            while let Some(child) = children.next_entry().await? {
                let path = child.path();
                if child.file_type().await?.is_dir() {
                    dirs.push(path);
                    continue;
                }
                if path.extension().is_none_or(|ext| ext != "json") {
                    continue;
                }
                match Self::read_entry(&path).await {
                    Ok(Some(entry)) => entries.push((entry.key, entry.result)),
                    Ok(None) => {}
                    Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable cache file"),
                }
            }
        }

        entries.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(entries)
    }
}

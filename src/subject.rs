//! Enrichment subjects and their canonical cache keys

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use url::Url;

/// The only input to the enrichment pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentRequest {
    /// Website URL of the company being enriched
    pub subject_url: String,
}

impl EnrichmentRequest {
    pub fn new(subject_url: impl Into<String>) -> Self {
        Self {
            subject_url: subject_url.into(),
        }
    }
}

/// Rejection of a subject URL before any network call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidSubject {
    #[error("A valid URL is required")]
    Missing,

    #[error("Invalid URL '{url}': {reason}")]
    Malformed { url: String, reason: String },

    #[error("Unsupported URL scheme '{scheme}' (expected http or https)")]
    UnsupportedScheme { scheme: String },
}

/// A company website, identified by its canonical URL.
///
/// Parsing normalises the URL the way the `url` crate serialises it
/// (lower-case scheme and host, default port dropped, empty path becomes `/`)
/// and strips any fragment, so `https://Example.com#team` and
/// `https://example.com/` share one cache entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Subject {
    url: Url,
}

impl Subject {
    pub fn parse(input: &str) -> Result<Self, InvalidSubject> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(InvalidSubject::Missing);
        }

        let mut url = Url::parse(trimmed).map_err(|e| InvalidSubject::Malformed {
            url: trimmed.to_string(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(InvalidSubject::UnsupportedScheme {
                    scheme: other.to_string(),
                });
            }
        }

        if url.host_str().is_none_or(str::is_empty) {
            return Err(InvalidSubject::Malformed {
                url: trimmed.to_string(),
                reason: "missing host".to_string(),
            });
        }

        url.set_fragment(None);
        Ok(Self { url })
    }

    /// Cache key for this subject
    pub fn key(&self) -> &str {
        self.url.as_str()
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn domain(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl TryFrom<&EnrichmentRequest> for Subject {
    type Error = InvalidSubject;

    fn try_from(request: &EnrichmentRequest) -> Result<Self, Self::Error> {
        Subject::parse(&request.subject_url)
    }
}

//! Error taxonomy surfaced at the controller boundary

use std::time::Duration;

use thiserror::Error;

use crate::extractor::ExtractError;
use crate::fetcher::FetchError;
use crate::subject::InvalidSubject;

/// Coarse classification of an [`EnrichmentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    UpstreamFetch,
    Generation,
    SchemaValidation,
    Configuration,
    Timeout,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::UpstreamFetch => "upstream_fetch",
            ErrorKind::Generation => "generation",
            ErrorKind::SchemaValidation => "schema_validation",
            ErrorKind::Configuration => "configuration",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Internal => "internal",
        }
    }
}

/// A failed enrichment.
///
/// Variants carry the rendered message rather than the source error, so one
/// outcome can be handed to every caller waiting on the same subject.
/// `Display` is the single human-readable message shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnrichmentError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    UpstreamFetch(String),

    #[error("{0}")]
    Generation(String),

    #[error("{0}")]
    SchemaValidation(String),

    #[error("{0}")]
    Configuration(String),

    #[error("Extraction timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("Enrichment failed unexpectedly: {0}")]
    Internal(String),
}

impl EnrichmentError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            EnrichmentError::InvalidInput(_) => ErrorKind::InvalidInput,
            EnrichmentError::UpstreamFetch(_) => ErrorKind::UpstreamFetch,
            EnrichmentError::Generation(_) => ErrorKind::Generation,
            EnrichmentError::SchemaValidation(_) => ErrorKind::SchemaValidation,
            EnrichmentError::Configuration(_) => ErrorKind::Configuration,
            EnrichmentError::Timeout(_) => ErrorKind::Timeout,
            EnrichmentError::Internal(_) => ErrorKind::Internal,
        }
    }
}

impl From<InvalidSubject> for EnrichmentError {
    fn from(err: InvalidSubject) -> Self {
        EnrichmentError::InvalidInput(err.to_string())
    }
}

impl From<FetchError> for EnrichmentError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::MissingCredentials(_) => EnrichmentError::Configuration(err.to_string()),
            FetchError::Upstream { status, ref message } if !message.trim().is_empty() => {
                EnrichmentError::UpstreamFetch(format!(
                    "Scraping failed ({status}): {}",
                    crate::fetcher::truncate_chars(message.trim(), 200)
                ))
            }
            other => EnrichmentError::UpstreamFetch(other.to_string()),
        }
    }
}

impl From<ExtractError> for EnrichmentError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::MissingCredentials(_) => EnrichmentError::Configuration(err.to_string()),
            ExtractError::Generation(_) | ExtractError::Blocked(_) => {
                EnrichmentError::Generation(err.to_string())
            }
            ExtractError::Schema(_) => EnrichmentError::SchemaValidation(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::SchemaViolation;

    #[test]
    fn test_fetch_error_mapping() {
        let err: EnrichmentError = FetchError::MissingCredentials("FIRECRAWL_API_KEY").into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "FIRECRAWL_API_KEY is not configured");

        let err: EnrichmentError = FetchError::Upstream {
            status: 402,
            message: " Payment required ".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFetch);
        assert_eq!(err.to_string(), "Scraping failed (402): Payment required");

        let err: EnrichmentError = FetchError::NoContent {
            url: "https://example.com/".to_string(),
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::UpstreamFetch);

        let err = EnrichmentError::from(InvalidSubject::Missing);
        assert_eq!(err, EnrichmentError::InvalidInput("A valid URL is required".to_string()));
    }

    #[test]
    fn test_extract_error_mapping() {
        let err: EnrichmentError = ExtractError::Schema(SchemaViolation::Empty).into();
        assert_eq!(err.kind(), ErrorKind::SchemaValidation);
        assert!(err.to_string().starts_with("Failed to extract structured data"));

        let err: EnrichmentError = ExtractError::Blocked("SAFETY".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::Generation);

        let err: EnrichmentError = ExtractError::MissingCredentials("GEMINI_API_KEY").into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
    }

    #[test]
    fn test_timeout_message() {
        let err = EnrichmentError::Timeout(Duration::from_secs(60));
        assert_eq!(err.to_string(), "Extraction timed out after 60s");
        assert_eq!(err.kind().as_str(), "timeout");
    }
}

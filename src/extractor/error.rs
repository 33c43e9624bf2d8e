//! Error types for the extractor module

use thiserror::Error;

use super::SchemaViolation;

/// Error type for extraction operations
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Generation credentials are not configured
    #[error("{0} is not configured")]
    MissingCredentials(&'static str),

    /// The generation service call failed (network, auth, quota)
    #[error("Generation failed: {0}")]
    Generation(#[from] crate::error::Error),

    /// The generation service refused the prompt
    #[error("Generation blocked: {0}")]
    Blocked(String),

    /// Output was missing or violated the schema
    #[error("Failed to extract structured data from content: {0}")]
    Schema(#[from] SchemaViolation),
}

//! Gemini-backed structured extractor

use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::prompt::build_prompt;
use super::schema::{parse_profile, response_schema};
use super::{CompanyProfile, ExtractError, StructuredExtractor};
use crate::fetcher::PageContent;
use crate::gemini::Client;
use crate::gemini::prelude::{Content, GenerationConfig, HttpOptions};

/// Default model used for extraction
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

/// Extracts a [`CompanyProfile`] with a schema-constrained Gemini call
#[derive(Clone)]
pub struct GeminiExtractor {
    client: Option<Client>,
    model: String,
}

impl GeminiExtractor {
    /// Create an extractor. A missing API key is reported on every extraction, not here.
    pub fn new(api_key: Option<String>, model: impl Into<String>) -> Result<Self, ExtractError> {
        Self::with_options(api_key, model, HttpOptions::default())
    }

    pub fn with_options(
        api_key: Option<String>,
        model: impl Into<String>,
        options: HttpOptions,
    ) -> Result<Self, ExtractError> {
        let client = api_key
            .filter(|key| !key.trim().is_empty())
            .map(|key| Client::with_options(key, options))
            .transpose()?;

        Ok(Self {
            client,
            model: model.into(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StructuredExtractor for GeminiExtractor {
    #[instrument(name = "extract", skip(self, page), fields(url = %page.source_url, model = %self.model))]
    async fn extract(&self, page: &PageContent) -> Result<CompanyProfile, ExtractError> {
        let client = self
            .client
            .as_ref()
            .ok_or(ExtractError::MissingCredentials("GEMINI_API_KEY"))?;

        let content = Content::new()
            .with_role("user")
            .with_text(build_prompt(page));
        let config = GenerationConfig::structured(response_schema().clone());

        let response = client
            .models()
            .generate_content_with_config(&self.model, None, vec![content], Some(config))
            .await?;

        if let Some(reason) = response.block_reason() {
            warn!(reason, "Prompt was blocked");
            return Err(ExtractError::Blocked(reason.to_string()));
        }

        let text = response.text();
        debug!(
            finish_reason = ?response.finish_reason(),
            chars = text.len(),
            "Received generation output"
        );

        let profile = parse_profile(&text)?;
        info!(
            bullets = profile.bullets.len(),
            keywords = profile.keywords.len(),
            signals = profile.signals.len(),
            "Extracted company profile"
        );
        Ok(profile)
    }
}

//! Client entry point for the Gemini API

use crate::error::Result;
use crate::gemini::http::HttpClient;
use crate::gemini::models::ModelsService;
use crate::gemini::types::HttpOptions;

/// Client for the Gemini API
#[derive(Clone)]
pub struct Client {
    http_client: HttpClient,
}

impl Client {
    /// Create a new client with an API key for the Gemini Developer API
    pub fn with_api_key(api_key: impl Into<String>) -> Result<Self> {
        Self::with_options(api_key, HttpOptions::default())
    }

    /// Create a new client with custom HTTP options
    pub fn with_options(api_key: impl Into<String>, options: HttpOptions) -> Result<Self> {
        let http_client = HttpClient::with_api_key_and_options(api_key.into(), options)?;
        Ok(Self { http_client })
    }

    /// Access the models service
    pub fn models(&self) -> ModelsService {
        ModelsService::new(self.http_client.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation_with_options() {
        let options = HttpOptions {
            base_url: "http://localhost:8080".to_string(),
            ..HttpOptions::default()
        };
        assert!(Client::with_options("test-api-key", options).is_ok());
        assert!(Client::with_api_key("test-api-key").is_ok());
    }
}

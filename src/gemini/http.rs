//! HTTP transport for the Gemini Developer API

use crate::error::{Error, Result};
use crate::gemini::types::HttpOptions;
use reqwest::{Client as ReqwestClient, RequestBuilder, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument};
use url::Url;

/// Fallback wait suggested to callers when a 429 carries no `retry-after`
const DEFAULT_RETRY_AFTER_SECS: u64 = 60;

/// HTTP client for making requests to the Gemini API
///
/// Authenticates with an API key passed as the `key` query parameter. Requests
/// are never retried here: a rate-limited or failed call surfaces immediately
/// as an [`Error`] so the caller decides what a failure means.
#[derive(Clone)]
pub struct HttpClient {
    /// The underlying reqwest client
    client: ReqwestClient,

    /// Base URL for API requests
    base_url: String,

    /// API key for authentication
    api_key: String,

    /// API version path segment
    api_version: String,
}

#[cfg(test)]
impl HttpClient {
    /// Create a new HTTP client with an API key and default options
    pub fn with_api_key(api_key: String) -> Result<Self> {
        Self::with_api_key_and_options(api_key, HttpOptions::default())
    }

    /// Set the base URL (for testing only)
    pub fn set_base_url(&mut self, url: String) {
        self.base_url = url;
    }
}

impl HttpClient {
    /// Create a new HTTP client with an API key and custom options
    pub fn with_api_key_and_options(api_key: String, options: HttpOptions) -> Result<Self> {
        let client = ReqwestClient::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: options.base_url,
            api_key,
            api_version: options.api_version,
        })
    }

    fn build_url(&self, path: &str) -> Result<Url> {
        let url = format!("{}/{}/{}", self.base_url, self.api_version, path);
        Url::parse(&url).map_err(|e| Error::InvalidRequest(format!("Invalid URL: {}", e)))
    }

    /// Send a POST request with a JSON body
    #[instrument(skip(self, body), level = "debug")]
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.build_url(path)?;
        let request = self
            .client
            .post(url)
            .query(&[("key", &self.api_key)])
            .json(body);

        debug!("Sending POST request to {}", path);
        self.execute_request(request).await
    }

    /// Execute an HTTP request and map the response
    async fn execute_request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await?;
        let status = response.status();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.parse::<u64>().ok());

        let response_text = response.text().await?;

        if status.is_success() {
            return serde_json::from_str(&response_text).map_err(|e| {
                error!("Failed to parse response: {}", e);
                Error::UnexpectedResponse(format!("Failed to parse response: {}", e))
            });
        }

        error!("API error: {} - {}", status, response_text);
        match status {
            StatusCode::TOO_MANY_REQUESTS => Err(Error::RateLimit {
                retry_after_secs: retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(Error::Auth("Invalid API key or credentials".to_string()))
            }
            _ => Err(Error::Api {
                status_code: status.as_u16(),
                message: response_text,
            }),
        }
    }
}

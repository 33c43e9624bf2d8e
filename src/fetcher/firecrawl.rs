//! Firecrawl-backed content fetcher

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

use super::{ContentFetcher, FetchError, FetcherConfig, PageContent, truncate_chars};
use crate::subject::Subject;

/// Body of a Firecrawl `/v2/scrape` request
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScrapeRequest<'a> {
    url: &'a str,
    formats: [&'static str; 1],
    only_main_content: bool,
    timeout: u64,
    remove_base64_images: bool,
    block_ads: bool,
}

impl<'a> ScrapeRequest<'a> {
    fn new(url: &'a str, config: &FetcherConfig) -> Self {
        Self {
            url,
            formats: ["markdown"],
            only_main_content: config.only_main_content,
            timeout: config.timeout_ms,
            remove_base64_images: config.remove_base64_images,
            block_ads: config.block_ads,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<ScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ScrapeData {
    markdown: Option<String>,
    metadata: Option<ScrapeMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeMetadata {
    #[serde(rename = "sourceURL")]
    source_url: Option<String>,
    title: Option<Title>,
}

/// Some pages carry several `<title>` tags and Firecrawl reports them all
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Title {
    One(String),
    Many(Vec<String>),
}

impl Title {
    fn into_string(self) -> String {
        match self {
            Title::One(title) => title,
            Title::Many(titles) => titles.into_iter().next().unwrap_or_default(),
        }
    }
}

/// Fetches main page content through the Firecrawl scrape API
#[derive(Clone)]
pub struct FirecrawlFetcher {
    client: reqwest::Client,
    api_key: Option<String>,
    config: FetcherConfig,
}

impl FirecrawlFetcher {
    /// Create a fetcher. A missing API key is reported on every fetch, not here.
    pub fn new(api_key: Option<String>, config: FetcherConfig) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            config,
        })
    }

    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v2/scrape", self.config.base_url)
    }
}

#[async_trait]
impl ContentFetcher for FirecrawlFetcher {
    #[instrument(name = "fetch", skip(self, subject), fields(url = %subject))]
    async fn fetch(&self, subject: &Subject) -> Result<PageContent, FetchError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(FetchError::MissingCredentials("FIRECRAWL_API_KEY"))?;

        let request = ScrapeRequest::new(subject.key(), &self.config);
        debug!("Sending scrape request to {}", self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(
                status = status.as_u16(),
                body = truncate_chars(&body, 500),
                "Scrape request failed"
            );
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let scraped: ScrapeResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::UnexpectedResponse(e.to_string()))?;

        let no_content = || FetchError::NoContent {
            url: subject.key().to_string(),
        };

        if !scraped.success {
            warn!(error = ?scraped.error, "Scraper reported failure");
            return Err(no_content());
        }

        let data = scraped.data.ok_or_else(no_content)?;
        let markdown = data
            .markdown
            .filter(|markdown| !markdown.trim().is_empty())
            .ok_or_else(no_content)?;

        let metadata = data.metadata.unwrap_or_default();
        let source_url = metadata
            .source_url
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| subject.key().to_string());
        let title = metadata.title.map(Title::into_string).unwrap_or_default();

        let page = PageContent::new(source_url, title, &markdown, self.config.max_content_chars);
        info!(
            scraped_chars = markdown.chars().count(),
            kept_chars = page.markdown_body.chars().count(),
            "Fetched page content"
        );
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn fetcher(server: &Server, api_key: Option<&str>) -> FirecrawlFetcher {
        let config = FetcherConfig::builder().base_url(server.url()).build();
        FirecrawlFetcher::new(api_key.map(String::from), config).unwrap()
    }

    fn subject() -> Subject {
        Subject::parse("https://example.com").unwrap()
    }

    #[tokio::test]
    async fn test_fetch_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/scrape")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::Json(json!({
                "url": "https://example.com/",
                "formats": ["markdown"],
                "onlyMainContent": true,
                "timeout": 30000,
                "removeBase64Images": true,
                "blockAds": true
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "markdown": "# Example\n\nWe build things.",
                        "metadata": { "sourceURL": "https://example.com", "title": "Example" }
                    }
                })
                .to_string(),
            )
            .expect(1)
            .create_async()
            .await;

        let page = fetcher(&server, Some("test-key"))
            .fetch(&subject())
            .await
            .unwrap();

        assert_eq!(page.source_url, "https://example.com");
        assert_eq!(page.title, "Example");
        assert_eq!(page.markdown_body, "# Example\n\nWe build things.");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_truncates_body() {
        let mut server = Server::new_async().await;
        let markdown = format!("{}{}", "a".repeat(12_000), "b".repeat(8_000));
        let mock = server
            .mock("POST", "/v2/scrape")
            .with_status(200)
            .with_body(json!({ "success": true, "data": { "markdown": markdown } }).to_string())
            .create_async()
            .await;

        let page = fetcher(&server, Some("test-key"))
            .fetch(&subject())
            .await
            .unwrap();

        assert_eq!(page.markdown_body.len(), 12_000);
        assert!(page.markdown_body.chars().all(|c| c == 'a'));
        // Missing metadata falls back to the requested URL and an empty title
        assert_eq!(page.source_url, "https://example.com/");
        assert_eq!(page.title, "");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fetch_title_list() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/scrape")
            .with_status(200)
            .with_body(
                json!({
                    "success": true,
                    "data": {
                        "markdown": "content",
                        "metadata": { "title": ["Acme | Home", "Acme"] }
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let page = fetcher(&server, Some("test-key"))
            .fetch(&subject())
            .await
            .unwrap();
        assert_eq!(page.title, "Acme | Home");
    }

    #[tokio::test]
    async fn test_fetch_reported_failure() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/scrape")
            .with_status(200)
            .with_body(json!({ "success": false, "error": "blocked" }).to_string())
            .create_async()
            .await;

        let result = fetcher(&server, Some("test-key")).fetch(&subject()).await;
        assert!(matches!(result, Err(FetchError::NoContent { .. })));
    }

    #[tokio::test]
    async fn test_fetch_blank_markdown() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/scrape")
            .with_status(200)
            .with_body(json!({ "success": true, "data": { "markdown": "  \n " } }).to_string())
            .create_async()
            .await;

        let result = fetcher(&server, Some("test-key")).fetch(&subject()).await;
        assert!(matches!(result, Err(FetchError::NoContent { .. })));
    }

    #[tokio::test]
    async fn test_fetch_upstream_error() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/v2/scrape")
            .with_status(402)
            .with_body("Payment required")
            .create_async()
            .await;

        let result = fetcher(&server, Some("test-key")).fetch(&subject()).await;
        match result {
            Err(FetchError::Upstream { status, message }) => {
                assert_eq!(status, 402);
                assert_eq!(message, "Payment required");
            }
            other => panic!("Expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_without_credentials() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/scrape")
            .expect(0)
            .create_async()
            .await;

        let result = fetcher(&server, None).fetch(&subject()).await;
        assert!(matches!(
            result,
            Err(FetchError::MissingCredentials("FIRECRAWL_API_KEY"))
        ));

        let blank_key = fetcher(&server, Some("  ")).fetch(&subject()).await;
        assert!(matches!(blank_key, Err(FetchError::MissingCredentials(_))));
        mock.assert_async().await;
    }
}

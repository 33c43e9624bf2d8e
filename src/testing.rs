//! Test doubles for the pipeline stages

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use crate::enrichment::EnrichmentResult;
use crate::extractor::{CompanyProfile, ExtractError, SchemaViolation, Signal, StructuredExtractor};
use crate::fetcher::{ContentFetcher, FetchError, PageContent};
use crate::subject::Subject;

pub fn sample_profile() -> CompanyProfile {
    CompanyProfile {
        summary: "Example builds developer tooling for payments teams.".to_string(),
        bullets: vec![
            "Payments SDK".to_string(),
            "Fraud scoring API".to_string(),
            "Hosted checkout".to_string(),
            "Usage-based pricing".to_string(),
        ],
        keywords: ["fintech", "payments", "API", "developer tools", "SaaS", "B2B"]
            .into_iter()
            .map(String::from)
            .collect(),
        signals: vec![
            Signal::new("Careers page exists", true),
            Signal::new("Pricing page present", true),
            Signal::new("No recent blog posts", false),
        ],
    }
}

pub fn sample_result(url: &str) -> EnrichmentResult {
    let page = PageContent::new(url, "Example", "body", 100);
    let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
    EnrichmentResult::assemble(sample_profile(), &page, at)
}

/// Fetcher returning a fixed page or a fixed upstream failure
pub struct ScriptedFetcher {
    outcome: Result<PageContent, (u16, String)>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn ok(page: PageContent) -> Self {
        Self {
            outcome: Ok(page),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing(status: u16, message: &str) -> Self {
        Self {
            outcome: Err((status, message.to_string())),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentFetcher for ScriptedFetcher {
    async fn fetch(&self, _subject: &Subject) -> Result<PageContent, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome
            .clone()
            .map_err(|(status, message)| FetchError::Upstream { status, message })
    }
}

/// Extractor returning a fixed profile or schema violation, recording its input
pub struct ScriptedExtractor {
    outcome: Result<CompanyProfile, SchemaViolation>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    pages: Mutex<Vec<PageContent>>,
}

impl ScriptedExtractor {
    pub fn ok(profile: CompanyProfile) -> Self {
        Self {
            outcome: Ok(profile),
            delay: None,
            calls: AtomicUsize::new(0),
            pages: Mutex::new(Vec::new()),
        }
    }

    pub fn rejecting(violation: SchemaViolation) -> Self {
        Self {
            outcome: Err(violation),
            ..Self::ok(sample_profile())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Pages passed to `extract`, in call order
    pub fn pages(&self) -> Vec<PageContent> {
        self.pages.lock().unwrap().clone()
    }
}

#[async_trait]
impl StructuredExtractor for ScriptedExtractor {
    async fn extract(&self, page: &PageContent) -> Result<CompanyProfile, ExtractError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages.lock().unwrap().push(page.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.outcome.clone()?)
    }
}

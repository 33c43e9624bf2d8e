use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extractor::{CompanyProfile, Signal};
use crate::fetcher::PageContent;

/// A page the result was derived from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub url: String,
    pub title: String,
}

impl Source {
    /// Falls back to the URL when the page had no title
    pub fn from_page(page: &PageContent) -> Self {
        let title = if page.title.is_empty() {
            page.source_url.clone()
        } else {
            page.title.clone()
        };
        Self {
            url: page.source_url.clone(),
            title,
        }
    }
}

/// The cached artifact of a successful enrichment.
///
/// Entries are snapshots: once built, nothing mutates them, including
/// `enriched_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrichmentResult {
    pub summary: String,
    pub bullets: Vec<String>,
    pub keywords: Vec<String>,
    pub signals: Vec<Signal>,
    pub sources: Vec<Source>,
    pub enriched_at: DateTime<Utc>,
}

impl EnrichmentResult {
    pub fn assemble(profile: CompanyProfile, page: &PageContent, enriched_at: DateTime<Utc>) -> Self {
        let CompanyProfile {
            summary,
            bullets,
            keywords,
            signals,
        } = profile;

        Self {
            summary,
            bullets,
            keywords,
            signals,
            sources: vec![Source::from_page(page)],
            enriched_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::sample_profile;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_assemble_uses_page_as_source() {
        let page = PageContent::new("https://example.com", "Example", "body", 100);
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let result = EnrichmentResult::assemble(sample_profile(), &page, at);

        assert_eq!(
            result.sources,
            vec![Source {
                url: "https://example.com".to_string(),
                title: "Example".to_string()
            }]
        );
        assert_eq!(result.summary, sample_profile().summary);
        assert_eq!(result.enriched_at, at);
    }

    #[test]
    fn test_source_title_falls_back_to_url() {
        let page = PageContent::new("https://example.com/about", "  ", "body", 100);
        assert_eq!(Source::from_page(&page).title, "https://example.com/about");
    }

    #[test]
    fn test_wire_format() {
        let page = PageContent::new("https://example.com", "Example", "body", 100);
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let value = serde_json::to_value(EnrichmentResult::assemble(sample_profile(), &page, at)).unwrap();

        assert_eq!(value["enrichedAt"], json!("2025-03-01T12:00:00Z"));
        assert_eq!(value["sources"][0]["title"], json!("Example"));
        assert!(value["signals"][0].get("positive").is_some());

        let back: EnrichmentResult = serde_json::from_value(value).unwrap();
        assert_eq!(back.enriched_at, at);
    }
}

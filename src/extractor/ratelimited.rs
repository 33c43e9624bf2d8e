use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::{Instrument, debug_span};

use super::{CompanyProfile, ExtractError, StructuredExtractor};
use crate::fetcher::PageContent;

/// Wraps an extractor so calls wait for a rate limiter permit first.
///
/// A permit taken through `ready` is held for the next `extract`, which then
/// starts immediately.
#[derive(Clone)]
pub struct RateLimitedExtractor<X> {
    inner: X,
    limiter: Arc<DefaultDirectRateLimiter>,
    reserved: Arc<AtomicUsize>,
}

impl<X: StructuredExtractor> RateLimitedExtractor<X> {
    pub fn new(inner: X, limiter: DefaultDirectRateLimiter) -> Self {
        Self {
            inner,
            limiter: Arc::new(limiter),
            reserved: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Allow at most `per_minute` extractions per minute
    pub fn per_minute(inner: X, per_minute: NonZeroU32) -> Self {
        Self::new(inner, RateLimiter::direct(Quota::per_minute(per_minute)))
    }

    pub fn inner(&self) -> &X {
        &self.inner
    }

    async fn acquire(&self) {
        self.limiter
            .until_ready()
            .instrument(debug_span!("limiter"))
            .await;
    }

    fn take_reserved(&self) -> bool {
        self.reserved
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl<X: StructuredExtractor> StructuredExtractor for RateLimitedExtractor<X> {
    async fn ready(&self) {
        self.acquire().await;
        self.reserved.fetch_add(1, Ordering::SeqCst);
        self.inner.ready().await;
    }

    async fn extract(&self, page: &PageContent) -> Result<CompanyProfile, ExtractError> {
        if !self.take_reserved() {
            self.acquire().await;
        }
        self.inner.extract(page).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{ScriptedExtractor, sample_profile};
    use std::time::Duration;

    #[tokio::test]
    async fn test_delegates_to_inner() {
        let limited = RateLimitedExtractor::per_minute(
            ScriptedExtractor::ok(sample_profile()),
            NonZeroU32::new(60).unwrap(),
        );
        let page = PageContent::new("https://example.com", "", "body", 100);

        let profile = limited.extract(&page).await.unwrap();
        assert_eq!(profile, sample_profile());
        assert_eq!(limited.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_waits_once_quota_is_spent() {
        let limited = RateLimitedExtractor::per_minute(
            ScriptedExtractor::ok(sample_profile()),
            NonZeroU32::new(1).unwrap(),
        );
        let page = PageContent::new("https://example.com", "", "body", 100);

        limited.extract(&page).await.unwrap();
        let second = tokio::time::timeout(Duration::from_millis(100), limited.extract(&page)).await;
        assert!(second.is_err(), "second call should wait for a permit");
        assert_eq!(limited.inner().calls(), 1);
    }

    #[tokio::test]
    async fn test_ready_reserves_a_permit_for_extract() {
        let limited = RateLimitedExtractor::per_minute(
            ScriptedExtractor::ok(sample_profile()),
            NonZeroU32::new(1).unwrap(),
        );
        let page = PageContent::new("https://example.com", "", "body", 100);

        limited.ready().await;
        let first = tokio::time::timeout(Duration::from_millis(20), limited.extract(&page)).await;
        assert!(first.is_ok(), "reserved permit should let extract start at once");

        // The reservation was used up, so the next call queues again
        let second = tokio::time::timeout(Duration::from_millis(100), limited.extract(&page)).await;
        assert!(second.is_err());
        assert_eq!(limited.inner().calls(), 1);
    }
}

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, instrument, warn};

use super::{EnrichmentError, EnrichmentResult};
use crate::cache::EnrichmentStore;
use crate::extractor::StructuredExtractor;
use crate::fetcher::ContentFetcher;
use crate::subject::{EnrichmentRequest, Subject};

/// Default deadline for the extraction stage
pub const DEFAULT_EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Configuration for the request controller
#[derive(Debug, Clone)]
pub struct EnricherConfig {
    /// Deadline for a single extraction call
    pub extraction_timeout: Duration,
}

impl Default for EnricherConfig {
    fn default() -> Self {
        Self {
            extraction_timeout: DEFAULT_EXTRACTION_TIMEOUT,
        }
    }
}

impl EnricherConfig {
    pub fn builder() -> EnricherConfigBuilder {
        EnricherConfigBuilder::default()
    }
}

/// Builder for EnricherConfig
#[derive(Debug, Default)]
pub struct EnricherConfigBuilder {
    config: EnricherConfig,
}

impl EnricherConfigBuilder {
    pub fn extraction_timeout(mut self, timeout: Duration) -> Self {
        self.config.extraction_timeout = timeout;
        self
    }

    pub fn build(self) -> EnricherConfig {
        self.config
    }
}

/// Whether a cached entry may satisfy the request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Refresh {
    /// Return the cached entry when present
    #[default]
    IfMissing,
    /// Skip the cache read and overwrite the entry on success
    Force,
}

/// State of a subject as seen by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentStatus {
    Idle,
    Loading,
    Ready(EnrichmentResult),
    Failed(String),
}

type Outcome = Result<EnrichmentResult, EnrichmentError>;
type InFlight = Shared<BoxFuture<'static, Outcome>>;

/// A registered pipeline run
struct Run {
    refresh: Refresh,
    outcome: InFlight,
}

/// Request controller for the enrichment pipeline.
///
/// Cheap to clone; clones share the in-flight map and the store.
#[derive(Clone)]
pub struct Enricher {
    inner: Arc<Inner>,
}

struct Inner {
    fetcher: Arc<dyn ContentFetcher>,
    extractor: Arc<dyn StructuredExtractor>,
    store: Arc<dyn EnrichmentStore>,
    config: EnricherConfig,
    in_flight: Mutex<HashMap<String, Run>>,
    failures: Mutex<HashMap<String, String>>,
}

impl Enricher {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn StructuredExtractor>,
        store: Arc<dyn EnrichmentStore>,
    ) -> Self {
        Self::with_config(fetcher, extractor, store, EnricherConfig::default())
    }

    pub fn with_config(
        fetcher: Arc<dyn ContentFetcher>,
        extractor: Arc<dyn StructuredExtractor>,
        store: Arc<dyn EnrichmentStore>,
        config: EnricherConfig,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                fetcher,
                extractor,
                store,
                config,
                in_flight: Mutex::new(HashMap::new()),
                failures: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Enrich a subject, answering from the cache when possible
    pub async fn enrich(&self, request: &EnrichmentRequest) -> Outcome {
        self.enrich_with(request, Refresh::IfMissing).await
    }

    /// Enrich a subject.
    ///
    /// A second call for a subject that is already in flight attaches to the
    /// running pipeline instead of starting another one. A forced call never
    /// takes the outcome of a run that was allowed to answer from the cache;
    /// it waits for that run to finish and then starts its own. The pipeline
    /// runs on its own task and finishes even if every caller goes away.
    #[instrument(name = "enrich", skip(self, request), fields(url = %request.subject_url))]
    pub async fn enrich_with(&self, request: &EnrichmentRequest, refresh: Refresh) -> Outcome {
        let subject = Subject::try_from(request)?;

        if refresh == Refresh::IfMissing {
            if let Some(hit) = self.inner.cached(&subject).await {
                debug!("Cache hit");
                return Ok(hit);
            }
        }

        let pending = loop {
            let earlier = {
                let mut in_flight = self.inner.in_flight.lock().await;
                match in_flight.get(subject.key()) {
                    Some(run) if run.refresh == Refresh::Force || refresh == Refresh::IfMissing => {
                        debug!("Joining in-flight enrichment");
                        break run.outcome.clone();
                    }
                    Some(run) => run.outcome.clone(),
                    None => {
                        let outcome = self.start(subject.clone(), refresh);
                        let run = Run {
                            refresh,
                            outcome: outcome.clone(),
                        };
                        in_flight.insert(subject.key().to_string(), run);
                        break outcome;
                    }
                }
            };

            debug!("Waiting for cache-allowed run before forcing");
            let _ = earlier.await;
        };

        pending.await
    }

    /// Cached entry for a subject, without any network call
    pub async fn get_cached(&self, subject_url: &str) -> Result<Option<EnrichmentResult>, EnrichmentError> {
        let subject = Subject::parse(subject_url)?;
        Ok(self.inner.cached(&subject).await)
    }

    pub async fn status(&self, subject_url: &str) -> Result<EnrichmentStatus, EnrichmentError> {
        let subject = Subject::parse(subject_url)?;
        let key = subject.key();

        if self.inner.in_flight.lock().await.contains_key(key) {
            return Ok(EnrichmentStatus::Loading);
        }
        if let Some(message) = self.inner.failures.lock().await.get(key) {
            return Ok(EnrichmentStatus::Failed(message.clone()));
        }
        Ok(match self.inner.cached(&subject).await {
            Some(result) => EnrichmentStatus::Ready(result),
            None => EnrichmentStatus::Idle,
        })
    }

    /// Spawn the pipeline. Must be called with the in-flight lock held, so
    /// the task cannot deregister itself before it has been registered.
    fn start(&self, subject: Subject, refresh: Refresh) -> InFlight {
        let inner = Arc::clone(&self.inner);
        let span = info_span!("pipeline", url = %subject);

        let task = tokio::spawn(
            async move {
                let key = subject.key().to_string();
                inner.failures.lock().await.remove(&key);

                let outcome = inner.run(&subject, refresh).await;
                if let Err(e) = &outcome {
                    warn!(kind = e.kind().as_str(), error = %e, "Enrichment failed");
                    inner.failures.lock().await.insert(key.clone(), e.to_string());
                }

                inner.in_flight.lock().await.remove(&key);
                outcome
            }
            .instrument(span),
        );

        async move {
            task.await
                .unwrap_or_else(|e| Err(EnrichmentError::Internal(e.to_string())))
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    /// Store read; failures count as a miss
    async fn cached(&self, subject: &Subject) -> Option<EnrichmentResult> {
        match self.store.get(subject.key()).await {
            Ok(hit) => hit,
            Err(e) => {
                warn!(error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn run(&self, subject: &Subject, refresh: Refresh) -> Outcome {
        // A pipeline that finished between the caller's cache check and
        // registration has already written the entry
        if refresh == Refresh::IfMissing {
            if let Some(hit) = self.cached(subject).await {
                return Ok(hit);
            }
        }

        let page = self.fetcher.fetch(subject).await?;

        // Quota waits happen before the deadline starts
        self.extractor.ready().await;
        let timeout = self.config.extraction_timeout;
        let profile = tokio::time::timeout(timeout, self.extractor.extract(&page))
            .await
            .map_err(|_| EnrichmentError::Timeout(timeout))??;

        let result = EnrichmentResult::assemble(profile, &page, Utc::now());
        if let Err(e) = self.store.put(subject.key(), &result).await {
            warn!(error = %e, "Failed to write cache entry");
        }

        info!(enriched_at = %result.enriched_at, "Enrichment complete");
        Ok(result)
    }
}

//! Bounded crawl loop: schedules page visits, runs each through its
//! lifecycle and writes every page's records as one NDJSON batch.

use std::collections::{HashSet, VecDeque};
use std::fmt;
use std::io::Write;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::backoff::ExponentialBackoff;
use crate::driver::PageDriver;
use crate::emitter::NdjsonEmitter;
use crate::network::FetchError;
use crate::pipeline::{self, PageExtraction};
use crate::policy::{ConfigError, CrawlPolicy, VisitState, VisitTracker};
use crate::records::RecordSchema;
use crate::selectors::SelectorError;

#[derive(Error, Debug)]
pub enum CrawlError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Selector error: {0}")]
    Selector(#[from] SelectorError),

    #[error("Failed to set up HTTP client: {0}")]
    Client(FetchError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("Failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("All {failed} attempted visits failed")]
    AllVisitsFailed { failed: usize },
}

impl CrawlError {
    /// Process exit code: 3 for configuration or I/O trouble, 4 when nothing could be fetched.
    pub fn exit_code(&self) -> u8 {
        match self {
            CrawlError::AllVisitsFailed { .. } => 4,
            _ => 3,
        }
    }
}

/// Totals reported at the end of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    pub visits_attempted: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub records_emitted: usize,
    pub cards_skipped: usize,
    pub duration: Duration,
}

impl fmt::Display for CrawlSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} visits ({} ok, {} failed), {} records, {} cards skipped in {:.1}s",
            self.visits_attempted,
            self.succeeded,
            self.failed,
            self.records_emitted,
            self.cards_skipped,
            self.duration.as_secs_f64()
        )
    }
}

/// What one visit task hands back to the scheduling loop.
#[derive(Debug)]
pub struct VisitOutcome<R> {
    pub url: String,
    pub attempts: u32,
    pub state: VisitState,
    pub result: Result<PageExtraction<R>, FetchError>,
}

/// Everything a run needs, created once at start and shared with visit tasks.
pub struct RunContext<S: RecordSchema> {
    driver: Arc<dyn PageDriver>,
    schema: Arc<S>,
    policy: CrawlPolicy,
    backoff: ExponentialBackoff,
}

impl<S: RecordSchema> RunContext<S> {
    /// Validates the policy; a run never starts with unusable bounds.
    pub fn new(
        driver: Arc<dyn PageDriver>,
        schema: S,
        policy: CrawlPolicy,
    ) -> Result<Self, CrawlError> {
        Ok(Self {
            driver,
            schema: Arc::new(schema),
            policy: policy.validate()?,
            backoff: ExponentialBackoff::default(),
        })
    }

    pub fn with_backoff(mut self, backoff: ExponentialBackoff) -> Self {
        self.backoff = backoff;
        self
    }

    /// Crawl until the queue drains, the request cap is hit or shutdown is
    /// signalled. Records go to `emitter` one page batch at a time.
    pub async fn run<W: Write>(
        &self,
        emitter: &mut NdjsonEmitter<W>,
        shutdown: watch::Receiver<bool>,
    ) -> Result<CrawlSummary, CrawlError> {
        let start = Instant::now();
        let mut summary = CrawlSummary::default();

        let mut queue: VecDeque<String> = VecDeque::new();
        let mut seen: HashSet<String> = HashSet::new();
        for url in &self.policy.start_urls {
            if seen.insert(url.clone()) {
                queue.push_back(url.clone());
            }
        }

        let mut in_flight = JoinSet::new();
        let mut stop_logged = false;

        tracing::info!(
            schema = self.schema.name(),
            start_urls = queue.len(),
            max_requests = self.policy.max_requests,
            max_concurrency = self.policy.max_concurrency,
            max_retries = self.policy.max_retries,
            "Starting crawl"
        );

        loop {
            let stopping = *shutdown.borrow();
            if stopping && !stop_logged {
                tracing::warn!(
                    in_flight = in_flight.len(),
                    "Shutdown requested, waiting for in-flight visits"
                );
                stop_logged = true;
            }

            // Fill the pool up to the concurrency bound
            while !stopping
                && in_flight.len() < self.policy.max_concurrency
                && summary.visits_attempted < self.policy.max_requests
            {
                let Some(url) = queue.pop_front() else {
                    break;
                };
                summary.visits_attempted += 1;
                in_flight.spawn(visit(
                    Arc::clone(&self.driver),
                    Arc::clone(&self.schema),
                    url,
                    self.policy.max_retries,
                    self.policy.settle_delay,
                    self.backoff.clone(),
                ));
            }

            let Some(joined) = in_flight.join_next().await else {
                break;
            };

            let outcome = match joined {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!("Visit task join error: {}", e);
                    summary.failed += 1;
                    continue;
                }
            };

            match outcome.result {
                Ok(extraction) => {
                    summary.succeeded += 1;
                    summary.cards_skipped += extraction.cards_skipped;
                    let written = emitter.emit_batch(&extraction.records)?;
                    summary.records_emitted += written;
                    tracing::info!(
                        url = %outcome.url,
                        attempts = outcome.attempts,
                        records = written,
                        cards = extraction.cards_seen,
                        "Page extracted"
                    );

                    if self.policy.follow_pagination {
                        if let Some(next) = extraction.next_page {
                            if seen.insert(next.clone()) {
                                tracing::debug!(url = %next, "Queued next page");
                                queue.push_back(next);
                            }
                        }
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::warn!(
                        url = %outcome.url,
                        attempts = outcome.attempts,
                        state = %outcome.state,
                        "Visit failed: {}",
                        e
                    );
                }
            }
        }

        if !queue.is_empty() {
            tracing::info!(remaining = queue.len(), "Stopped with pages still queued");
        }

        summary.duration = start.elapsed();
        tracing::info!("Crawl finished: {}", summary);

        if summary.succeeded == 0 && summary.failed > 0 {
            return Err(CrawlError::AllVisitsFailed {
                failed: summary.failed,
            });
        }
        Ok(summary)
    }

    /// Release the page driver.
    pub async fn close(&self) {
        self.driver.close().await;
    }
}

/// One page visit from navigation to extracted records.
async fn visit<S: RecordSchema>(
    driver: Arc<dyn PageDriver>,
    schema: Arc<S>,
    url: String,
    max_retries: u32,
    settle_delay: Duration,
    backoff: ExponentialBackoff,
) -> VisitOutcome<S::Record> {
    let mut tracker = VisitTracker::new(url.clone());
    let mut attempt = 0u32;

    let page = loop {
        tracker.advance(VisitState::Navigating { attempt });
        match driver.navigate(&url).await {
            Ok(page) => break page,
            Err(e) if attempt < max_retries && e.is_retryable() => {
                let delay = backoff.delay(attempt);
                tracing::debug!(
                    url = %url,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "Navigation failed, retrying: {}",
                    e
                );
                sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                tracker.advance(VisitState::Failed);
                return VisitOutcome {
                    url,
                    attempts: attempt + 1,
                    state: tracker.state(),
                    result: Err(e),
                };
            }
        }
    };

    tracker.advance(VisitState::Settling);
    if !settle_delay.is_zero() {
        sleep(settle_delay).await;
    }

    tracker.advance(VisitState::Extracting);
    let html = match driver.snapshot(&page).await {
        Ok(html) => html,
        Err(e) => {
            tracker.advance(VisitState::Failed);
            return VisitOutcome {
                url,
                attempts: attempt + 1,
                state: tracker.state(),
                result: Err(e),
            };
        }
    };

    // No awaits past this point: the parsed document stays on this task.
    let extraction = pipeline::extract_page(schema.as_ref(), &html, &page.url);
    tracker.advance(VisitState::Done);

    VisitOutcome {
        url,
        attempts: attempt + 1,
        state: tracker.state(),
        result: Ok(extraction),
    }
}

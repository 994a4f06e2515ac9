//! Crawl politeness bounds and the per-visit lifecycle.

use std::fmt;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::config::Config;
use crate::url_utils;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("No start URL configured")]
    NoStartUrl,

    #[error("Invalid start URL '{url}': {reason}")]
    InvalidStartUrl { url: String, reason: String },

    #[error("max concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Bounds on how hard a run may hit the target site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlPolicy {
    pub start_urls: Vec<String>,
    /// Total page visits for the whole run; retries do not count.
    pub max_requests: usize,
    pub max_concurrency: usize,
    /// Extra attempts after a failed navigation.
    pub max_retries: u32,
    /// Wait between navigation and extraction for client-rendered content.
    pub settle_delay: Duration,
    pub follow_pagination: bool,
}

impl Default for CrawlPolicy {
    fn default() -> Self {
        Self {
            start_urls: vec![Config::DEFAULT_BOOKS_URL.to_string()],
            max_requests: Config::MAX_REQUESTS,
            max_concurrency: Config::MAX_CONCURRENCY,
            max_retries: Config::MAX_RETRIES,
            settle_delay: Duration::from_millis(Config::SETTLE_DELAY_MS),
            follow_pagination: false,
        }
    }
}

impl CrawlPolicy {
    /// Normalize start URLs and reject policies the crawler cannot run.
    pub fn validate(mut self) -> Result<Self, ConfigError> {
        if self.max_concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }

        let mut start_urls = Vec::with_capacity(self.start_urls.len());
        for raw in &self.start_urls {
            if raw.trim().is_empty() {
                continue;
            }
            let normalized = url_utils::normalize_url_for_cli(raw);
            let parsed = Url::parse(&normalized).map_err(|e| ConfigError::InvalidStartUrl {
                url: raw.clone(),
                reason: e.to_string(),
            })?;
            if !url_utils::should_crawl_url(parsed.as_str()) {
                return Err(ConfigError::InvalidStartUrl {
                    url: raw.clone(),
                    reason: "only http(s) pages can be crawled".to_string(),
                });
            }
            start_urls.push(parsed.to_string());
        }

        if start_urls.is_empty() {
            return Err(ConfigError::NoStartUrl);
        }

        self.start_urls = start_urls;
        Ok(self)
    }
}

/// Lifecycle of one page visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitState {
    Queued,
    Navigating { attempt: u32 },
    Settling,
    Extracting,
    Done,
    Failed,
}

impl VisitState {
    /// Whether the lifecycle permits moving from `self` to `next`.
    pub fn can_transition_to(self, next: VisitState) -> bool {
        use VisitState::*;
        match (self, next) {
            (Queued, Navigating { attempt: 0 }) => true,
            (Navigating { attempt: a }, Navigating { attempt: b }) => b == a + 1,
            (Navigating { .. }, Settling) => true,
            (Navigating { .. }, Failed) => true,
            (Settling, Extracting) => true,
            (Extracting, Done) => true,
            (Extracting, Failed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for VisitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VisitState::Queued => write!(f, "queued"),
            VisitState::Navigating { attempt } => write!(f, "navigating (attempt {})", attempt + 1),
            VisitState::Settling => write!(f, "settling"),
            VisitState::Extracting => write!(f, "extracting"),
            VisitState::Done => write!(f, "done"),
            VisitState::Failed => write!(f, "failed"),
        }
    }
}

/// Tracks one visit's state and refuses illegal transitions.
#[derive(Debug)]
pub struct VisitTracker {
    url: String,
    state: VisitState,
}

impl VisitTracker {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            state: VisitState::Queued,
        }
    }

    pub fn state(&self) -> VisitState {
        self.state
    }

    pub fn advance(&mut self, next: VisitState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal visit transition {} -> {}",
            self.state,
            next
        );
        tracing::trace!(url = %self.url, from = %self.state, to = %next, "Visit transition");
        self.state = next;
    }
}

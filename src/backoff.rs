use rand::Rng;
use std::time::Duration;

use crate::config::Config;

/// Delay schedule between navigation retries.
#[derive(Debug, Clone)]
pub struct ExponentialBackoff {
    base_ms: u64,
    max_ms: u64,
    jitter_percent: u64,
}

impl ExponentialBackoff {
    pub const fn new(base_ms: u64, max_ms: u64) -> Self {
        Self {
            base_ms,
            max_ms,
            jitter_percent: 10,
        }
    }

    /// No waiting at all; used when a scripted driver stands in for the network.
    pub const fn immediate() -> Self {
        Self {
            base_ms: 0,
            max_ms: 0,
            jitter_percent: 0,
        }
    }

    pub fn with_jitter(mut self, jitter_percent: u64) -> Self {
        self.jitter_percent = jitter_percent;
        self
    }

    /// Delay before retry number `retry` (0 = first retry).
    pub fn delay(&self, retry: u32) -> Duration {
        let exponential_delay = self
            .base_ms
            .saturating_mul(2u64.saturating_pow(retry.min(20)));
        let capped_delay = exponential_delay.min(self.max_ms);
        let jitter = if self.jitter_percent > 0 && capped_delay > 0 {
            rand::thread_rng().gen_range(0..capped_delay * self.jitter_percent / 100 + 1)
        } else {
            0
        };
        Duration::from_millis(capped_delay + jitter)
    }
}

impl Default for ExponentialBackoff {
    fn default() -> Self {
        Self::new(Config::RETRY_BACKOFF_MS, Config::RETRY_BACKOFF_MAX_MS)
    }
}

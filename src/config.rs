// Global configuration constants - single source of truth

pub struct Config;

impl Config {
    // Default target: a practice site built for scraping
    pub const DEFAULT_BOOKS_URL: &'static str = "https://books.toscrape.com/";
    pub const DEFAULT_USER_AGENT: &'static str = "ListingCrawler/0.1";

    // Politeness defaults: one page, one visit at a time, no retries
    pub const MAX_REQUESTS: usize = 1;
    pub const MAX_CONCURRENCY: usize = 1;
    pub const MAX_RETRIES: u32 = 0;
    pub const SETTLE_DELAY_MS: u64 = 2000;

    // Retry backoff between navigation attempts
    pub const RETRY_BACKOFF_MS: u64 = 500;
    pub const RETRY_BACKOFF_MAX_MS: u64 = 10_000;

    // HTTP/Network config
    pub const TIMEOUT_SECS: u64 = 20;
    pub const CONNECT_TIMEOUT_SECS: u64 = 10;
    pub const MAX_CONTENT_SIZE: usize = 10 * 1024 * 1024; // 10MB
    pub const POOL_IDLE_PER_HOST: usize = 4;
    pub const POOL_IDLE_TIMEOUT_SECS: u64 = 30;
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::address::AddressDefaults;
use crate::config::Config;
use crate::policy::CrawlPolicy;

/// Crawl listing pages and print one JSON record per listing on stdout.
/// Exit codes: 0=success, 2=invalid arguments, 3=I/O or config error, 4=every visit failed
#[derive(Parser, Debug)]
#[command(name = "listing_crawler")]
#[command(about = "Selector-driven listing crawler with NDJSON output")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl a book catalogue (books.toscrape.com layout by default).
    Books {
        #[command(flatten)]
        crawl: CrawlArgs,
    },

    /// Crawl a real-estate search results page.
    Properties {
        #[command(flatten)]
        crawl: CrawlArgs,

        #[arg(long, default_value = "", help = "City used when an address has none")]
        default_city: String,

        #[arg(long, default_value = "", help = "State used when an address has none")]
        default_state: String,

        #[arg(long, default_value = "", help = "ZIP used when an address has none")]
        default_zip: String,
    },
}

/// Flags shared by every site.
#[derive(Args, Debug, Clone)]
pub struct CrawlArgs {
    #[arg(
        short,
        long = "start-url",
        env = "START_URL",
        value_delimiter = ',',
        help = "Page(s) to start from; repeat or comma-separate for several"
    )]
    pub start_url: Vec<String>,

    #[arg(
        long,
        env = "CRAWL_MAX_REQUESTS",
        default_value_t = Config::MAX_REQUESTS,
        help = "Total page visits for the run"
    )]
    pub max_requests: usize,

    #[arg(
        long,
        env = "CRAWL_MAX_CONCURRENCY",
        default_value_t = Config::MAX_CONCURRENCY,
        help = "Page visits in flight at once"
    )]
    pub max_concurrency: usize,

    #[arg(
        long,
        env = "CRAWL_MAX_RETRIES",
        default_value_t = Config::MAX_RETRIES,
        help = "Extra navigation attempts per failed page"
    )]
    pub max_retries: u32,

    #[arg(
        long,
        env = "CRAWL_SETTLE_MS",
        default_value_t = Config::SETTLE_DELAY_MS,
        help = "Milliseconds to wait after navigation before extracting"
    )]
    pub settle_ms: u64,

    #[arg(
        long,
        env = "CRAWL_HEADLESS",
        default_value_t = true,
        action = clap::ArgAction::Set,
        help = "Run the page engine without a visible window"
    )]
    pub headless: bool,

    #[arg(short, long, default_value_t = Config::TIMEOUT_SECS, help = "Request timeout in seconds")]
    pub timeout: u64,

    #[arg(
        short,
        long,
        default_value = Config::DEFAULT_USER_AGENT,
        help = "User agent string for requests"
    )]
    pub user_agent: String,

    #[arg(long, help = "JSON file overriding the built-in selectors")]
    pub selectors: Option<PathBuf>,

    #[arg(long, help = "Follow the next-page link of each visited page")]
    pub follow_pagination: bool,

    #[arg(long, help = "Also write daily-rotated log files to this directory")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, help = "Log JSON lines to stderr instead of text")]
    pub log_json: bool,
}

impl CrawlArgs {
    /// Policy for this run; `fallback_url` applies when no start URL was given.
    pub fn policy(&self, fallback_url: Option<&str>) -> CrawlPolicy {
        let start_urls = if self.start_url.is_empty() {
            fallback_url.map(str::to_string).into_iter().collect()
        } else {
            self.start_url.clone()
        };

        CrawlPolicy {
            start_urls,
            max_requests: self.max_requests,
            max_concurrency: self.max_concurrency,
            max_retries: self.max_retries,
            settle_delay: Duration::from_millis(self.settle_ms),
            follow_pagination: self.follow_pagination,
        }
    }
}

impl Commands {
    pub fn crawl_args(&self) -> &CrawlArgs {
        match self {
            Commands::Books { crawl } => crawl,
            Commands::Properties { crawl, .. } => crawl,
        }
    }

    /// Address defaults for the properties site; empty for books.
    pub fn address_defaults(&self) -> AddressDefaults {
        match self {
            Commands::Books { .. } => AddressDefaults::default(),
            Commands::Properties {
                default_city,
                default_state,
                default_zip,
                ..
            } => AddressDefaults::new(
                default_city.as_str(),
                default_state.as_str(),
                default_zip.as_str(),
            ),
        }
    }
}

impl Cli {
    /// On error, clap prints help and exits with code 2 (usage error).
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // START_URL and the CRAWL_* variables are not set in the test environment.

    #[test]
    fn test_books_command_defaults() {
        let cli = Cli::try_parse_from(["listing_crawler", "books"]).unwrap();
        let crawl = cli.command.crawl_args();
        assert!(crawl.start_url.is_empty());
        assert_eq!(crawl.max_requests, 1);
        assert_eq!(crawl.max_concurrency, 1);
        assert_eq!(crawl.max_retries, 0);
        assert_eq!(crawl.settle_ms, 2000);
        assert!(crawl.headless);
        assert!(!crawl.follow_pagination);

        let policy = crawl.policy(Some(Config::DEFAULT_BOOKS_URL));
        assert_eq!(policy.start_urls, vec![Config::DEFAULT_BOOKS_URL.to_string()]);
        assert_eq!(policy.settle_delay, Duration::from_millis(2000));
    }

    #[test]
    fn test_books_command_all_options() {
        let cli = Cli::try_parse_from([
            "listing_crawler",
            "books",
            "--start-url",
            "https://a.test/",
            "--start-url",
            "https://b.test/",
            "--max-requests",
            "10",
            "--max-concurrency",
            "3",
            "--max-retries",
            "2",
            "--settle-ms",
            "0",
            "--headless",
            "false",
            "--timeout",
            "5",
            "--user-agent",
            "TestBot/1.0",
            "--follow-pagination",
            "--log-json",
        ])
        .unwrap();

        let crawl = cli.command.crawl_args();
        assert_eq!(crawl.start_url, vec!["https://a.test/", "https://b.test/"]);
        assert_eq!(crawl.max_requests, 10);
        assert_eq!(crawl.max_concurrency, 3);
        assert_eq!(crawl.max_retries, 2);
        assert!(!crawl.headless);
        assert_eq!(crawl.timeout, 5);
        assert_eq!(crawl.user_agent, "TestBot/1.0");
        assert!(crawl.follow_pagination);
        assert!(crawl.log_json);

        let policy = crawl.policy(Some(Config::DEFAULT_BOOKS_URL));
        assert_eq!(policy.start_urls.len(), 2);
        assert_eq!(policy.settle_delay, Duration::ZERO);
    }

    #[test]
    fn test_properties_command_defaults_address() {
        let cli = Cli::try_parse_from([
            "listing_crawler",
            "properties",
            "--start-url",
            "https://homes.test/search",
            "--default-city",
            "Austin",
            "--default-state",
            "TX",
        ])
        .unwrap();

        let defaults = cli.command.address_defaults();
        assert_eq!(defaults.city, "Austin");
        assert_eq!(defaults.state, "TX");
        assert_eq!(defaults.zip, "");
    }

    #[test]
    fn test_properties_without_start_url_has_no_fallback() {
        let cli = Cli::try_parse_from(["listing_crawler", "properties"]).unwrap();
        let policy = cli.command.crawl_args().policy(None);
        assert!(policy.start_urls.is_empty());
    }

    #[test]
    fn test_invalid_arguments() {
        assert!(Cli::try_parse_from(["listing_crawler"]).is_err());
        assert!(
            Cli::try_parse_from(["listing_crawler", "books", "--max-requests", "many"]).is_err()
        );
        assert!(Cli::try_parse_from(["listing_crawler", "sitemap"]).is_err());
    }
}

use std::io::BufWriter;
use std::process::ExitCode;
use std::sync::Arc;

use listing_crawler::cli::{Cli, Commands, CrawlArgs};
use listing_crawler::config::Config;
use listing_crawler::logging::{self, LogOptions};
use listing_crawler::selectors::load_selector_file;
use listing_crawler::shutdown::setup_shutdown_handler;
use listing_crawler::{
    BookSchema, BookSelectors, CrawlError, CrawlPolicy, CrawlSummary, HttpClient, HttpDriver,
    NdjsonEmitter, PropertySchema, PropertySelectors, RecordSchema, RunContext,
};

async fn run_command(command: &Commands) -> Result<CrawlSummary, CrawlError> {
    match command {
        Commands::Books { crawl } => {
            let selectors: BookSelectors = match &crawl.selectors {
                Some(path) => load_selector_file(path)?,
                None => BookSelectors::default(),
            };
            let schema = BookSchema::new(&selectors)?;
            crawl_site(schema, crawl, crawl.policy(Some(Config::DEFAULT_BOOKS_URL))).await
        }
        Commands::Properties { crawl, .. } => {
            let selectors: PropertySelectors = match &crawl.selectors {
                Some(path) => load_selector_file(path)?,
                None => PropertySelectors::default(),
            };
            let schema = PropertySchema::new(&selectors, command.address_defaults())?;
            crawl_site(schema, crawl, crawl.policy(None)).await
        }
    }
}

/// Wire the HTTP driver to the schema and crawl, writing NDJSON to stdout.
async fn crawl_site<S: RecordSchema>(
    schema: S,
    args: &CrawlArgs,
    policy: CrawlPolicy,
) -> Result<CrawlSummary, CrawlError> {
    let client =
        HttpClient::new(args.user_agent.clone(), args.timeout).map_err(CrawlError::Client)?;
    let driver = Arc::new(HttpDriver::new(client, args.headless));
    let ctx = RunContext::new(driver, schema, policy)?;

    let shutdown = setup_shutdown_handler();
    let mut emitter = NdjsonEmitter::new(BufWriter::new(std::io::stdout()));

    let result = ctx.run(&mut emitter, shutdown).await;
    ctx.close().await;
    result
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let args = cli.command.crawl_args();
    let log_options = LogOptions {
        log_dir: args.log_dir.clone(),
        json: args.log_json,
    };
    let _log_guard = match logging::init_logging(&log_options) {
        Ok(guard) => guard,
        Err(e) => {
            let err = CrawlError::Logging(e.to_string());
            eprintln!("{}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    match run_command(&cli.command).await {
        Ok(summary) => {
            tracing::info!(
                records = summary.records_emitted,
                failed = summary.failed,
                "Done"
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

/// Logging setup: a terminal layer on stderr plus optional daily-rotated files.
///
/// stdout carries NDJSON records, so nothing here ever writes to it.
///
/// # Environment Variables
/// * `RUST_LOG` - Controls log level filtering (default: "info")
///   Examples:
///   - `RUST_LOG=debug` - Show all debug and above
///   - `RUST_LOG=listing_crawler=trace,reqwest=warn` - Trace for this crate, warn for reqwest
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Where log output goes for one run.
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Directory for `crawler.log` and `crawler.json.log`; no files when unset.
    pub log_dir: Option<PathBuf>,
    /// JSON lines on stderr instead of compact text.
    pub json: bool,
}

/// Flushes file logs when dropped; keep it alive for the whole run.
#[must_use = "dropping the guard stops file logging"]
pub struct LoggingGuard {
    _guards: Vec<WorkerGuard>,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize the global tracing subscriber.
///
/// Fails if the log directory cannot be created or a subscriber is already set.
pub fn init_logging(options: &LogOptions) -> Result<LoggingGuard, Box<dyn std::error::Error>> {
    let mut guards = Vec::new();

    let stderr_layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_current_span(true)
            .with_filter(env_filter())
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .with_filter(env_filter())
            .boxed()
    };

    let mut file_layers = Vec::new();
    if let Some(log_dir) = &options.log_dir {
        std::fs::create_dir_all(log_dir)?;

        let text_appender = tracing_appender::rolling::daily(log_dir, "crawler.log");
        let (text_writer, text_guard) = tracing_appender::non_blocking(text_appender);
        guards.push(text_guard);

        let json_appender = tracing_appender::rolling::daily(log_dir, "crawler.json.log");
        let (json_writer, json_guard) = tracing_appender::non_blocking(json_appender);
        guards.push(json_guard);

        file_layers.push(
            fmt::layer()
                .with_writer(text_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_ansi(false)
                .compact()
                .with_filter(env_filter())
                .boxed(),
        );
        file_layers.push(
            fmt::layer()
                .json()
                .with_writer(json_writer)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true)
                .with_current_span(true)
                .with_span_list(true)
                .with_filter(env_filter())
                .boxed(),
        );
    }

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layers)
        .try_init()?;

    if let Some(log_dir) = &options.log_dir {
        tracing::debug!("File logs written to {}", log_dir.display());
    }

    Ok(LoggingGuard { _guards: guards })
}

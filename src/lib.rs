pub mod address;
pub mod backoff;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod driver;
pub mod emitter;
pub mod extractor;
pub mod logging;
pub mod network;
pub mod normalize;
pub mod pipeline;
pub mod policy;
pub mod records;
pub mod selectors;
pub mod shutdown;
pub mod url_utils;

// Re-export main types for library usage
pub use address::{AddressDefaults, AddressParts, split_address};
pub use crawler::{CrawlError, CrawlSummary, RunContext};
pub use driver::{HttpDriver, LoadedPage, PageDriver};
pub use emitter::NdjsonEmitter;
pub use network::{FetchError, FetchResult, HttpClient};
pub use normalize::{normalize_text, parse_number};
pub use pipeline::{PageExtraction, extract_page};
pub use policy::{ConfigError, CrawlPolicy, VisitState};
pub use records::{BookListing, BookSchema, PropertyListing, PropertySchema, RecordSchema};
pub use selectors::{BookSelectors, PropertySelectors, SelectorError, SelectorMap};

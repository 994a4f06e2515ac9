//! Synchronous extraction over one DOM snapshot.
//!
//! `scraper::Html` is not `Send`, so the whole parse lives inside
//! [`extract_page`] and never crosses an `.await` in the visit task.

use scraper::Html;

use crate::extractor;
use crate::records::RecordSchema;
use crate::url_utils;

/// Everything one page snapshot yields.
#[derive(Debug)]
pub struct PageExtraction<R> {
    /// Records in card document order.
    pub records: Vec<R>,
    /// Cards that matched the card locator.
    pub cards_seen: usize,
    /// Cards dropped for lack of a usable link.
    pub cards_skipped: usize,
    pub next_page: Option<String>,
}

pub fn extract_page<S: RecordSchema>(
    schema: &S,
    html: &str,
    page_url: &str,
) -> PageExtraction<S::Record> {
    let document = Html::parse_document(html);
    let base_uri = url_utils::document_base_uri(&document, page_url);
    let map = schema.selector_map();

    let raw_cards = extractor::extract_cards(&document, map, &base_uri);
    let cards_seen = raw_cards.len();

    let mut records = Vec::with_capacity(cards_seen);
    let mut cards_skipped = 0;
    for (index, raw) in raw_cards.into_iter().enumerate() {
        match schema.assemble(raw) {
            Some(record) => records.push(record),
            None => {
                cards_skipped += 1;
                tracing::debug!(
                    page = page_url,
                    card = index,
                    "Skipping card without a usable link"
                );
            }
        }
    }

    let next_page = extractor::extract_next_page(&document, map, &base_uri)
        .filter(|url| url_utils::should_crawl_url(url));

    PageExtraction {
        records,
        cards_seen,
        cards_skipped,
        next_page,
    }
}

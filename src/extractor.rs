//! Field extraction from card elements.
//!
//! Works on a parsed DOM snapshot. Every lookup is scoped to one card and
//! resolves to `None` when nothing matches; nothing here can fail a page.

use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::normalize::normalize_text;
use crate::selectors::{FieldSelector, FieldSource, SelectorMap};
use crate::url_utils;

lazy_static! {
    static ref RATING_RE: Regex =
        Regex::new(r"(?i)\b(one|two|three|four|five)\b").expect("valid rating pattern");
}

const RATING_TOKENS: [&str; 5] = ["One", "Two", "Three", "Four", "Five"];

/// Raw values for one card, in selector-map field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawCard {
    fields: Vec<(&'static str, Option<String>)>,
}

impl RawCard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: &'static str, value: Option<String>) {
        self.fields.push((name, value));
    }

    /// Value of a field; `None` when the field was absent or not configured.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.as_deref())
    }

    pub fn take(&mut self, name: &str) -> Option<String> {
        self.fields
            .iter_mut()
            .find(|(field, _)| *field == name)
            .and_then(|(_, value)| value.take())
    }

    pub fn fields(&self) -> &[(&'static str, Option<String>)] {
        &self.fields
    }
}

/// Canonical rating token from a class attribute such as `"star-rating Three"`.
pub fn rating_from_class(class_attr: &str) -> Option<String> {
    let word = RATING_RE.captures(class_attr)?.get(1)?.as_str();
    RATING_TOKENS
        .iter()
        .find(|token| token.eq_ignore_ascii_case(word))
        .map(|token| token.to_string())
}

fn element_text(element: &ElementRef<'_>) -> Option<String> {
    let text: String = element.text().collect();
    normalize_text(Some(&text))
}

fn read_field(element: &ElementRef<'_>, source: FieldSource, base_uri: &str) -> Option<String> {
    match source {
        FieldSource::Text => element_text(element),
        FieldSource::AttrOrText(attr) => element
            .value()
            .attr(attr)
            .and_then(|value| normalize_text(Some(value)))
            .or_else(|| element_text(element)),
        FieldSource::RatingClass => element.value().attr("class").and_then(rating_from_class),
        FieldSource::Href => element
            .value()
            .attr("href")
            .and_then(|href| url_utils::resolve_link(href, base_uri)),
    }
}

fn extract_field(card: &ElementRef<'_>, field: &FieldSelector, base_uri: &str) -> Option<String> {
    let element = card.select(&field.selector).next()?;
    let value = read_field(&element, field.source, base_uri);
    if value.is_none() {
        tracing::trace!(
            field = field.name,
            css = %field.css,
            "Field matched but produced no value"
        );
    }
    value
}

/// Extract every configured field from one card element.
pub fn extract_card(card: ElementRef<'_>, map: &SelectorMap, base_uri: &str) -> RawCard {
    let mut raw = RawCard::new();
    for field in &map.fields {
        raw.push(field.name, extract_field(&card, field, base_uri));
    }
    raw
}

/// Extract all cards of a document, in document order.
pub fn extract_cards(document: &Html, map: &SelectorMap, base_uri: &str) -> Vec<RawCard> {
    document
        .select(&map.card)
        .map(|card| extract_card(card, map, base_uri))
        .collect()
}

/// Resolved URL of the next listing page, if the map has a locator for it.
pub fn extract_next_page(document: &Html, map: &SelectorMap, base_uri: &str) -> Option<String> {
    let selector = map.next_page.as_ref()?;
    document
        .select(selector)
        .next()
        .and_then(|el| el.value().attr("href"))
        .and_then(|href| url_utils::resolve_link(href, base_uri))
}

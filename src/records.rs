//! Typed records and the per-site assemblers that build them from raw cards.

use serde::Serialize;

use crate::address::{AddressDefaults, split_address};
use crate::extractor::RawCard;
use crate::normalize::parse_number;
use crate::selectors::{BookSelectors, PropertySelectors, SelectorError, SelectorMap};

/// A site-specific record shape plus the selector map that feeds it.
pub trait RecordSchema: Send + Sync + 'static {
    type Record: Serialize + Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    fn selector_map(&self) -> &SelectorMap;

    /// Build one record, or `None` when the card has no usable link.
    fn assemble(&self, raw: RawCard) -> Option<Self::Record>;
}

/// One book from a catalogue listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookListing {
    pub title: String,
    pub price: Option<u64>,
    pub availability: Option<String>,
    pub rating: Option<String>,
    pub url: String,
}

/// One property from a real-estate results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyListing {
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub price: Option<u64>,
    pub beds: Option<u64>,
    pub baths: Option<u64>,
    pub sqft: Option<u64>,
    pub url: String,
}

/// Pulls the link out of a raw card; an absent or empty link skips the card.
fn take_url(raw: &mut RawCard) -> Option<String> {
    raw.take("link").filter(|url| !url.is_empty())
}

pub struct BookSchema {
    selectors: SelectorMap,
}

impl BookSchema {
    pub fn new(selectors: &BookSelectors) -> Result<Self, SelectorError> {
        Ok(Self {
            selectors: selectors.compile()?,
        })
    }
}

impl RecordSchema for BookSchema {
    type Record = BookListing;

    fn name(&self) -> &'static str {
        "books"
    }

    fn selector_map(&self) -> &SelectorMap {
        &self.selectors
    }

    fn assemble(&self, mut raw: RawCard) -> Option<BookListing> {
        let url = take_url(&mut raw)?;
        Some(BookListing {
            title: raw.take("title").unwrap_or_default(),
            price: parse_number(raw.get("price")),
            availability: raw.take("availability"),
            rating: raw.take("rating"),
            url,
        })
    }
}

pub struct PropertySchema {
    selectors: SelectorMap,
    defaults: AddressDefaults,
}

impl PropertySchema {
    pub fn new(
        selectors: &PropertySelectors,
        defaults: AddressDefaults,
    ) -> Result<Self, SelectorError> {
        Ok(Self {
            selectors: selectors.compile()?,
            defaults,
        })
    }
}

impl RecordSchema for PropertySchema {
    type Record = PropertyListing;

    fn name(&self) -> &'static str {
        "properties"
    }

    fn selector_map(&self) -> &SelectorMap {
        &self.selectors
    }

    fn assemble(&self, mut raw: RawCard) -> Option<PropertyListing> {
        let url = take_url(&mut raw)?;
        let address = split_address(raw.get("address").unwrap_or(""), &self.defaults);
        Some(PropertyListing {
            address: address.street,
            city: address.city,
            state: address.state,
            zip: address.zip,
            price: parse_number(raw.get("price")),
            beds: parse_number(raw.get("beds")),
            baths: parse_number(raw.get("baths")),
            sqft: parse_number(raw.get("sqft")),
            url,
        })
    }
}

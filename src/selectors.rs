//! Per-site selector records and their compiled form.
//!
//! Each target site has a closed selector record (`BookSelectors`,
//! `PropertySelectors`). `card` and `link` are mandatory, every other field is
//! optional and is simply not extracted when unset. Records compile into a
//! [`SelectorMap`] once per run; bad CSS and unknown keys in a selector file
//! are rejected here, before any page is visited.

use scraper::Selector;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SelectorError {
    #[error("Invalid CSS selector for field '{field}': {css} ({reason})")]
    InvalidCss {
        field: &'static str,
        css: String,
        reason: String,
    },

    #[error("Failed to read selector file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid selector file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// How a field's raw value is read from the element its selector matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSource {
    /// Normalized text content.
    Text,
    /// A named attribute, falling back to text content when absent.
    AttrOrText(&'static str),
    /// Star-rating word found in the `class` attribute.
    RatingClass,
    /// `href` resolved against the document base URI.
    Href,
}

#[derive(Debug, Clone)]
pub struct FieldSelector {
    pub name: &'static str,
    pub css: String,
    pub selector: Selector,
    pub source: FieldSource,
}

/// Compiled locators for one site.
#[derive(Debug, Clone)]
pub struct SelectorMap {
    pub card: Selector,
    pub fields: Vec<FieldSelector>,
    pub next_page: Option<Selector>,
}

impl SelectorMap {
    pub fn field(&self, name: &str) -> Option<&FieldSelector> {
        self.fields.iter().find(|f| f.name == name)
    }
}

fn compile(field: &'static str, css: &str) -> Result<Selector, SelectorError> {
    Selector::parse(css).map_err(|e| SelectorError::InvalidCss {
        field,
        css: css.to_string(),
        reason: e.to_string(),
    })
}

/// Accumulates fields in declaration order; that order is the RawCard order.
struct MapBuilder {
    fields: Vec<FieldSelector>,
}

impl MapBuilder {
    fn new() -> Self {
        Self { fields: Vec::new() }
    }

    fn field(
        mut self,
        name: &'static str,
        css: Option<&str>,
        source: FieldSource,
    ) -> Result<Self, SelectorError> {
        if let Some(css) = css {
            self.fields.push(FieldSelector {
                name,
                css: css.to_string(),
                selector: compile(name, css)?,
                source,
            });
        }
        Ok(self)
    }

    fn finish(self, card: &str, next_page: Option<&str>) -> Result<SelectorMap, SelectorError> {
        Ok(SelectorMap {
            card: compile("card", card)?,
            fields: self.fields,
            next_page: next_page.map(|css| compile("next_page", css)).transpose()?,
        })
    }
}

/// Selectors for book catalogue pages (books.toscrape.com layout by default).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BookSelectors {
    pub card: String,
    pub link: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub availability: Option<String>,
    #[serde(default)]
    pub rating: Option<String>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl Default for BookSelectors {
    fn default() -> Self {
        Self {
            card: ".product_pod".to_string(),
            link: "h3 a".to_string(),
            title: Some("h3 a".to_string()),
            price: Some(".price_color".to_string()),
            availability: Some(".availability".to_string()),
            rating: Some(".star-rating".to_string()),
            next_page: Some("li.next a".to_string()),
        }
    }
}

impl BookSelectors {
    pub fn compile(&self) -> Result<SelectorMap, SelectorError> {
        MapBuilder::new()
            .field("title", self.title.as_deref(), FieldSource::AttrOrText("title"))?
            .field("price", self.price.as_deref(), FieldSource::Text)?
            .field("availability", self.availability.as_deref(), FieldSource::Text)?
            .field("rating", self.rating.as_deref(), FieldSource::RatingClass)?
            .field("link", Some(self.link.as_str()), FieldSource::Href)?
            .finish(&self.card, self.next_page.as_deref())
    }
}

/// Selectors for real-estate result pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertySelectors {
    pub card: String,
    pub link: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub beds: Option<String>,
    #[serde(default)]
    pub baths: Option<String>,
    #[serde(default)]
    pub sqft: Option<String>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl Default for PropertySelectors {
    fn default() -> Self {
        Self {
            card: r#"[data-testid="property-card"]"#.to_string(),
            link: r#"a[data-testid="card-link"]"#.to_string(),
            address: Some(r#"[data-testid="card-address"]"#.to_string()),
            price: Some(r#"[data-testid="card-price"]"#.to_string()),
            beds: Some(r#"[data-testid="property-meta-beds"]"#.to_string()),
            baths: Some(r#"[data-testid="property-meta-baths"]"#.to_string()),
            sqft: Some(r#"[data-testid="property-meta-sqft"]"#.to_string()),
            next_page: Some(r#"a[aria-label="Go to next page"]"#.to_string()),
        }
    }
}

impl PropertySelectors {
    pub fn compile(&self) -> Result<SelectorMap, SelectorError> {
        MapBuilder::new()
            .field("address", self.address.as_deref(), FieldSource::Text)?
            .field("price", self.price.as_deref(), FieldSource::Text)?
            .field("beds", self.beds.as_deref(), FieldSource::Text)?
            .field("baths", self.baths.as_deref(), FieldSource::Text)?
            .field("sqft", self.sqft.as_deref(), FieldSource::Text)?
            .field("link", Some(self.link.as_str()), FieldSource::Href)?
            .finish(&self.card, self.next_page.as_deref())
    }
}

/// Load a selector record from a JSON file.
pub fn load_selector_file<T, P>(path: P) -> Result<T, SelectorError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let display = path.display().to_string();
    let raw = std::fs::read_to_string(path).map_err(|source| SelectorError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| SelectorError::Parse {
        path: display,
        source,
    })
}

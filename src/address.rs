//! Heuristic splitting of one-line addresses into street, city, state and zip.
//!
//! The split is comma driven: `"street, city, STATE ZIP"`. Anything that does
//! not fit that shape keeps the caller's defaults. Addresses with embedded
//! commas (unit numbers, "Suite 4, ...") shift every segment by one and come
//! out wrong; no attempt is made to detect that.

/// Fallback values for address components the text does not provide.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressDefaults {
    pub city: String,
    pub state: String,
    pub zip: String,
}

impl AddressDefaults {
    pub fn new(city: impl Into<String>, state: impl Into<String>, zip: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressParts {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

pub fn split_address(text: &str, defaults: &AddressDefaults) -> AddressParts {
    let mut parts = AddressParts {
        street: text.trim().to_string(),
        city: defaults.city.clone(),
        state: defaults.state.clone(),
        zip: defaults.zip.clone(),
    };

    let segments: Vec<&str> = text.split(',').map(str::trim).collect();
    if segments.len() < 3 {
        return parts;
    }

    parts.street = segments[0].to_string();
    if !segments[1].is_empty() {
        parts.city = segments[1].to_string();
    }

    let mut tail = segments[2].split_whitespace();
    if let Some(state) = tail.next() {
        parts.state = state.to_string();
    }
    if let Some(zip) = tail.next() {
        parts.zip = zip.to_string();
    }

    parts
}

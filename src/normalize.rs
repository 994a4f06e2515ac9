//! Text and number normalization shared by every field parser.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // First ASCII digit run; commas are allowed once a digit has been seen.
    static ref NUMBER_RE: Regex = Regex::new(r"[0-9][0-9,]*").expect("valid number pattern");
}

/// Collapse whitespace runs to a single space and trim.
///
/// Returns `None` for absent input and for input that is empty once trimmed.
pub fn normalize_text(text: Option<&str>) -> Option<String> {
    let text = text?;
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Extract the first integer-like token from free text.
///
/// Thousands separators are dropped, anything after the first run of digits
/// (decimal fractions, currency, trailing words) is ignored. A token too large
/// for `u64` yields `None`.
pub fn parse_number(text: Option<&str>) -> Option<u64> {
    let text = text?;
    if text.is_empty() {
        return None;
    }

    let token = NUMBER_RE.find(text)?;
    let digits: String = token.as_str().chars().filter(|c| *c != ',').collect();
    digits.parse::<u64>().ok()
}

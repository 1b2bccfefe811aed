use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::SummaryError;

pub const INVALID_ISBN_MESSAGE: &str =
    "Invalid ISBN format. Please enter a 10 or 13 digit ISBN.";

static ISBN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}([0-9]{3})?$").expect("static regex compile"));

/// Strips hyphens and whitespace and checks for exactly 10 or 13 ASCII
/// digits. Returns the compact form.
///
/// # Errors
///
/// Returns `ValidationError` for anything else, including empty input.
pub fn normalize_isbn(raw: &str) -> Result<String, SummaryError> {
    let compact: String = raw
        .chars()
        .filter(|c| *c != '-' && !c.is_whitespace())
        .collect();

    if ISBN_RE.is_match(&compact) {
        Ok(compact)
    } else {
        Err(SummaryError::ValidationError(INVALID_ISBN_MESSAGE.to_string()))
    }
}

/// Live-validation helper for an input field: `None` means no error to show.
/// Blank input shows nothing but still cannot be submitted.
#[must_use]
pub fn isbn_error(raw: &str) -> Option<String> {
    if raw.trim().is_empty() {
        return None;
    }
    normalize_isbn(raw).err().map(|e| e.user_message())
}

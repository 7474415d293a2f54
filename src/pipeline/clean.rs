//! Text cleaning
//!
//! A pure text-to-text transform with no external state: normalize
//! whitespace, strip residual markup, replace URLs/emails/phone numbers with
//! stable placeholder tokens, normalize Unicode, then collapse whitespace
//! runs and trim.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

/// Placeholder substituted for URLs
pub const URL_TOKEN: &str = "_URL_";
/// Placeholder substituted for email addresses
pub const EMAIL_TOKEN: &str = "_EMAIL_";
/// Placeholder substituted for phone numbers
pub const PHONE_TOKEN: &str = "_PHONE_";

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").unwrap());

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}\b").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\+?\d{1,3}[-. (]{1,2}\d{2,4}[-. )]{1,2}\d{3,4}(?:[-. ]\d{2,6})?").unwrap()
});

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// Cleans extracted raw text into a stored-content form
pub fn clean_text(raw: &str) -> String {
    // Normalize exotic whitespace to plain spaces first so the scrubbing
    // regexes see word boundaries
    let text = raw.replace(['\u{a0}', '\u{2009}', '\u{200b}'], " ");

    // Residual markup that survived extraction
    let text = TAG_RE.replace_all(&text, " ");

    // Stable placeholder tokens
    let text = URL_RE.replace_all(&text, URL_TOKEN);
    let text = EMAIL_RE.replace_all(&text, EMAIL_TOKEN);
    let text = PHONE_RE.replace_all(&text, PHONE_TOKEN);

    // Unicode normalization (NFC)
    let text: String = text.nfc().collect();

    // Collapse all whitespace runs to single spaces and trim
    WHITESPACE_RE.replace_all(&text, " ").trim().to_string()
}

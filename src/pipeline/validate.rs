//! Content validation
//!
//! Three independent checks gate a cleaned text into storage: minimum
//! length, blocklist phrases, and language identification. Any one failing
//! rejects the page. Length is checked first so trivial text never reaches
//! language detection.

use crate::config::FilterConfig;
use std::fmt;

/// Why a cleaned text was rejected
///
/// A rejection is a filtering outcome, not an error; it is logged and the
/// task carries on to image processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Cleaned text is below the configured minimum length
    TooShort { length: usize, minimum: usize },

    /// A blocklist phrase appeared (case-insensitively)
    BlockedPhrase(String),

    /// Language identification failed or produced a disallowed tag
    Language(Option<String>),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::TooShort { length, minimum } => {
                write!(f, "text too short ({} < {} chars)", length, minimum)
            }
            Rejection::BlockedPhrase(phrase) => {
                write!(f, "blocklist phrase present: '{}'", phrase)
            }
            Rejection::Language(Some(tag)) => write!(f, "language '{}' not allowed", tag),
            Rejection::Language(None) => write!(f, "language identification failed"),
        }
    }
}

/// Validates cleaned text against the configured quality bar
pub fn validate_text(text: &str, filters: &FilterConfig) -> Result<(), Rejection> {
    // Character count, not bytes: the threshold is about visible text volume
    let length = text.chars().count();
    if length < filters.min_text_length {
        return Err(Rejection::TooShort {
            length,
            minimum: filters.min_text_length,
        });
    }

    let lowered = text.to_lowercase();
    for phrase in &filters.blocklist_phrases {
        if lowered.contains(&phrase.to_lowercase()) {
            return Err(Rejection::BlockedPhrase(phrase.clone()));
        }
    }

    match detect_language(text) {
        Some(tag) if filters.allowed_languages.contains(&tag) => Ok(()),
        other => Err(Rejection::Language(other)),
    }
}

/// Identifies the dominant language of a text
///
/// Script-ratio heuristic: the contract is text in, ISO 639-1 tag out, and
/// `None` when no confident identification is possible.
pub fn detect_language(text: &str) -> Option<String> {
    let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.is_empty() {
        return None;
    }

    let total = letters.len() as f64;
    let cjk = letters.iter().filter(|c| is_cjk(**c)).count() as f64;
    let cyrillic = letters
        .iter()
        .filter(|c| ('\u{0400}'..='\u{04ff}').contains(*c))
        .count() as f64;
    let ascii = letters.iter().filter(|c| c.is_ascii_alphabetic()).count() as f64;

    if cjk / total > 0.3 {
        Some("zh".to_string())
    } else if cyrillic / total > 0.3 {
        Some("ru".to_string())
    } else if ascii / total > 0.85 {
        Some("en".to_string())
    } else {
        None
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&c)
        || ('\u{3400}'..='\u{4dbf}').contains(&c)
        || ('\u{f900}'..='\u{faff}').contains(&c)
}

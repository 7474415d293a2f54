//! Content pipeline: extract, clean, validate
//!
//! Turns a fetched HTML body into storable training text:
//! - `extract`: main-content region selection with whole-page fallback
//! - `clean`: pure text normalization and scrubbing
//! - `validate`: length / blocklist / language quality gate

mod clean;
mod extract;
mod validate;

pub use clean::{clean_text, EMAIL_TOKEN, PHONE_TOKEN, URL_TOKEN};
pub use extract::{parse_page, PageContent};
pub use validate::{detect_language, validate_text, Rejection};

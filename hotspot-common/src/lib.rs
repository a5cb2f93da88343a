//! Common types and constants shared across the hotspot crates.
//!
//! This crate holds the pieces every other crate needs to agree on: the
//! hotspot identifier type, the public page URL template, the desktop
//! request headers, the page readiness markers, observability setup, and the
//! shared error type. It stays dependency-light so the extractor can depend on
//! it without pulling in the network stack.
//!
//! # Overview
//!
//! - [`HotspotId`]: validated numeric hotspot identifier
//! - [`hotspot_url`]: canonical statistics page for an identifier
//! - [`observability`]: centralised tracing/logging initialisation
//! - [`HotspotError`] and [`Result`]: shared error handling
//! - [`FetchMode`] and [`OutputFormat`]: how pages are obtained and printed
//!
//! # Examples
//!
//! ```rust
//! use hotspot_common::{hotspot_url, HotspotId};
//!
//! let id = HotspotId::new(" 9982 ").unwrap();
//! assert_eq!(id.as_str(), "9982");
//! assert_eq!(
//!     hotspot_url(&id),
//!     "https://world.helium.com/en/network/mobile/hotspot/9982"
//! );
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod observability;

/// Base of the public hotspot statistics page; the identifier is appended.
pub const HOTSPOT_URL_BASE: &str = "https://world.helium.com/en/network/mobile/hotspot/";

/// Desktop browser User-Agent sent with every page request.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
                              (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// `Accept` header matching what a desktop browser sends for a page load.
pub const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Literals whose presence means the statistics payload has been rendered.
pub const READINESS_MARKERS: [&str; 5] = [
    "\"lineItems\"",
    "\"Proof Of Coverage\"",
    "\"Data Transfer\"",
    "\"Helium Mobile\"",
    "\"Carrier Offload\"",
];

pub const DEFAULT_UPDATE_INTERVAL_MINUTES: u64 = 60;
pub const MIN_UPDATE_INTERVAL_MINUTES: u64 = 5;
pub const MAX_UPDATE_INTERVAL_MINUTES: u64 = 1440;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_BROWSER_MAX_WAIT_MS: u64 = 8000;
pub const BROWSER_POLL_STEP_MS: u64 = 400;

/// Numeric hotspot identifier as it appears in the page URL.
///
/// ```
/// use hotspot_common::HotspotId;
///
/// assert!(HotspotId::new("141703").is_ok());
/// assert!(HotspotId::new("14a").is_err());
/// assert!(HotspotId::new("   ").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct HotspotId(String);

impl HotspotId {
    /// Trim `raw` and accept it only if what remains is a non-empty run of ASCII digits.
    pub fn new(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(HotspotError::InvalidHotspot(raw.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HotspotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for HotspotId {
    type Error = HotspotError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(&value)
    }
}

impl From<HotspotId> for String {
    fn from(id: HotspotId) -> Self {
        id.0
    }
}

/// Statistics page URL for `id`.
pub fn hotspot_url(id: &HotspotId) -> String {
    format!("{HOTSPOT_URL_BASE}{id}")
}

/// How a hotspot page is obtained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Plain HTTP GET of the server-rendered page.
    #[default]
    Http,
    /// Headless browser render, polled until the payload appears.
    Browser,
}

/// Rendering of JSON written to stdout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Pretty,
    Compact,
}

impl OutputFormat {
    /// Serialize `value` in this format.
    pub fn render<T: Serialize>(self, value: &T) -> serde_json::Result<String> {
        match self {
            OutputFormat::Pretty => serde_json::to_string_pretty(value),
            OutputFormat::Compact => serde_json::to_string(value),
        }
    }
}

/// Error types shared across the hotspot crates.
#[derive(thiserror::Error, Debug)]
pub enum HotspotError {
    /// An identifier was empty or not made of digits.
    #[error("invalid hotspot identifier: {0:?}")]
    InvalidHotspot(String),
}

/// Convenient alias for results that use [`HotspotError`].
pub type Result<T> = std::result::Result<T, HotspotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hotspot_id_rejects_mixed_tokens() {
        assert!(matches!(
            HotspotId::new("12 34"),
            Err(HotspotError::InvalidHotspot(_))
        ));
        assert!(HotspotId::new("-5").is_err());
    }

    #[test]
    fn hotspot_id_deserializes_through_validation() {
        let id: HotspotId = serde_json::from_str("\" 42 \"").unwrap();
        assert_eq!(id.as_str(), "42");
        assert!(serde_json::from_str::<HotspotId>("\"x1\"").is_err());
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"42\"");
    }

    #[test]
    fn output_format_controls_whitespace() {
        let v = serde_json::json!({ "a": 1 });
        assert_eq!(OutputFormat::Compact.render(&v).unwrap(), r#"{"a":1}"#);
        assert!(OutputFormat::Pretty.render(&v).unwrap().contains('\n'));
    }

    #[test]
    fn fetch_mode_uses_lowercase_names() {
        let m: FetchMode = serde_json::from_str("\"browser\"").unwrap();
        assert_eq!(m, FetchMode::Browser);
        assert_eq!(FetchMode::default(), FetchMode::Http);
    }
}

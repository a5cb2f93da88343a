//! Compiled patterns and the small text helpers shared by the extractors.
//!
//! Every regex is built once per process. The pattern sources are constants,
//! so construction cannot fail at runtime.

use regex::Regex;
use std::sync::LazyLock;

use crate::corpus::decode_entities;

/// Signed integer, decimal or scientific-notation number.
const NUM: &str = r"-?[0-9]+(?:\.[0-9]+)?(?:[eE][+-]?[0-9]+)?";
/// Data-size unit; matched case-insensitively where used.
const UNIT: &str = r"[KMGTP]?B";
/// Characters allowed in one segment of a `City, Region[, Country]` line.
const PLACE: &str = r"[A-Za-z0-9\s.'\-\x{00C0}-\x{024F}]+";

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

/// `"label":"<label>","value":<num>` with the value optionally quoted.
/// A quoted value must close its quote.
fn labeled_number(label: &str) -> Regex {
    compile(&format!(
        r#"(?s)"label"\s*:\s*"{label}"\s*,\s*"value"\s*:\s*(?:"({NUM})"|({NUM}))"#
    ))
}

pub(crate) static PROOF_OF_COVERAGE: LazyLock<Regex> =
    LazyLock::new(|| labeled_number("Proof Of Coverage"));

pub(crate) static DATA_TRANSFER: LazyLock<Regex> =
    LazyLock::new(|| labeled_number("Data Transfer"));

pub(crate) const TOKENS_EARNED_MARKER: &str = "\"Tokens Earned\"";

/// Furthest a display chain may start after the marker, in characters.
pub(crate) const TOKENS_LOOKAHEAD_CHARS: usize = 6000;

/// `"children":[["$","svg", …], "<num>"`: the icon element followed by the
/// rendered total.
pub(crate) static TOKENS_DISPLAY_CHAIN: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r#""children"\s*:\s*\[\s*\[\s*"\$"\s*,\s*"svg"[^\]]*?\]\s*,\s*"({NUM})""#
    ))
});

pub(crate) static LINE_ITEMS: LazyLock<Regex> =
    LazyLock::new(|| compile(r#"(?s)"lineItems"\s*:\s*\[(.*?)\]"#));

pub(crate) static LABEL_VALUE_PAIR: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?s)\{\s*"label"\s*:\s*"(.*?)"\s*,\s*"value"\s*:\s*"(.*?)"\s*\}"#)
});

/// One object carrying `label` and, before the object closes, a string `value`.
fn labeled_object(label: &str) -> Regex {
    compile(&format!(
        r#"(?s)\{{\s*"label"\s*:\s*"{label}"[^}}]*"value"\s*:\s*"(.*?)"\s*\}}"#
    ))
}

pub(crate) static CARRIER_OFFLOAD_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| labeled_object("Carrier Offload"));

pub(crate) static HELIUM_MOBILE_OBJECT: LazyLock<Regex> =
    LazyLock::new(|| labeled_object("Helium Mobile"));

static DATA_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| compile(&format!(r"(?i)^\s*{NUM}\s*{UNIT}\s*$")));

pub(crate) static AVG_DAILY_META: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r#"(?i)property=["']og:description["']\s+content=["']Avg Daily Stats\s*\|\s*([0-9.]+)\s*({UNIT})\s*\|\s*([0-9]+)\s*users["']"#
    ))
});

pub(crate) static TITLE_DIV: LazyLock<Regex> = LazyLock::new(|| {
    compile(r#"(?s)<div[^>]*class="[^"]*text-3xl[^"]*"[^>]*>(.*?)</div>"#)
});

pub(crate) static LOCATION_DIV: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r#"<div[^>]*>\s*({PLACE},\s*{PLACE}(?:,\s*{PLACE})?)\s*</div>"#
    ))
});

pub(crate) static CLASSED_LOCATION_DIV: LazyLock<Regex> = LazyLock::new(|| {
    compile(&format!(
        r#"<div[^>]*class="[^"]*"[^>]*>\s*({PLACE},\s*{PLACE}(?:,\s*{PLACE})?)\s*</div>"#
    ))
});

static TAG: LazyLock<Regex> = LazyLock::new(|| compile(r"<[^>]+>"));

/// True when `value` reads like `65.52 MB` / `400.86kB`.
pub(crate) fn is_data_amount(value: &str) -> bool {
    DATA_AMOUNT.is_match(value)
}

/// Parse a matched number; anything unparseable counts as absent.
pub(crate) fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok()
}

/// Round to three decimal places through the shortest decimal rendering, so
/// `12.5 + 3.25` stays `15.75` rather than picking up binary noise.
pub(crate) fn round3(v: f64) -> f64 {
    format!("{v:.3}").parse().unwrap_or(v)
}

/// Decode entities, drop markup tags, trim.
pub(crate) fn clean_markup(s: &str) -> String {
    let decoded = decode_entities(s);
    TAG.replace_all(&decoded, "").trim().to_string()
}

/// Collapse every whitespace run to one space and trim the ends.
pub(crate) fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Byte offset `n` characters past `from`, clamped to the end of `text`.
pub(crate) fn char_offset(text: &str, from: usize, n: usize) -> usize {
    text[from..]
        .char_indices()
        .nth(n)
        .map_or(text.len(), |(i, _)| from + i)
}

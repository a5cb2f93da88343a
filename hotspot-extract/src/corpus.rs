//! The three text views every extractor searches.
//!
//! Pages arrive server-rendered (plain JSON inside attributes, sometimes
//! entity-encoded) or client-hydrated (JSON embedded as an escaped string
//! inside a script). No single view is matchable in every case, so each field
//! is searched across all three, in a fixed order, and the first view that
//! yields a match decides that field.

use std::borrow::Cow;

/// Which normalization produced a corpus entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// The page text as received.
    Raw,
    /// HTML entities decoded.
    Unescaped,
    /// Entities decoded, then `\n`, `\t`, `\/` and `\"` escapes flattened.
    Normalized,
}

impl Variant {
    pub const ORDER: [Variant; 3] = [Variant::Raw, Variant::Unescaped, Variant::Normalized];
}

/// Three views of one page, always searched in [`Variant::ORDER`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Corpus {
    views: [String; 3],
}

/// Build the corpus for `raw`. Never fails; an input without entities or
/// escapes simply yields three identical views.
///
/// ```
/// use hotspot_extract::corpus::{build_corpus, Variant};
///
/// let corpus = build_corpus(r#"{\"a\":\"x &amp; y\/z\"}"#);
/// assert_eq!(corpus.view(Variant::Raw), r#"{\"a\":\"x &amp; y\/z\"}"#);
/// assert_eq!(corpus.view(Variant::Unescaped), r#"{\"a\":\"x & y\/z\"}"#);
/// assert_eq!(corpus.view(Variant::Normalized), r#"{"a":"x & y/z"}"#);
/// ```
pub fn build_corpus(raw: &str) -> Corpus {
    let unescaped = decode_entities(raw).into_owned();
    let normalized = unescaped
        .replace(r"\n", " ")
        .replace(r"\t", " ")
        .replace(r"\/", "/")
        .replace(r#"\""#, "\"");
    Corpus {
        views: [raw.to_string(), unescaped, normalized],
    }
}

impl Corpus {
    pub fn view(&self, variant: Variant) -> &str {
        match variant {
            Variant::Raw => &self.views[0],
            Variant::Unescaped => &self.views[1],
            Variant::Normalized => &self.views[2],
        }
    }

    /// Views paired with their variant, in search order.
    pub fn iter(&self) -> impl Iterator<Item = (Variant, &str)> + '_ {
        Variant::ORDER.into_iter().map(move |v| (v, self.view(v)))
    }

    /// Run `rule` against each view in order and return the first hit,
    /// tagged with the view it came from.
    pub fn first_match<'a, T>(
        &'a self,
        mut rule: impl FnMut(&'a str) -> Option<T>,
    ) -> Option<(Variant, T)> {
        self.iter()
            .find_map(|(variant, text)| rule(text).map(|hit| (variant, hit)))
    }
}

/// Decode named and numeric HTML entities.
pub(crate) fn decode_entities(s: &str) -> Cow<'_, str> {
    html_escape::decode_html_entities(s)
}

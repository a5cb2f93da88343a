//! Hotspot name and location from the page header.
//!
//! The name sits in the large title container; the location is usually the
//! next short `City, Region[, Country]` line beneath it. When that layout is
//! missing, any classed container holding such a line is accepted.

use crate::corpus::Corpus;
use crate::patterns::{
    char_offset, clean_markup, collapse_whitespace, CLASSED_LOCATION_DIV, LOCATION_DIV, TITLE_DIV,
};

/// How far past the title container the location line may appear, in characters.
pub const LOCATION_WINDOW_CHARS: usize = 800;

const LOCATION_MIN_CHARS: usize = 3;
const LOCATION_MAX_CHARS: usize = 120;

pub fn extract_hotspot_name(corpus: &Corpus) -> Option<String> {
    let (_, inner) = corpus.first_match(|text| Some(TITLE_DIV.captures(text)?.get(1)?.as_str()))?;
    let name = clean_markup(inner);
    (!name.is_empty()).then_some(name)
}

pub fn extract_hotspot_location(corpus: &Corpus) -> Option<String> {
    let near_title = corpus.first_match(|text| {
        let title = TITLE_DIV.find(text)?;
        let end = char_offset(text, title.end(), LOCATION_WINDOW_CHARS);
        let window = &text[title.end()..end];
        clean_location(LOCATION_DIV.captures(window)?.get(1)?.as_str())
    });
    if let Some((variant, location)) = near_title {
        tracing::trace!(?variant, "location.near_title");
        return Some(location);
    }

    corpus
        .first_match(|text| {
            CLASSED_LOCATION_DIV
                .captures_iter(text)
                .find_map(|caps| clean_location(caps.get(1)?.as_str()))
        })
        .map(|(variant, location)| {
            tracing::trace!(?variant, "location.global");
            location
        })
}

/// Normalize a location candidate; `None` unless it has a comma and a
/// plausible length.
///
/// ```
/// use hotspot_extract::identity::clean_location;
///
/// assert_eq!(clean_location(" Reno,\n  NV ").as_deref(), Some("Reno, NV"));
/// assert_eq!(clean_location("a,"), None);
/// assert_eq!(clean_location("Reno NV"), None);
/// ```
pub fn clean_location(candidate: &str) -> Option<String> {
    let loc = collapse_whitespace(&clean_markup(candidate));
    let len = loc.chars().count();
    (loc.contains(',') && (LOCATION_MIN_CHARS..=LOCATION_MAX_CHARS).contains(&len)).then_some(loc)
}

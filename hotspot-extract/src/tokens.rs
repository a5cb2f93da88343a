//! HNT earned over the last 30 days.
//!
//! The total is derived by summing the Proof Of Coverage and Data Transfer
//! line items. Pages that only carry the rendered "Tokens Earned" card fall
//! back to the number displayed there. The two sources are never reconciled.

use regex::Regex;

use crate::corpus::Corpus;
use crate::patterns::{
    char_offset, parse_number, round3, DATA_TRANSFER, PROOF_OF_COVERAGE, TOKENS_DISPLAY_CHAIN,
    TOKENS_EARNED_MARKER, TOKENS_LOOKAHEAD_CHARS,
};
use crate::record::HntSource;

/// Reward components and the total derived from them.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TokenTotals {
    pub proof_of_coverage: Option<f64>,
    pub data_transfer: Option<f64>,
    pub total: Option<f64>,
    pub source: HntSource,
}

pub fn extract_tokens_hnt(corpus: &Corpus) -> TokenTotals {
    let mut poc = None;
    let mut dt = None;

    for (variant, text) in corpus.iter() {
        if poc.is_none() {
            poc = labeled_value(&PROOF_OF_COVERAGE, text);
        }
        if dt.is_none() {
            dt = labeled_value(&DATA_TRANSFER, text);
        }
        if let (Some(p), Some(d)) = (poc, dt) {
            tracing::trace!(?variant, poc = p, dt = d, "tokens.sum");
            return TokenTotals {
                proof_of_coverage: poc,
                data_transfer: dt,
                total: Some(round3(p + d)),
                source: HntSource::Sum,
            };
        }
    }

    if let Some((variant, shown)) = corpus.first_match(displayed_total) {
        tracing::trace!(?variant, total = shown, "tokens.display");
        return TokenTotals {
            proof_of_coverage: poc,
            data_transfer: dt,
            total: Some(round3(shown)),
            source: HntSource::Display,
        };
    }

    TokenTotals {
        proof_of_coverage: poc,
        data_transfer: dt,
        total: None,
        source: HntSource::None,
    }
}

fn labeled_value(re: &Regex, text: &str) -> Option<f64> {
    let caps = re.captures(text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?;
    parse_number(raw.as_str())
}

/// Number closing the first display chain that starts within the lookahead
/// window of some "Tokens Earned" marker.
///
/// Markers are visited in order and the leftmost chain at or after the
/// current marker is cached, so the text is searched for chains only when a
/// marker moves past the cached one.
fn displayed_total(text: &str) -> Option<f64> {
    // (start, number) of the leftmost chain from the last search position
    let mut chain: Option<(usize, Option<f64>)> = None;
    let mut searched = false;

    for (at, marker) in text.match_indices(TOKENS_EARNED_MARKER) {
        let after = at + marker.len();
        let stale = matches!(chain, Some((start, _)) if start < after);
        if !searched || stale {
            chain = TOKENS_DISPLAY_CHAIN.captures_at(text, after).and_then(|caps| {
                let start = caps.get(0)?.start();
                Some((start, caps.get(1).and_then(|n| parse_number(n.as_str()))))
            });
            searched = true;
        }
        let (start, value) = chain?;
        if start <= char_offset(text, after, TOKENS_LOOKAHEAD_CHARS) {
            if let Some(value) = value {
                return Some(value);
            }
        }
    }
    None
}

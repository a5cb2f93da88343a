//! Field extraction for Helium mobile hotspot statistics pages.
//!
//! The page embeds its data as JSON inside HTML, escaped differently depending
//! on how it was rendered. Extraction is a chain of ordered rules: each field
//! is looked up across the three views of a [`corpus::Corpus`], first hit
//! wins, and a miss is simply `None`. Nothing here performs I/O or keeps
//! state, so [`parse`] can be called from any number of threads at once.
//!
//! ```
//! use hotspot_extract::{parse, HntSource};
//!
//! let page = r#"{"label":"Proof Of Coverage","value":"10.0"},{"label":"Data Transfer","value":"5.5"}"#;
//! let record = parse(page);
//! assert_eq!(record.tokens_earned_30d_hnt, Some(15.5));
//! assert_eq!(record.hnt_source, HntSource::Sum);
//! assert_eq!(record.hotspot_name, None);
//! ```

pub mod amounts;
pub mod avg_daily;
pub mod corpus;
pub mod identity;
mod patterns;
pub mod record;
pub mod tokens;

pub use amounts::{extract_data_amounts, DataAmounts};
pub use avg_daily::{extract_avg_daily, AvgDaily};
pub use corpus::{build_corpus, Corpus, Variant};
pub use identity::{extract_hotspot_location, extract_hotspot_name};
pub use record::{ExtractedRecord, HntSource, HotspotReport};
pub use tokens::{extract_tokens_hnt, TokenTotals};

/// Extract every field from one page.
pub fn parse(raw: &str) -> ExtractedRecord {
    let corpus = build_corpus(raw);

    let tokens = extract_tokens_hnt(&corpus);
    let amounts = extract_data_amounts(&corpus);
    let avg = extract_avg_daily(&corpus);
    let record = ExtractedRecord {
        proof_of_coverage_30d: tokens.proof_of_coverage,
        data_transfer_30d: tokens.data_transfer,
        tokens_earned_30d_hnt: tokens.total,
        hnt_source: tokens.source,
        carrier_offload: amounts.carrier_offload,
        helium_mobile: amounts.helium_mobile,
        avg_daily_data: avg.data,
        avg_daily_users: avg.users,
        hotspot_name: extract_hotspot_name(&corpus),
        hotspot_location: extract_hotspot_location(&corpus),
    };

    tracing::debug!(
        bytes = raw.len(),
        hnt_source = ?record.hnt_source,
        total = ?record.tokens_earned_30d_hnt,
        name = ?record.hotspot_name,
        location = ?record.hotspot_location,
        "page parsed"
    );
    record
}

//! Carrier Offload / Helium Mobile data amounts.
//!
//! The same labels also appear next to HNT amounts, so a value only counts
//! when it carries a data-size unit. Both amounts are returned together or
//! not at all.

use regex::Regex;
use std::collections::HashMap;

use crate::corpus::Corpus;
use crate::patterns::{
    is_data_amount, CARRIER_OFFLOAD_OBJECT, HELIUM_MOBILE_OBJECT, LABEL_VALUE_PAIR, LINE_ITEMS,
};

const CARRIER_OFFLOAD: &str = "Carrier Offload";
const HELIUM_MOBILE: &str = "Helium Mobile";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DataAmounts {
    pub carrier_offload: Option<String>,
    pub helium_mobile: Option<String>,
}

pub fn extract_data_amounts(corpus: &Corpus) -> DataAmounts {
    let found = corpus
        .first_match(from_line_items)
        .map(|(variant, pair)| {
            tracing::trace!(?variant, "amounts.line_items");
            pair
        })
        .or_else(|| {
            corpus.first_match(from_objects).map(|(variant, pair)| {
                tracing::trace!(?variant, "amounts.objects");
                pair
            })
        });

    match found {
        Some((co, hm)) => DataAmounts {
            carrier_offload: Some(co),
            helium_mobile: Some(hm),
        },
        None => DataAmounts::default(),
    }
}

/// First `lineItems` group whose two amounts both validate.
fn from_line_items(text: &str) -> Option<(String, String)> {
    LINE_ITEMS.captures_iter(text).find_map(|group| {
        let body = group.get(1)?.as_str();
        // Later duplicates overwrite earlier ones within a group.
        let labels: HashMap<&str, &str> = LABEL_VALUE_PAIR
            .captures_iter(body)
            .filter_map(|pair| Some((pair.get(1)?.as_str(), pair.get(2)?.as_str())))
            .collect();
        validated_pair(
            labels.get(CARRIER_OFFLOAD).copied(),
            labels.get(HELIUM_MOBILE).copied(),
        )
    })
}

/// Each label searched on its own, value taken from inside the same object.
fn from_objects(text: &str) -> Option<(String, String)> {
    validated_pair(
        first_value(&CARRIER_OFFLOAD_OBJECT, text),
        first_value(&HELIUM_MOBILE_OBJECT, text),
    )
}

fn first_value<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
    re.captures(text)?.get(1).map(|m| m.as_str())
}

fn validated_pair(co: Option<&str>, hm: Option<&str>) -> Option<(String, String)> {
    match (co, hm) {
        (Some(co), Some(hm)) if is_data_amount(co) && is_data_amount(hm) => {
            Some((co.trim().to_string(), hm.trim().to_string()))
        }
        _ => None,
    }
}

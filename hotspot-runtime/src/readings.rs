//! Per-field readings derived from a [`HotspotReport`], one per sensor kind.
use hotspot_extract::HotspotReport;
use serde::Serialize;
use serde_json::{Map, Value};

/// A field exposed as its own reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorKind {
    /// Field name in the record.
    pub key: &'static str,
    pub name: &'static str,
    pub unit: Option<&'static str>,
}

pub const SENSORS: [SensorKind; 7] = [
    SensorKind {
        key: "tokens_earned_30d_hnt",
        name: "HNT (30D)",
        unit: Some("HNT"),
    },
    SensorKind {
        key: "proof_of_coverage_30d",
        name: "PoC (30D)",
        unit: Some("HNT"),
    },
    SensorKind {
        key: "data_transfer_30d",
        name: "Data Transfer (30D HNT)",
        unit: Some("HNT"),
    },
    SensorKind {
        key: "carrier_offload",
        name: "Carrier Offload (30D)",
        unit: None,
    },
    SensorKind {
        key: "helium_mobile",
        name: "Helium Mobile (30D)",
        unit: None,
    },
    SensorKind {
        key: "avg_daily_data",
        name: "Avg Daily Data",
        unit: None,
    },
    SensorKind {
        key: "avg_daily_users",
        name: "Avg Daily Users",
        unit: None,
    },
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reading {
    /// `<entry>_<hotspot>_<key>`, stable across refreshes.
    pub unique_id: String,
    pub device: String,
    pub name: String,
    pub unit: Option<&'static str>,
    /// `null` when the field was not found on the page.
    pub value: Value,
    pub attributes: Map<String, Value>,
}

pub fn readings(entry_id: &str, report: &HotspotReport) -> Vec<Reading> {
    let fields = match serde_json::to_value(&report.record) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    let field = |key: &str| fields.get(key).cloned().unwrap_or(Value::Null);
    let device = report.title();

    SENSORS
        .iter()
        .map(|kind| {
            let mut attributes = Map::new();
            attributes.insert("hotspot".into(), Value::String(report.hotspot.to_string()));
            attributes.insert("url".into(), Value::String(report.url.clone()));
            attributes.insert("hotspot_name".into(), field("hotspot_name"));
            attributes.insert("hotspot_location".into(), field("hotspot_location"));
            if kind.key == "tokens_earned_30d_hnt" {
                for key in ["hnt_source", "proof_of_coverage_30d", "data_transfer_30d"] {
                    attributes.insert(key.into(), field(key));
                }
            }
            Reading {
                unique_id: format!("{entry_id}_{}_{}", report.hotspot, kind.key),
                device: device.clone(),
                name: format!("{} {}", report.hotspot, kind.name),
                unit: kind.unit,
                value: field(kind.key),
                attributes,
            }
        })
        .collect()
}

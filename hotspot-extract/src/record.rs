use hotspot_common::{hotspot_url, HotspotId};
use serde::{Deserialize, Serialize};

/// Where `tokens_earned_30d_hnt` came from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HntSource {
    /// Proof Of Coverage + Data Transfer.
    Sum,
    /// Read off the rendered Tokens Earned card.
    Display,
    /// No total found.
    #[default]
    None,
}

/// Everything recovered from one hotspot page. Missing fields serialize as `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub proof_of_coverage_30d: Option<f64>,
    pub data_transfer_30d: Option<f64>,
    pub tokens_earned_30d_hnt: Option<f64>,
    pub hnt_source: HntSource,
    pub carrier_offload: Option<String>,
    pub helium_mobile: Option<String>,
    pub avg_daily_data: Option<String>,
    pub avg_daily_users: Option<String>,
    pub hotspot_name: Option<String>,
    pub hotspot_location: Option<String>,
}

/// An [`ExtractedRecord`] tagged with the hotspot it describes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotReport {
    pub hotspot: HotspotId,
    pub url: String,
    #[serde(flatten)]
    pub record: ExtractedRecord,
}

impl HotspotReport {
    /// Attach `record` to `hotspot` and its canonical page URL.
    pub fn new(hotspot: HotspotId, record: ExtractedRecord) -> Self {
        let url = hotspot_url(&hotspot);
        Self {
            hotspot,
            url,
            record,
        }
    }

    /// Display title: the scraped name, else a generic label with the identifier.
    pub fn title(&self) -> String {
        self.record
            .hotspot_name
            .clone()
            .unwrap_or_else(|| format!("Helium Hotspot {}", self.hotspot))
    }
}

//! Loader for scraper settings with YAML + environment overlays.
//!
//! Sources are merged in this order, later ones winning:
//!
//! 1. files and inline YAML, in the order they were attached
//! 2. `HOTSPOT_`-prefixed environment variables (`__` separates nested keys,
//!    e.g. `HOTSPOT_FETCH__MODE=browser`)
//!
//! String values may reference other environment variables as `${VAR}`; these
//! are expanded after merging. The merged [`RawSettings`] are then checked by
//! [`RawSettings::validate`], which turns the comma-separated hotspot list into
//! identifiers and clamps the refresh interval.
//!
//! ```yaml
//! hotspots: "9982, 141703"
//! update_interval_minutes: 30
//! fetch:
//!   mode: browser
//!   max_wait_ms: 10000
//!   webdriver_url: "${WEBDRIVER_URL}"
//! ```
use config::{Config, Environment, File, FileFormat};
use hotspot_common::{
    DEFAULT_BROWSER_MAX_WAIT_MS, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_UPDATE_INTERVAL_MINUTES,
    FetchMode, HotspotId, MAX_UPDATE_INTERVAL_MINUTES, MIN_UPDATE_INTERVAL_MINUTES,
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const MAXIMUM_ENV_EXPANSION_DEPTH: usize = 8;
const ENV_PREFIX: &str = "HOTSPOT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not load configuration: {0}")]
    Source(#[from] config::ConfigError),
    #[error("configuration does not match the expected shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("no valid hotspot identifiers in {0:?}")]
    InvalidHotspots(String),
}

// ==============================
// Settings
// ==============================

/// Settings exactly as merged from the sources, before validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSettings {
    #[serde(default, deserialize_with = "hotspot_list")]
    pub hotspots: String,
    #[serde(default)]
    pub update_interval_minutes: Option<i64>,
    #[serde(default)]
    pub fetch: FetchSettings,
}

/// How pages are obtained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    pub mode: FetchMode,
    pub timeout_secs: u64,
    pub max_wait_ms: u64,
    pub webdriver_url: String,
    pub headless: bool,
}

impl Default for FetchSettings {
    fn default() -> Self {
        Self {
            mode: FetchMode::Http,
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_wait_ms: DEFAULT_BROWSER_MAX_WAIT_MS,
            webdriver_url: "http://localhost:9515".into(),
            headless: true,
        }
    }
}

impl FetchSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn max_wait(&self) -> Duration {
        Duration::from_millis(self.max_wait_ms)
    }
}

/// Validated settings ready to drive a coordinator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub hotspots: Vec<HotspotId>,
    pub update_interval: Duration,
    pub fetch: FetchSettings,
}

impl RawSettings {
    /// Parse the hotspot list and clamp the interval.
    ///
    /// ```
    /// use hotspot_config::RawSettings;
    /// use std::time::Duration;
    ///
    /// let raw = RawSettings {
    ///     hotspots: "9982, abc, 141703".into(),
    ///     update_interval_minutes: Some(2),
    ///     ..Default::default()
    /// };
    /// let settings = raw.validate().unwrap();
    /// assert_eq!(settings.hotspots.len(), 2);
    /// assert_eq!(settings.update_interval, Duration::from_secs(5 * 60));
    /// ```
    pub fn validate(self) -> Result<Settings, ConfigError> {
        let hotspots = parse_hotspot_list(&self.hotspots)?;
        let minutes = clamp_interval_minutes(self.update_interval_minutes);
        Ok(Settings {
            hotspots,
            update_interval: Duration::from_secs(minutes * 60),
            fetch: self.fetch,
        })
    }
}

// ==============================
// Hotspot list and interval
// ==============================

/// Keep only the all-digit comma-separated tokens, trimmed, joined by commas.
///
/// ```
/// use hotspot_config::normalize_hotspots;
///
/// assert_eq!(normalize_hotspots(" 9982 # ,123456"), "123456");
/// assert_eq!(normalize_hotspots("9982, 141703"), "9982,141703");
/// assert_eq!(normalize_hotspots(" , x"), "");
/// ```
pub fn normalize_hotspots(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && t.bytes().all(|b| b.is_ascii_digit()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Identifiers from a comma-separated list, in order, without duplicates.
/// Tokens that are not all digits are dropped; an empty result is an error.
pub fn parse_hotspot_list(raw: &str) -> Result<Vec<HotspotId>, ConfigError> {
    let normalized = normalize_hotspots(raw);
    let mut ids: Vec<HotspotId> = Vec::new();
    for token in normalized.split(',').filter(|t| !t.is_empty()) {
        let id = HotspotId::new(token).map_err(|_| ConfigError::InvalidHotspots(raw.to_string()))?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    if ids.is_empty() {
        return Err(ConfigError::InvalidHotspots(raw.to_string()));
    }
    let dropped = raw.split(',').filter(|t| !t.trim().is_empty()).count() - ids.len();
    if dropped > 0 {
        tracing::warn!(input = %raw, kept = ids.len(), dropped, "config.hotspots.dropped_tokens");
    }
    Ok(ids)
}

/// Refresh interval in minutes: 60 when unset, otherwise clamped to 5..=1440.
///
/// ```
/// use hotspot_config::clamp_interval_minutes;
///
/// assert_eq!(clamp_interval_minutes(None), 60);
/// assert_eq!(clamp_interval_minutes(Some(1)), 5);
/// assert_eq!(clamp_interval_minutes(Some(90)), 90);
/// assert_eq!(clamp_interval_minutes(Some(100_000)), 1440);
/// ```
pub fn clamp_interval_minutes(minutes: Option<i64>) -> u64 {
    match minutes {
        None => DEFAULT_UPDATE_INTERVAL_MINUTES,
        Some(m) => m.clamp(
            MIN_UPDATE_INTERVAL_MINUTES as i64,
            MAX_UPDATE_INTERVAL_MINUTES as i64,
        ) as u64,
    }
}

/// `hotspots` may be written as a string, a bare number, or a YAML list.
fn hotspot_list<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Text(String),
        Number(u64),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Field {
        One(Scalar),
        Many(Vec<Scalar>),
    }

    fn text(s: Scalar) -> String {
        match s {
            Scalar::Text(t) => t,
            Scalar::Number(n) => n.to_string(),
        }
    }

    Ok(match Field::deserialize(de)? {
        Field::One(s) => text(s),
        Field::Many(items) => items.into_iter().map(text).collect::<Vec<_>>().join(","),
    })
}

/// `<config dir>/hotspot/hotspot.yaml`, when the platform has a config dir.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("hotspot").join("hotspot.yaml"))
}

fn expand_env_in_value(v: &mut Value) {
    match v {
        Value::String(s) => {
            if s.contains('$') {
                let mut cur = std::mem::take(s);
                for _ in 0..MAXIMUM_ENV_EXPANSION_DEPTH {
                    let expanded = match shellexpand::env(&cur) {
                        Ok(cow) => cow.into_owned(),
                        Err(_) => cur.clone(),
                    };
                    if expanded == cur {
                        break;
                    }
                    cur = expanded;
                }
                *s = cur;
            }
        }
        Value::Array(arr) => arr.iter_mut().for_each(expand_env_in_value),
        Value::Object(obj) => obj.values_mut().for_each(expand_env_in_value),
        _ => {}
    }
}

// ==============================
// Loader
// ==============================

/// Builder over the `config` crate; the environment overlay is applied last.
pub struct HotspotConfigLoader {
    builder: config::ConfigBuilder<config::builder::DefaultState>,
    env_prefix: String,
}

impl Default for HotspotConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl HotspotConfigLoader {
    /// Start with only the `HOTSPOT_` environment overlay.
    ///
    /// ```
    /// use hotspot_config::HotspotConfigLoader;
    ///
    /// let raw = HotspotConfigLoader::new()
    ///     .with_yaml_str("hotspots: '9982'\nupdate_interval_minutes: 15")
    ///     .load()
    ///     .expect("valid config");
    /// assert_eq!(raw.hotspots, "9982");
    /// assert_eq!(raw.update_interval_minutes, Some(15));
    /// assert_eq!(raw.fetch.max_wait_ms, 8000);
    /// ```
    pub fn new() -> Self {
        Self {
            builder: Config::builder(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Read environment overrides from `<prefix>_...` instead of `HOTSPOT_...`.
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = prefix.to_string();
        self
    }

    /// Attach a YAML/TOML/JSON file that must exist; format is inferred by suffix.
    pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(true));
        self
    }

    /// Attach a file that is skipped when missing.
    pub fn with_optional_file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.builder = self
            .builder
            .add_source(File::from(path.as_ref()).required(false));
        self
    }

    /// Merge an inline YAML snippet.
    pub fn with_yaml_str(mut self, yaml: &str) -> Self {
        self.builder = self
            .builder
            .add_source(File::from_str(yaml, FileFormat::Yaml));
        self
    }

    /// Merge every source, expand `${VAR}` placeholders and deserialize.
    ///
    /// ```
    /// use hotspot_common::FetchMode;
    /// use hotspot_config::HotspotConfigLoader;
    ///
    /// unsafe { std::env::set_var("DOC_WEBDRIVER", "http://grid:4444"); }
    ///
    /// let raw = HotspotConfigLoader::new()
    ///     .with_yaml_str(r#"
    /// hotspots: "9982"
    /// fetch:
    ///   mode: browser
    ///   webdriver_url: "${DOC_WEBDRIVER}"
    /// "#)
    ///     .load()
    ///     .expect("valid configuration");
    ///
    /// assert_eq!(raw.fetch.mode, FetchMode::Browser);
    /// assert_eq!(raw.fetch.webdriver_url, "http://grid:4444");
    ///
    /// unsafe { std::env::remove_var("DOC_WEBDRIVER"); }
    /// ```
    pub fn load(self) -> Result<RawSettings, ConfigError> {
        let cfg = self
            .builder
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut v: Value = cfg.try_deserialize()?;
        expand_env_in_value(&mut v);

        let raw: RawSettings = serde_json::from_value(v)?;
        tracing::debug!(
            hotspots = %raw.hotspots,
            interval = ?raw.update_interval_minutes,
            mode = ?raw.fetch.mode,
            "config.loaded"
        );
        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn expands_recursively_across_env_values() {
        temp_env::with_vars(
            [
                ("HS_BAZ", Some("qux")),
                ("HS_BAR", Some("mid-${HS_BAZ}")),
                ("HS_FOO", Some("start-${HS_BAR}-end")),
            ],
            || {
                let mut v = json!({ "a": ["X=${HS_FOO}", 3] });
                expand_env_in_value(&mut v);
                assert_eq!(v, json!({ "a": ["X=start-mid-qux-end", 3] }));
            },
        );
    }

    #[test]
    fn cycles_stop_at_depth_cap() {
        temp_env::with_vars([("HS_A", Some("${HS_B}")), ("HS_B", Some("${HS_A}"))], || {
            let mut v = json!("x=${HS_A}-y");
            expand_env_in_value(&mut v);
            let s = v.as_str().unwrap();
            assert!(s.starts_with("x=") && s.ends_with("-y"));
            assert!(s.contains("${"));
        });
    }

    #[test]
    fn unknown_vars_are_left_as_is() {
        let mut v = json!("hi-${HS_DOES_NOT_EXIST}");
        expand_env_in_value(&mut v);
        assert_eq!(v, json!("hi-${HS_DOES_NOT_EXIST}"));
    }

    #[test]
    fn hotspot_list_keeps_order_and_drops_duplicates() {
        let ids = parse_hotspot_list("141703, 9982,141703,,x1").unwrap();
        let ids: Vec<&str> = ids.iter().map(HotspotId::as_str).collect();
        assert_eq!(ids, ["141703", "9982"]);
    }

    #[test]
    fn empty_or_invalid_list_is_rejected() {
        for raw in ["", " , ", "abc", "12a, -3"] {
            assert!(
                matches!(parse_hotspot_list(raw), Err(ConfigError::InvalidHotspots(_))),
                "{raw:?} should be rejected"
            );
        }
    }

    #[test]
    fn negative_interval_clamps_to_minimum() {
        assert_eq!(clamp_interval_minutes(Some(-10)), 5);
        assert_eq!(clamp_interval_minutes(Some(5)), 5);
        assert_eq!(clamp_interval_minutes(Some(1440)), 1440);
    }

    #[test]
    fn hotspots_accepts_number_and_list() {
        let raw: RawSettings = serde_json::from_value(json!({ "hotspots": 9982 })).unwrap();
        assert_eq!(raw.hotspots, "9982");
        let raw: RawSettings =
            serde_json::from_value(json!({ "hotspots": [9982, "141703"] })).unwrap();
        assert_eq!(raw.hotspots, "9982,141703");
    }

    #[test]
    fn missing_fetch_section_uses_defaults() {
        let raw: RawSettings = serde_json::from_value(json!({ "hotspots": "1" })).unwrap();
        assert_eq!(raw.fetch, FetchSettings::default());
        assert_eq!(raw.fetch.timeout(), Duration::from_secs(20));
        assert_eq!(raw.fetch.max_wait(), Duration::from_millis(8000));
    }
}

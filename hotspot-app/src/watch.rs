//! `hotspot watch`: run a coordinator and print each published snapshot.
use crate::cli::WatchArgs;
use anyhow::{Context, Result};
use hotspot_common::FetchMode;
use hotspot_config::{HotspotConfigLoader, RawSettings, Settings, default_config_path};
use hotspot_runtime::readings::{Reading, readings};
use hotspot_runtime::{HotspotHandle, Snapshot, registry, source_from_settings};
use std::sync::Arc;

const ENTRY_ID: &str = "cli";

pub fn load_settings(args: &WatchArgs) -> Result<Settings> {
    let mut loader = HotspotConfigLoader::new();
    match (&args.config, default_config_path()) {
        (Some(path), _) => loader = loader.with_file(path),
        (None, Some(path)) => loader = loader.with_optional_file(path),
        (None, None) => {}
    }
    let raw = loader.load().context("loading settings")?;
    Ok(apply_overrides(raw, args).validate()?)
}

fn apply_overrides(mut raw: RawSettings, args: &WatchArgs) -> RawSettings {
    if let Some(hotspots) = &args.hotspots {
        raw.hotspots = hotspots.clone();
    }
    if args.interval_minutes.is_some() {
        raw.update_interval_minutes = args.interval_minutes;
    }
    if args.browser {
        raw.fetch.mode = FetchMode::Browser;
    }
    raw
}

/// One stdout line for `snapshot`.
pub fn render(snapshot: &Snapshot, as_readings: bool) -> Result<String> {
    if as_readings {
        let mut ids: Vec<_> = snapshot.reports.keys().collect();
        ids.sort();
        let all: Vec<Reading> = ids
            .into_iter()
            .flat_map(|id| readings(ENTRY_ID, &snapshot.reports[id]))
            .collect();
        return Ok(serde_json::to_string(&all)?);
    }
    Ok(serde_json::to_string(&snapshot.reports)?)
}

pub async fn run(handle: HotspotHandle, settings: Settings, as_readings: bool) -> Result<()> {
    let source = source_from_settings(&settings.fetch)?;
    let mut rx = registry::setup_entry(ENTRY_ID, &settings, source)
        .await
        .context("first refresh")?;
    let cancel = handle.cancellation();

    loop {
        let latest: Option<Arc<Snapshot>> = rx.borrow_and_update().clone();
        if let Some(snapshot) = latest {
            println!("{}", render(&snapshot, as_readings)?);
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = cancel.cancelled() => break,
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    registry::unload_entry(ENTRY_ID).await;
    tracing::info!("watch.stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use hotspot_common::HotspotId;
    use hotspot_extract::{ExtractedRecord, HotspotReport};
    use serde_json::Value;
    use std::collections::HashMap;

    fn watch_args() -> WatchArgs {
        WatchArgs {
            config: None,
            hotspots: None,
            interval_minutes: None,
            browser: false,
            readings: false,
        }
    }

    #[test]
    fn flags_override_loaded_settings() {
        let raw = RawSettings {
            hotspots: "1".into(),
            update_interval_minutes: Some(30),
            ..Default::default()
        };
        let args = WatchArgs {
            hotspots: Some("2, 3".into()),
            interval_minutes: Some(10_000),
            browser: true,
            ..watch_args()
        };
        let settings = apply_overrides(raw, &args).validate().unwrap();
        assert_eq!(settings.hotspots.len(), 2);
        assert_eq!(settings.update_interval.as_secs(), 1440 * 60);
        assert_eq!(settings.fetch.mode, FetchMode::Browser);
    }

    #[test]
    fn absent_flags_keep_loaded_settings() {
        let raw = RawSettings {
            hotspots: "1".into(),
            update_interval_minutes: Some(30),
            ..Default::default()
        };
        let settings = apply_overrides(raw, &watch_args()).validate().unwrap();
        assert_eq!(settings.hotspots[0].as_str(), "1");
        assert_eq!(settings.update_interval.as_secs(), 30 * 60);
        assert_eq!(settings.fetch.mode, FetchMode::Http);
    }

    #[test]
    fn render_reports_and_readings() {
        let id = HotspotId::new("9982").unwrap();
        let report = HotspotReport::new(
            id.clone(),
            ExtractedRecord {
                avg_daily_users: Some("10".into()),
                ..Default::default()
            },
        );
        let snapshot = Snapshot {
            reports: HashMap::from([(id, report)]),
            updated_at: chrono::Utc::now(),
        };

        let line = render(&snapshot, false).unwrap();
        assert!(!line.contains('\n'));
        let v: Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["9982"]["avg_daily_users"], "10");

        let v: Value = serde_json::from_str(&render(&snapshot, true).unwrap()).unwrap();
        let items = v.as_array().unwrap();
        assert_eq!(items.len(), 7);
        assert_eq!(items[0]["unique_id"], "cli_9982_tokens_earned_30d_hnt");
    }
}

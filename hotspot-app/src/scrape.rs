//! `hotspot scrape`: one page in, one JSON document out.
//!
//! Whatever happens, stdout gets valid JSON: failures are reported as
//! `{"error": "..."}` and the process still exits 0.
use crate::cli::ScrapeArgs;
use anyhow::{Context, Result};
use hotspot_common::{FetchMode, HotspotId, OutputFormat, hotspot_url};
use hotspot_config::FetchSettings;
use hotspot_extract::{ExtractedRecord, parse};
use hotspot_runtime::{HotspotRuntime, PageSource, source_from_settings};
use serde::Serialize;

/// Record plus whatever identified the page.
#[derive(Debug, Serialize)]
struct ScrapeOutput {
    #[serde(skip_serializing_if = "Option::is_none")]
    hotspot: Option<HotspotId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<String>,
    #[serde(flatten)]
    record: ExtractedRecord,
}

/// Run the command and return the text for stdout.
pub fn run(runtime: &HotspotRuntime, args: &ScrapeArgs) -> String {
    let format = if args.compact {
        OutputFormat::Compact
    } else {
        OutputFormat::Pretty
    };
    match scrape(runtime, args).and_then(|out| Ok(format.render(&out)?)) {
        Ok(json) => json,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "scrape.failed");
            error_json(&format!("{err:#}"))
        }
    }
}

pub fn error_json(message: &str) -> String {
    serde_json::json!({ "error": message }).to_string()
}

fn scrape(runtime: &HotspotRuntime, args: &ScrapeArgs) -> Result<ScrapeOutput> {
    if let Some(path) = &args.file {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {}", path.display()))?;
        return Ok(ScrapeOutput {
            hotspot: None,
            url: None,
            record: parse(&raw),
        });
    }

    let (hotspot, url) = match (&args.hotspot, &args.url) {
        (Some(id), _) => {
            let id = HotspotId::new(id)?;
            let url = hotspot_url(&id);
            (Some(id), url)
        }
        (None, Some(url)) => (None, url.clone()),
        (None, None) => anyhow::bail!("provide --file, --url or --hotspot"),
    };

    let fetch = FetchSettings {
        mode: if args.browser {
            FetchMode::Browser
        } else {
            FetchMode::Http
        },
        max_wait_ms: args.max_wait_ms,
        webdriver_url: args.webdriver_url.clone(),
        ..Default::default()
    };
    let source = source_from_settings(&fetch)?;
    let raw = runtime
        .block_on(source.fetch(&url))
        .with_context(|| format!("fetching {url}"))?;
    tracing::info!(%url, bytes = raw.len(), mode = ?fetch.mode, "scrape.fetched");

    Ok(ScrapeOutput {
        hotspot,
        url: Some(url),
        record: parse(&raw),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use std::path::PathBuf;
    use std::time::Duration;

    fn args(file: Option<PathBuf>) -> ScrapeArgs {
        ScrapeArgs {
            file,
            url: None,
            hotspot: None,
            browser: false,
            max_wait_ms: 8000,
            webdriver_url: "http://localhost:9515".into(),
            compact: true,
        }
    }

    #[test]
    fn file_mode_prints_bare_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.html");
        std::fs::write(
            &path,
            r#"{"label":"Proof Of Coverage","value":"12.5"},{"label":"Data Transfer","value":"3.25"}"#,
        )
        .unwrap();

        let runtime = HotspotRuntime::build("scrape-test", Some(1)).unwrap();
        let out: Value = serde_json::from_str(&run(&runtime, &args(Some(path)))).unwrap();
        runtime.shutdown(Duration::from_millis(10));

        assert_eq!(out["tokens_earned_30d_hnt"], json!(15.75));
        assert_eq!(out["hnt_source"], json!("sum"));
        assert!(out.get("hotspot").is_none());
        assert!(out.get("url").is_none());
        assert_eq!(out.as_object().unwrap().len(), 10);
    }

    #[test]
    fn failures_become_error_json() {
        let runtime = HotspotRuntime::build("scrape-test", Some(1)).unwrap();
        let missing = PathBuf::from("/definitely/not/here.html");
        let out: Value = serde_json::from_str(&run(&runtime, &args(Some(missing)))).unwrap();
        assert!(out["error"].as_str().unwrap().contains("cannot read"));

        let mut bad_id = args(None);
        bad_id.hotspot = Some("12ab".into());
        let out: Value = serde_json::from_str(&run(&runtime, &bad_id)).unwrap();
        assert!(out["error"].as_str().unwrap().contains("12ab"));
        runtime.shutdown(Duration::from_millis(10));
    }

    #[test]
    fn pretty_output_is_multiline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.html");
        std::fs::write(&path, "").unwrap();
        let mut a = args(Some(path));
        a.compact = false;

        let runtime = HotspotRuntime::build("scrape-test", Some(1)).unwrap();
        let text = run(&runtime, &a);
        runtime.shutdown(Duration::from_millis(10));
        assert!(text.contains("\n  \"hnt_source\": \"none\""));
    }
}

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "hotspot", version, about = "Helium mobile hotspot statistics scraper")]
pub struct Cli {
    /// Write log files as JSON lines.
    #[arg(long, global = true)]
    pub json_logs: bool,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract one page and print the record as JSON.
    Scrape(ScrapeArgs),
    /// Refresh configured hotspots on an interval, one JSON line per refresh.
    Watch(WatchArgs),
}

#[derive(Debug, Args)]
#[command(group(
    clap::ArgGroup::new("input")
        .required(true)
        .args(["file", "url", "hotspot"])
))]
pub struct ScrapeArgs {
    /// Saved page HTML.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Page URL to fetch.
    #[arg(long)]
    pub url: Option<String>,
    /// Hotspot identifier; the public statistics page is fetched.
    #[arg(long)]
    pub hotspot: Option<String>,
    /// Render the page in a WebDriver-controlled browser instead of a plain GET.
    #[arg(long)]
    pub browser: bool,
    /// Longest time to poll the rendered page for its payload.
    #[arg(long, default_value_t = hotspot_common::DEFAULT_BROWSER_MAX_WAIT_MS)]
    pub max_wait_ms: u64,
    #[arg(long, env = "HOTSPOT_WEBDRIVER_URL", default_value = "http://localhost:9515")]
    pub webdriver_url: String,
    /// Single-line JSON.
    #[arg(long)]
    pub compact: bool,
}

#[derive(Debug, Args)]
pub struct WatchArgs {
    /// Settings file; defaults to `<config dir>/hotspot/hotspot.yaml` when present.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Comma-separated hotspot identifiers, overriding the settings file.
    #[arg(long)]
    pub hotspots: Option<String>,
    #[arg(long)]
    pub interval_minutes: Option<i64>,
    #[arg(long)]
    pub browser: bool,
    /// Print per-field readings instead of whole reports.
    #[arg(long)]
    pub readings: bool,
}

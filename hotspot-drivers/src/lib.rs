//! Browser rendering for hotspot pages.
//!
//! Some statistics pages only carry their payload after client-side
//! streaming has run. This crate drives a WebDriver endpoint (Chromedriver by
//! default) to load such a page and read its source once the payload shows up.
//!
//! - [`BrowserRenderer`]: one WebDriver session per render, always closed
//! - [`poll_for_markers`]: re-read the source until a readiness marker appears
//! - [`has_readiness_marker`]: the marker check on its own
mod poll;
mod renderer;

pub use poll::{has_readiness_marker, poll_for_markers};
pub use renderer::{BrowserOptions, BrowserRenderer, DEFAULT_WEBDRIVER_URL};

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("could not start a WebDriver session: {0}")]
    Session(String),
    #[error("navigation did not finish within {0:?}")]
    NavigationTimeout(Duration),
    #[error("WebDriver command failed: {0}")]
    Command(#[from] fantoccini::error::CmdError),
}

use crate::poll::poll_for_markers;
use crate::BrowserError;
use fantoccini::{Client, ClientBuilder};
use hotspot_common::{BROWSER_POLL_STEP_MS, DEFAULT_BROWSER_MAX_WAIT_MS, USER_AGENT};
use serde_json::json;
use std::time::Duration;
use webdriver::capabilities::Capabilities;

pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

const NAVIGATION_TIMEOUT: Duration = Duration::from_secs(30);
const SCROLL_ROUNDS: usize = 4;
const SCROLL_PAUSE: Duration = Duration::from_millis(200);
const SCROLL_SCRIPT: &str = "window.scrollBy(0, 1000);";

/// Settings for one render session.
#[derive(Clone, Debug)]
pub struct BrowserOptions {
    pub webdriver_url: String,
    pub headless: bool,
    pub max_wait: Duration,
    pub poll_step: Duration,
}

impl Default for BrowserOptions {
    fn default() -> Self {
        Self {
            webdriver_url: DEFAULT_WEBDRIVER_URL.to_string(),
            headless: true,
            max_wait: Duration::from_millis(DEFAULT_BROWSER_MAX_WAIT_MS),
            poll_step: Duration::from_millis(BROWSER_POLL_STEP_MS),
        }
    }
}

/// Renders hotspot pages in a WebDriver-controlled Chrome so streamed
/// payload chunks land in the page source before it is read.
///
/// Each [`render`](Self::render) opens its own session and closes it before
/// returning, so one renderer can be shared between concurrent fetches.
#[derive(Clone, Debug, Default)]
pub struct BrowserRenderer {
    pub options: BrowserOptions,
}

impl BrowserRenderer {
    pub fn new(options: BrowserOptions) -> Self {
        Self { options }
    }

    /// Load `url`, nudge lazy content by scrolling, then poll the source for
    /// the statistics payload. Returns the last source read.
    pub async fn render(&self, url: &str) -> Result<String, BrowserError> {
        let client = self.connect().await?;
        let result = self.load(&client, url).await;
        if let Err(err) = client.close().await {
            tracing::warn!(message = %err, "browser.close_failed");
        }
        result
    }

    async fn connect(&self) -> Result<Client, BrowserError> {
        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({ "args": chrome_args(self.options.headless) }),
        );
        tracing::debug!(
            webdriver = %self.options.webdriver_url,
            headless = self.options.headless,
            "browser.connect"
        );
        ClientBuilder::native()
            .capabilities(caps)
            .connect(&self.options.webdriver_url)
            .await
            .map_err(|e| BrowserError::Session(e.to_string()))
    }

    async fn load(&self, client: &Client, url: &str) -> Result<String, BrowserError> {
        tokio::time::timeout(NAVIGATION_TIMEOUT, client.goto(url))
            .await
            .map_err(|_| BrowserError::NavigationTimeout(NAVIGATION_TIMEOUT))??;

        for _ in 0..SCROLL_ROUNDS {
            client.execute(SCROLL_SCRIPT, vec![]).await?;
            tokio::time::sleep(SCROLL_PAUSE).await;
        }

        let html = poll_for_markers(
            || client.source(),
            self.options.max_wait,
            self.options.poll_step,
        )
        .await?;
        tracing::debug!(%url, bytes = html.len(), "browser.rendered");
        Ok(html)
    }
}

fn chrome_args(headless: bool) -> Vec<String> {
    let mut args = vec![
        format!("--user-agent={USER_AGENT}"),
        "--window-size=1366,900".to_string(),
        "--disable-dev-shm-usage".to_string(),
        "--no-sandbox".to_string(),
    ];
    if headless {
        args.push("--headless=new".to_string());
        args.push("--disable-gpu".to_string());
    }
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_adds_flags() {
        let args = chrome_args(true);
        assert!(args.iter().any(|a| a == "--headless=new"));
        assert!(args[0].starts_with("--user-agent=Mozilla/5.0"));
        assert!(!chrome_args(false).iter().any(|a| a.starts_with("--headless")));
    }

    #[test]
    fn defaults_match_page_timing() {
        let opts = BrowserOptions::default();
        assert_eq!(opts.max_wait, Duration::from_millis(8000));
        assert_eq!(opts.poll_step, Duration::from_millis(400));
        assert_eq!(opts.webdriver_url, "http://localhost:9515");
        assert!(opts.headless);
    }
}

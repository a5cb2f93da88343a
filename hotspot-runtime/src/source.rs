//! Where raw hotspot pages come from.
use async_trait::async_trait;
use hotspot_common::FetchMode;
use hotspot_config::FetchSettings;
use hotspot_drivers::{BrowserError, BrowserOptions, BrowserRenderer};
use hotspot_http::{HttpClient, HttpError, RequestOpts};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error(transparent)]
    Browser(#[from] BrowserError),
    #[error("{0}")]
    Other(String),
}

/// Anything that can turn a page URL into its raw text.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl PageSource for HttpClient {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.get_text(url, RequestOpts::default()).await?)
    }
}

#[async_trait]
impl PageSource for BrowserRenderer {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        Ok(self.render(url).await?)
    }
}

/// Build the page source `fetch` asks for.
pub fn source_from_settings(fetch: &FetchSettings) -> Result<Arc<dyn PageSource>, FetchError> {
    Ok(match fetch.mode {
        FetchMode::Http => Arc::new(HttpClient::new()?.with_timeout(fetch.timeout())),
        FetchMode::Browser => Arc::new(BrowserRenderer::new(BrowserOptions {
            webdriver_url: fetch.webdriver_url.clone(),
            headless: fetch.headless,
            max_wait: fetch.max_wait(),
            ..Default::default()
        })),
    })
}

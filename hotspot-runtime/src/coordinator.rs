//! Periodic fetch-and-parse of every configured hotspot.
//!
//! A refresh fetches all pages concurrently and only publishes when every
//! fetch succeeded. The published [`Snapshot`] replaces the previous one
//! wholesale; a failed refresh leaves the previous snapshot in place and the
//! next tick tries again from scratch.
use crate::source::{FetchError, PageSource};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use hotspot_common::{HOTSPOT_URL_BASE, HotspotId, MIN_UPDATE_INTERVAL_MINUTES};
use hotspot_extract::{HotspotReport, parse};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::watch;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum RefreshError {
    #[error("update failed: {0}")]
    UpdateFailed(String),
}

/// Reports from one successful refresh, keyed by hotspot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub reports: HashMap<HotspotId, HotspotReport>,
    pub updated_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn report(&self, hotspot: &HotspotId) -> Option<&HotspotReport> {
        self.reports.get(hotspot)
    }
}

/// Latest snapshot, `None` until the first refresh succeeds.
pub type SnapshotRx = watch::Receiver<Option<Arc<Snapshot>>>;

pub struct Coordinator {
    hotspots: Vec<HotspotId>,
    interval: Duration,
    source: Arc<dyn PageSource>,
    url_base: String,
    latest: watch::Sender<Option<Arc<Snapshot>>>,
}

impl Coordinator {
    /// A zero `interval` is replaced by the shortest configurable one.
    pub fn new(hotspots: Vec<HotspotId>, interval: Duration, source: Arc<dyn PageSource>) -> Self {
        let (latest, _) = watch::channel(None);
        let interval = if interval.is_zero() {
            Duration::from_secs(MIN_UPDATE_INTERVAL_MINUTES * 60)
        } else {
            interval
        };
        Self {
            hotspots,
            interval,
            source,
            url_base: HOTSPOT_URL_BASE.to_string(),
            latest,
        }
    }

    /// Fetch `<url_base><id>` instead of the public statistics page.
    pub fn with_url_base(mut self, url_base: impl Into<String>) -> Self {
        self.url_base = url_base.into();
        self
    }

    pub fn hotspots(&self) -> &[HotspotId] {
        &self.hotspots
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn subscribe(&self) -> SnapshotRx {
        self.latest.subscribe()
    }

    pub fn snapshot(&self) -> Option<Arc<Snapshot>> {
        self.latest.borrow().clone()
    }

    /// Fetch and parse every hotspot; publish only if all of them succeeded.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, RefreshError> {
        let started = std::time::Instant::now();
        let fetches = self.hotspots.iter().map(|id| self.fetch_one(id));
        let reports = match try_join_all(fetches).await {
            Ok(reports) => reports,
            Err(err) => {
                tracing::warn!(
                    hotspots = self.hotspots.len(),
                    error = %err,
                    "coordinator.refresh.failed"
                );
                return Err(RefreshError::UpdateFailed(err.to_string()));
            }
        };

        let snapshot = Arc::new(Snapshot {
            reports: reports
                .into_iter()
                .map(|r| (r.hotspot.clone(), r))
                .collect(),
            updated_at: Utc::now(),
        });
        self.latest.send_replace(Some(snapshot.clone()));
        tracing::info!(
            hotspots = snapshot.reports.len(),
            duration_ms = started.elapsed().as_millis() as u64,
            "coordinator.refresh.ok"
        );
        Ok(snapshot)
    }

    async fn fetch_one(&self, id: &HotspotId) -> Result<HotspotReport, FetchError> {
        let url = format!("{}{id}", self.url_base);
        let raw = self.source.fetch(&url).await?;
        let record = parse(&raw);
        tracing::debug!(
            hotspot = %id,
            name = ?record.hotspot_name,
            location = ?record.hotspot_location,
            "coordinator.hotspot.parsed"
        );
        Ok(HotspotReport {
            hotspot: id.clone(),
            url,
            record,
        })
    }

    /// Refresh on every tick until `cancel` fires. The first tick is
    /// immediate unless a snapshot has already been published.
    pub async fn run(&self, cancel: CancellationToken) {
        let start = if self.latest.borrow().is_some() {
            Instant::now() + self.interval
        } else {
            Instant::now()
        };
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("coordinator.stopped");
                    return;
                }
                _ = ticker.tick() => {
                    // failures are logged inside; the next tick retries
                    let _ = self.refresh().await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Serves canned pages; URLs ending in a listed id fail.
    struct Canned {
        failing: Mutex<Vec<String>>,
        calls: AtomicUsize,
    }

    impl Canned {
        fn new() -> Self {
            Self {
                failing: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn fail(&self, id: &str) {
            self.failing.lock().unwrap().push(id.to_string());
        }

        fn heal(&self) {
            self.failing.lock().unwrap().clear();
        }
    }

    #[async_trait]
    impl PageSource for Canned {
        async fn fetch(&self, url: &str) -> Result<String, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.lock().unwrap().iter().any(|id| url.ends_with(id.as_str())) {
                return Err(FetchError::Other(format!("boom {url}")));
            }
            let n = self.calls.load(Ordering::SeqCst);
            Ok(format!(
                r#"{{"label":"Proof Of Coverage","value":"{n}"}},{{"label":"Data Transfer","value":"1"}}"#
            ))
        }
    }

    fn ids(raw: &[&str]) -> Vec<HotspotId> {
        raw.iter().map(|s| HotspotId::new(s).unwrap()).collect()
    }

    #[tokio::test]
    async fn refresh_publishes_every_hotspot() {
        let source = Arc::new(Canned::new());
        let coord = Coordinator::new(ids(&["1", "2"]), Duration::from_secs(60), source.clone());
        let mut rx = coord.subscribe();
        assert!(rx.borrow().is_none());

        let snap = coord.refresh().await.unwrap();
        assert_eq!(snap.reports.len(), 2);
        let one = snap.report(&HotspotId::new("1").unwrap()).unwrap();
        assert_eq!(one.url, "https://world.helium.com/en/network/mobile/hotspot/1");
        assert_eq!(one.record.data_transfer_30d, Some(1.0));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_deref(), Some(&*snap));
    }

    #[tokio::test]
    async fn one_failure_fails_the_cycle_and_keeps_previous_snapshot() {
        let source = Arc::new(Canned::new());
        let coord = Coordinator::new(ids(&["1", "2"]), Duration::from_secs(60), source.clone());
        let first = coord.refresh().await.unwrap();

        source.fail("2");
        let err = coord.refresh().await.unwrap_err();
        assert!(matches!(err, RefreshError::UpdateFailed(ref m) if m.contains("boom")));
        assert_eq!(coord.snapshot().as_deref(), Some(&*first));

        source.heal();
        let third = coord.refresh().await.unwrap();
        assert!(third.updated_at >= first.updated_at);
        assert_ne!(
            third.reports[&HotspotId::new("1").unwrap()],
            first.reports[&HotspotId::new("1").unwrap()]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn run_refreshes_immediately_then_per_interval() {
        let source = Arc::new(Canned::new());
        let coord = Arc::new(Coordinator::new(ids(&["7"]), Duration::from_secs(300), source.clone()));
        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let coord = coord.clone();
            let cancel = cancel.clone();
            async move { coord.run(cancel).await }
        });

        let mut rx = coord.subscribe();
        rx.changed().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(299)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        rx.changed().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_falls_back_to_the_minimum() {
        let source = Arc::new(Canned::new());
        let coord = Arc::new(Coordinator::new(ids(&["7"]), Duration::ZERO, source.clone()));
        assert_eq!(coord.interval(), Duration::from_secs(5 * 60));

        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let coord = coord.clone();
            let cancel = cancel.clone();
            async move { coord.run(cancel).await }
        });
        let mut rx = coord.subscribe();
        rx.changed().await.unwrap();
        tokio::time::sleep(Duration::from_secs(5 * 60 + 1)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        cancel.cancel();
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn run_skips_first_tick_when_already_refreshed() {
        let source = Arc::new(Canned::new());
        let coord = Arc::new(Coordinator::new(ids(&["7"]), Duration::from_secs(300), source.clone()));
        coord.refresh().await.unwrap();

        let cancel = CancellationToken::new();
        let task = tokio::spawn({
            let coord = coord.clone();
            let cancel = cancel.clone();
            async move { coord.run(cancel).await }
        });
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        cancel.cancel();
        task.await.unwrap();
    }
}

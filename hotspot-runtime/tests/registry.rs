use async_trait::async_trait;
use hotspot_common::{FetchMode, HotspotId};
use hotspot_config::{FetchSettings, Settings};
use hotspot_runtime::{FetchError, PageSource, RefreshError, registry};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Serves a fixed page unless told to fail.
#[derive(Default)]
struct Fixed {
    down: AtomicBool,
    calls: AtomicUsize,
}

#[async_trait]
impl PageSource for Fixed {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        if self.down.load(Ordering::SeqCst) {
            return Err(FetchError::Other(format!("{url} unreachable")));
        }
        Ok(r#"<meta property="og:description" content="Avg Daily Stats | 2.0 MB | 10 users">"#.into())
    }
}

fn settings(ids: &[&str]) -> Settings {
    Settings {
        hotspots: ids.iter().map(|s| HotspotId::new(s).unwrap()).collect(),
        update_interval: Duration::from_secs(3600),
        fetch: FetchSettings {
            mode: FetchMode::Http,
            ..Default::default()
        },
    }
}

#[tokio::test]
async fn setup_publishes_first_snapshot_and_unload_forgets() {
    let source = Arc::new(Fixed::default());
    let rx = registry::setup_entry("reg-a", &settings(&["1", "2"]), source.clone())
        .await
        .unwrap();

    let snap = rx.borrow().clone().unwrap();
    assert_eq!(snap.reports.len(), 2);
    let one = snap.report(&HotspotId::new("1").unwrap()).unwrap();
    assert_eq!(one.record.avg_daily_users.as_deref(), Some("10"));

    assert!(registry::entry("reg-a").is_some());
    assert!(registry::entry_ids().contains(&"reg-a".to_string()));

    assert!(registry::unload_entry("reg-a").await);
    assert!(registry::entry("reg-a").is_none());
    assert!(!registry::unload_entry("reg-a").await);
}

#[tokio::test]
async fn failed_first_refresh_registers_nothing() {
    let source = Arc::new(Fixed::default());
    source.down.store(true, Ordering::SeqCst);

    let err = registry::setup_entry("reg-b", &settings(&["3"]), source)
        .await
        .unwrap_err();
    assert!(matches!(err, RefreshError::UpdateFailed(ref m) if m.contains("unreachable")));
    assert!(registry::entry("reg-b").is_none());
}

#[tokio::test]
async fn request_refresh_runs_outside_the_schedule() {
    let source = Arc::new(Fixed::default());
    let mut rx = registry::setup_entry("reg-c", &settings(&["4"]), source.clone())
        .await
        .unwrap();
    rx.borrow_and_update();
    assert_eq!(source.calls.load(Ordering::SeqCst), 1);

    registry::request_refresh("reg-c").await.unwrap().unwrap();
    assert_eq!(source.calls.load(Ordering::SeqCst), 2);
    assert!(rx.has_changed().unwrap());
    rx.borrow_and_update();

    source.down.store(true, Ordering::SeqCst);
    let failed = registry::request_refresh("reg-c").await.unwrap();
    assert!(failed.is_err());
    assert!(!rx.has_changed().unwrap_or(true));

    assert!(registry::request_refresh("reg-missing").await.is_none());
    registry::unload_entry("reg-c").await;
}

#[tokio::test]
async fn setup_again_replaces_the_running_entry() {
    let first = Arc::new(Fixed::default());
    registry::setup_entry("reg-d", &settings(&["5"]), first.clone())
        .await
        .unwrap();

    let second = Arc::new(Fixed::default());
    let rx = registry::setup_entry("reg-d", &settings(&["6", "7"]), second.clone())
        .await
        .unwrap();
    assert_eq!(rx.borrow().as_ref().unwrap().reports.len(), 2);

    registry::request_refresh("reg-d").await.unwrap().unwrap();
    assert_eq!(first.calls.load(Ordering::SeqCst), 1);
    assert_eq!(second.calls.load(Ordering::SeqCst), 4);

    registry::unload_entry("reg-d").await;
}

#[tokio::test(start_paused = true)]
async fn concurrent_setups_leave_one_running_loop() {
    let a = Arc::new(Fixed::default());
    let b = Arc::new(Fixed::default());
    let settings_a = settings(&["8"]);
    let settings_b = settings(&["9"]);
    let (ra, rb) = tokio::join!(
        registry::setup_entry("reg-e", &settings_a, a.clone()),
        registry::setup_entry("reg-e", &settings_b, b.clone()),
    );
    ra.unwrap();
    rb.unwrap();
    assert_eq!(a.calls.load(Ordering::SeqCst), 1);
    assert_eq!(b.calls.load(Ordering::SeqCst), 1);

    assert!(registry::unload_entry("reg-e").await);
    tokio::time::sleep(Duration::from_secs(3 * 3600 + 1)).await;
    assert_eq!(a.calls.load(Ordering::SeqCst), 1);
    assert_eq!(b.calls.load(Ordering::SeqCst), 1);
}

//! Process-wide table of running coordinators, keyed by entry id.
//!
//! [`setup_entry`] performs the first refresh before anything is registered,
//! so an entry either starts with data or does not start at all.
//! [`unload_entry`] stops the refresh loop and forgets the entry.
use crate::coordinator::{Coordinator, RefreshError, SnapshotRx};
use crate::source::PageSource;
use dashmap::DashMap;
use hotspot_config::Settings;
use std::sync::{Arc, OnceLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

struct Entry {
    coordinator: Arc<Coordinator>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

static ENTRIES: OnceLock<DashMap<String, Entry>> = OnceLock::new();

fn entries() -> &'static DashMap<String, Entry> {
    ENTRIES.get_or_init(DashMap::new)
}

/// Start a coordinator for `entry_id`, replacing any entry already running
/// under that id. Must be called from within a tokio runtime.
pub async fn setup_entry(
    entry_id: &str,
    settings: &Settings,
    source: Arc<dyn PageSource>,
) -> Result<SnapshotRx, RefreshError> {
    unload_entry(entry_id).await;

    let coordinator = Arc::new(Coordinator::new(
        settings.hotspots.clone(),
        settings.update_interval,
        source,
    ));
    coordinator.refresh().await?;

    let cancel = CancellationToken::new();
    let task = tokio::spawn({
        let coordinator = coordinator.clone();
        let cancel = cancel.clone();
        async move { coordinator.run(cancel).await }
    });
    let rx = coordinator.subscribe();
    let displaced = entries().insert(
        entry_id.to_string(),
        Entry {
            coordinator,
            cancel,
            task,
        },
    );
    // a concurrent setup for the same id got here first
    if let Some(old) = displaced {
        stop(entry_id, old).await;
    }
    tracing::info!(
        entry = entry_id,
        hotspots = settings.hotspots.len(),
        interval_secs = settings.update_interval.as_secs(),
        "registry.entry.setup"
    );
    Ok(rx)
}

/// Stop and remove `entry_id`; false if it was not registered.
pub async fn unload_entry(entry_id: &str) -> bool {
    let Some((_, entry)) = entries().remove(entry_id) else {
        return false;
    };
    stop(entry_id, entry).await;
    tracing::info!(entry = entry_id, "registry.entry.unloaded");
    true
}

async fn stop(entry_id: &str, entry: Entry) {
    entry.cancel.cancel();
    if let Err(err) = entry.task.await {
        tracing::warn!(entry = entry_id, error = %err, "registry.entry.join_failed");
    }
}

/// Snapshot receiver for a running entry.
pub fn entry(entry_id: &str) -> Option<SnapshotRx> {
    entries().get(entry_id).map(|e| e.coordinator.subscribe())
}

/// Ask a running entry to refresh now, outside its schedule.
pub async fn request_refresh(entry_id: &str) -> Option<Result<(), RefreshError>> {
    let coordinator = entries().get(entry_id).map(|e| e.coordinator.clone())?;
    Some(coordinator.refresh().await.map(|_| ()))
}

pub fn entry_ids() -> Vec<String> {
    entries().iter().map(|e| e.key().clone()).collect()
}

//! Scheduling side of the scraper: page sources, the refresh coordinator and
//! the process-wide entry registry, plus a tokio runtime wrapper for binaries
//! that are not async at the top.
//!
//! - [`PageSource`]: HTTP or browser fetch behind one trait
//! - [`Coordinator`]: all-or-nothing concurrent refresh on an interval
//! - [`registry`]: `setup_entry` / `unload_entry` / `entry`
//! - [`readings`]: one reading per extracted field, for display
pub mod coordinator;
pub mod readings;
pub mod registry;
pub mod source;

pub use coordinator::{Coordinator, RefreshError, Snapshot, SnapshotRx};
pub use source::{FetchError, PageSource, source_from_settings};

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Clone)]
pub struct HotspotHandle {
    inner: Handle,
    cancel: Arc<CancellationToken>,
}

pub struct HotspotRuntime {
    runtime: Runtime,
    cancel: Arc<CancellationToken>,
}

impl HotspotRuntime {
    /// Build a multi-thread runtime with a shared cancellation token.
    ///
    /// ```
    /// use hotspot_runtime::HotspotRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = HotspotRuntime::build("doctest-runtime", Some(1))
    ///     .expect("runtime builds");
    /// let value = runtime.block_on(async { 2 + 2 });
    /// assert_eq!(value, 4);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn build(thread_name: &str, worker_threads: Option<usize>) -> Result<Self> {
        let mut builder = Builder::new_multi_thread();
        builder.enable_all().thread_name(thread_name);

        if let Some(workers) = worker_threads {
            builder.worker_threads(workers.max(1));
        }

        let runtime = builder.build()?;
        let cancel = Arc::new(CancellationToken::new());
        Ok(Self { runtime, cancel })
    }

    pub fn handle(&self) -> HotspotHandle {
        HotspotHandle {
            inner: self.runtime.handle().clone(),
            cancel: self.cancel.clone(),
        }
    }

    pub fn block_on<F: std::future::Future>(&self, fut: F) -> F::Output {
        self.runtime.block_on(fut)
    }

    /// Cancel outstanding work and give tasks `graceful` to finish.
    pub fn shutdown(self, graceful: Duration) {
        self.cancel.cancel();
        self.runtime.shutdown_timeout(graceful);
    }
}

impl HotspotHandle {
    /// Spawn a future onto the shared runtime.
    ///
    /// ```
    /// use hotspot_runtime::HotspotRuntime;
    /// use std::time::Duration;
    ///
    /// let runtime = HotspotRuntime::build("handle-doctest", Some(1)).unwrap();
    /// let handle = runtime.handle();
    /// let task = handle.spawn(async { 21 * 2 });
    /// let result = runtime.block_on(async move { task.await.unwrap() });
    /// assert_eq!(result, 42);
    /// runtime.shutdown(Duration::from_millis(10));
    /// ```
    pub fn spawn<F, T>(&self, fut: F) -> JoinHandle<T>
    where
        F: std::future::Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        self.inner.spawn(fut)
    }

    /// Token cancelled by [`HotspotRuntime::shutdown`]; child tokens stop with it.
    pub fn cancellation(&self) -> Arc<CancellationToken> {
        self.cancel.clone()
    }
}

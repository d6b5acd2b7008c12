//! Telemetry feed runtime.
//!
//! The store only needs something to call `ingest_json`; this module owns a
//! small tokio runtime running one ingest task (live websocket feed or a
//! file replay) with a broadcast shutdown signal.

mod replay;
mod ws;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use url::Url;

use crate::core::telemetry::TelemetryStore;
use crate::Result;

pub use replay::read_snapshot_lines;

/// Wrapper around the tokio runtime driving the snapshot feed.
pub struct FeedRuntime {
    shutdown_tx: broadcast::Sender<()>,
    _runtime: tokio::runtime::Runtime,
}

impl FeedRuntime {
    /// Connect to a live websocket feed and pump every text frame into the
    /// store. Reconnects with a fixed delay on connection loss.
    pub fn websocket(store: Arc<TelemetryStore>, url: Url) -> Result<Self> {
        let (runtime, shutdown_tx) = build_runtime()?;
        let shutdown = shutdown_tx.subscribe();
        runtime.spawn(ws::feed_task(store, url, shutdown));
        Ok(Self {
            shutdown_tx,
            _runtime: runtime,
        })
    }

    /// Replay newline-delimited snapshot JSON from a file, one line per
    /// interval tick.
    pub fn replay(store: Arc<TelemetryStore>, path: PathBuf, interval: Duration) -> Result<Self> {
        let (runtime, shutdown_tx) = build_runtime()?;
        let shutdown = shutdown_tx.subscribe();
        runtime.spawn(replay::replay_task(store, path, interval, shutdown));
        Ok(Self {
            shutdown_tx,
            _runtime: runtime,
        })
    }

    /// Stop the ingest task; the runtime shuts down when dropped.
    pub fn shutdown(self) {
        let _ = self.shutdown_tx.send(());
    }
}

fn build_runtime() -> Result<(tokio::runtime::Runtime, broadcast::Sender<()>)> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .thread_name("feed-worker")
        .build()?;
    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    Ok((runtime, shutdown_tx))
}

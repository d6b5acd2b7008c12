use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;

use crate::core::telemetry::TelemetryStore;
use crate::Result;

/// Read a replay file: one snapshot message per non-empty line.
pub fn read_snapshot_lines(path: &Path) -> Result<Vec<String>> {
    let contents = fs::read_to_string(path)?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// Feed one recorded snapshot per interval tick, then idle on the last
/// committed state until shutdown.
pub(super) async fn replay_task(
    store: Arc<TelemetryStore>,
    path: PathBuf,
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let lines = match read_snapshot_lines(&path) {
        Ok(lines) => lines,
        Err(e) => {
            log::error!("Cannot read replay file {}: {}", path.display(), e);
            return;
        }
    };
    log::info!(
        "Replaying {} snapshots from {}",
        lines.len(),
        path.display()
    );

    let mut ticker = tokio::time::interval(interval);
    for line in &lines {
        tokio::select! {
            _ = shutdown.recv() => return,
            _ = ticker.tick() => store.ingest_json(line),
        }
    }
    log::info!("Replay finished");
}

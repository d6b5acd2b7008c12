use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use chrono::{DateTime, Utc};
use parking_lot::{ReentrantMutex, RwLock};

use super::key;
use super::message::{ContainerStats, Envelope, HostMetrics, Snapshot, Sparklines};

/// Per-host container counts derived from the stats map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ContainerCounts {
    pub total: usize,
    pub running: usize,
    pub stopped: usize,
}

type Callback = Arc<dyn Fn() + Send + Sync>;

struct Subscriber {
    id: u64,
    cancelled: Arc<AtomicBool>,
    /// Held across each invocation; `cancel` acquires it too, so cancelling
    /// from another thread waits out an in-flight callback.
    gate: Arc<ReentrantMutex<()>>,
    callback: Callback,
}

/// Cancellation capability returned by [`TelemetryStore::subscribe`].
///
/// `cancel` is idempotent; after it returns, the callback will not be
/// invoked again, even when a snapshot is mid-flight on another thread.
/// Dropping the subscription cancels it.
pub struct Subscription {
    id: u64,
    cancelled: Arc<AtomicBool>,
    gate: Arc<ReentrantMutex<()>>,
    subscribers: Weak<RwLock<Vec<Subscriber>>>,
}

impl Subscription {
    pub fn cancel(&self) {
        // The gate blocks until an invocation running on another thread has
        // finished; it is reentrant so a callback may cancel itself.
        let _guard = self.gate.lock();
        if !self.cancelled.swap(true, Ordering::SeqCst) {
            if let Some(subscribers) = self.subscribers.upgrade() {
                let id = self.id;
                subscribers.write().retain(|s| s.id != id);
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Default)]
struct StoreState {
    /// Containers in snapshot order, each paired with its composite key.
    containers: Vec<(String, ContainerStats)>,
    /// Composite key -> index into `containers`.
    container_index: HashMap<String, usize>,
    host_metrics: HashMap<String, HostMetrics>,
    host_sparklines: HashMap<String, Sparklines>,
    container_sparklines: HashMap<String, Sparklines>,
    last_update: Option<DateTime<Utc>>,
}

/// Process-wide telemetry store.
///
/// One ingestion point, many readers: snapshots replace the derived maps
/// wholesale (field by field), and every read accessor is a map probe or a
/// bounded scan. Created once at startup and disposed explicitly.
pub struct TelemetryStore {
    state: RwLock<StoreState>,
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
    next_subscriber_id: AtomicU64,
}

impl TelemetryStore {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            subscribers: Arc::new(RwLock::new(Vec::new())),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Ingest one raw message from the feed.
    ///
    /// Never panics and never returns an error to the transport: a malformed
    /// payload is logged and dropped so one bad message cannot take down the
    /// subscription, and prior state stays intact.
    pub fn ingest_json(&self, raw: &str) {
        match Envelope::from_json(raw) {
            Ok(Envelope::ContainersUpdate { data }) => self.ingest(data.into_snapshot()),
            Ok(Envelope::Unknown) => {
                log::debug!("Ignoring message with unknown type tag");
            }
            Err(e) => {
                log::warn!("Dropping malformed snapshot message: {}", e);
            }
        }
    }

    /// Apply one snapshot synchronously.
    ///
    /// Each of the four maps updates independently: an absent field leaves
    /// its map untouched, a present field replaces the whole map. Two
    /// snapshots arriving back-to-back are fine; readers only ever observe
    /// the latest committed state.
    pub fn ingest(&self, snapshot: Snapshot) {
        let received_at = parse_timestamp(snapshot.timestamp.as_deref());

        {
            let mut state = self.state.write();

            if let Some(containers) = snapshot.containers {
                let mut indexed = Vec::with_capacity(containers.len());
                let mut index = HashMap::with_capacity(containers.len());
                for stats in containers {
                    let composite = key::compose(&stats.host_id, &stats.id);
                    index.insert(composite.clone(), indexed.len());
                    indexed.push((composite, stats));
                }
                state.containers = indexed;
                state.container_index = index;
            }

            if let Some(metrics) = snapshot.host_metrics {
                state.host_metrics = metrics;
            }

            if let Some(sparklines) = snapshot.host_sparklines {
                warn_on_emptied_series("host", &state.host_sparklines, &sparklines);
                state.host_sparklines = sparklines;
            }

            if let Some(sparklines) = snapshot.container_sparklines {
                warn_on_emptied_series("container", &state.container_sparklines, &sparklines);
                state.container_sparklines = sparklines;
            }

            state.last_update = Some(received_at);
        }

        self.notify();
    }

    /// Register a callback fired after every committed snapshot.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = self.next_subscriber_id.fetch_add(1, Ordering::Relaxed);
        let cancelled = Arc::new(AtomicBool::new(false));
        let gate = Arc::new(ReentrantMutex::new(()));
        self.subscribers.write().push(Subscriber {
            id,
            cancelled: Arc::clone(&cancelled),
            gate: Arc::clone(&gate),
            callback: Arc::new(callback),
        });
        Subscription {
            id,
            cancelled,
            gate,
            subscribers: Arc::downgrade(&self.subscribers),
        }
    }

    /// Drop all subscribers and derived state, mirroring "unregister" at
    /// application shutdown.
    pub fn dispose(&self) {
        self.subscribers.write().clear();
        *self.state.write() = StoreState::default();
    }

    fn notify(&self) {
        // Snapshot the list so a callback may subscribe or cancel without
        // deadlocking against this iteration. Each invocation runs under its
        // subscriber's gate with the cancelled flag checked inside it, so a
        // `cancel` that has returned cannot be followed by another call.
        let entries: Vec<(Arc<AtomicBool>, Arc<ReentrantMutex<()>>, Callback)> = self
            .subscribers
            .read()
            .iter()
            .map(|s| {
                (
                    Arc::clone(&s.cancelled),
                    Arc::clone(&s.gate),
                    Arc::clone(&s.callback),
                )
            })
            .collect();
        for (cancelled, gate, callback) in entries {
            let _guard = gate.lock();
            if !cancelled.load(Ordering::SeqCst) {
                callback();
            }
        }
    }

    // --- Read accessors -------------------------------------------------
    //
    // All of these return owned clones: consumers never hold a view into
    // the maps, so nothing a reader does can mutate or pin store state.

    pub fn host_metrics(&self, host_id: &str) -> Option<HostMetrics> {
        self.state.read().host_metrics.get(host_id).cloned()
    }

    pub fn host_sparklines(&self, host_id: &str) -> Option<Sparklines> {
        self.state.read().host_sparklines.get(host_id).cloned()
    }

    /// All host ids currently known to the metrics map, sorted.
    pub fn host_ids(&self) -> Vec<String> {
        let state = self.state.read();
        let mut ids: Vec<String> = state.host_metrics.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Composite-key lookup: one map probe.
    pub fn container_stats(&self, host_id: &str, container_id: &str) -> Option<ContainerStats> {
        let composite = key::compose(host_id, container_id);
        let state = self.state.read();
        let idx = *state.container_index.get(&composite)?;
        state.containers.get(idx).map(|(_, stats)| stats.clone())
    }

    /// Sparklines by bare container id.
    ///
    /// Container ids are globally unique but the index is host-scoped, so
    /// this is a deliberate O(n) scan over the sparkline keys.
    pub fn container_sparklines(&self, container_id: &str) -> Option<Sparklines> {
        let state = self.state.read();
        state
            .container_sparklines
            .iter()
            .find(|(k, _)| key::parse(k).is_some_and(|(_, c)| c == container_id))
            .map(|(_, sparklines)| sparklines.clone())
    }

    /// All containers on `host_id`, in snapshot order.
    pub fn list_containers(&self, host_id: &str) -> Vec<ContainerStats> {
        let state = self.state.read();
        state
            .containers
            .iter()
            .filter(|(k, _)| key::has_host_prefix(k, host_id))
            .map(|(_, stats)| stats.clone())
            .collect()
    }

    /// Top `n` containers on `host_id` by CPU, descending.
    ///
    /// The sort is stable so equal CPU values keep their snapshot order.
    pub fn top_containers(&self, host_id: &str, n: usize) -> Vec<ContainerStats> {
        let mut containers = self.list_containers(host_id);
        containers.sort_by(|a, b| {
            b.cpu_percent
                .partial_cmp(&a.cpu_percent)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        containers.truncate(n);
        containers
    }

    /// Running/stopped/total counts for one host.
    ///
    /// States other than `running`, `exited` and `stopped` (paused,
    /// restarting, ...) count toward the total only.
    pub fn container_counts(&self, host_id: &str) -> ContainerCounts {
        let state = self.state.read();
        let mut counts = ContainerCounts::default();
        for (k, stats) in &state.containers {
            if !key::has_host_prefix(k, host_id) {
                continue;
            }
            counts.total += 1;
            match stats.state.as_str() {
                "running" => counts.running += 1,
                "exited" | "stopped" => counts.stopped += 1,
                _ => {}
            }
        }
        counts
    }

    /// Timestamp of the last committed snapshot. Callers compare this to
    /// wall-clock time to infer a stalled feed; the store itself never
    /// declares the feed dead.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.state.read().last_update
    }
}

impl Default for TelemetryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_timestamp(raw: Option<&str>) -> DateTime<Utc> {
    match raw {
        Some(s) => match DateTime::parse_from_rfc3339(s) {
            Ok(ts) => ts.with_timezone(&Utc),
            Err(e) => {
                log::warn!("Snapshot timestamp {:?} unparseable ({}), using receive time", s, e);
                Utc::now()
            }
        },
        None => Utc::now(),
    }
}

/// Diagnostic for upstream data loss: a key whose series were non-empty and
/// arrive empty again while the key itself persists.
fn warn_on_emptied_series(
    scope: &str,
    previous: &HashMap<String, Sparklines>,
    incoming: &HashMap<String, Sparklines>,
) {
    for (k, next) in incoming {
        if let Some(prev) = previous.get(k) {
            if !prev.all_empty() && next.all_empty() {
                log::warn!("Sparklines for {} {} went from populated to empty", scope, k);
            }
        }
    }
}

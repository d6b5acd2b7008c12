use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use fleetmon::core::telemetry::{Snapshot, TelemetryStore};

#[test]
fn callback_fires_per_committed_snapshot() {
    let store = TelemetryStore::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let _subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.ingest(Snapshot::default());
    store.ingest(Snapshot::default());
    assert_eq!(fired.load(Ordering::SeqCst), 2);

    // Messages that never commit do not notify
    store.ingest_json("{broken");
    store.ingest_json(r#"{"type": "other_update", "data": {}}"#);
    assert_eq!(fired.load(Ordering::SeqCst), 2);
}

#[test]
fn cancel_is_idempotent_and_final() {
    let store = TelemetryStore::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    subscription.cancel();
    assert!(subscription.is_cancelled());
    subscription.cancel();
    subscription.cancel();

    store.ingest(Snapshot::default());
    assert_eq!(fired.load(Ordering::SeqCst), 0);
}

#[test]
fn independent_subscribers_do_not_interfere() {
    let store = TelemetryStore::new();
    let first = Arc::new(AtomicUsize::new(0));
    let second = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&first);
    let sub_a = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    let counter = Arc::clone(&second);
    let _sub_b = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.ingest(Snapshot::default());
    sub_a.cancel();
    store.ingest(Snapshot::default());

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 2);
}

#[test]
fn cancel_waits_for_in_flight_callback() {
    let store = Arc::new(TelemetryStore::new());
    let entered = Arc::new(AtomicBool::new(false));
    let release = Arc::new(AtomicBool::new(false));
    let finished = Arc::new(AtomicBool::new(false));

    let entered_cb = Arc::clone(&entered);
    let release_cb = Arc::clone(&release);
    let finished_cb = Arc::clone(&finished);
    let subscription = store.subscribe(move || {
        entered_cb.store(true, Ordering::SeqCst);
        while !release_cb.load(Ordering::SeqCst) {
            thread::sleep(Duration::from_millis(1));
        }
        finished_cb.store(true, Ordering::SeqCst);
    });

    // Ingest on another thread so the callback is mid-flight when the main
    // thread cancels.
    let ingest_store = Arc::clone(&store);
    let ingester = thread::spawn(move || ingest_store.ingest(Snapshot::default()));
    while !entered.load(Ordering::SeqCst) {
        thread::sleep(Duration::from_millis(1));
    }

    let releaser = Arc::clone(&release);
    let unblocker = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        releaser.store(true, Ordering::SeqCst);
    });

    subscription.cancel();
    // cancel must have blocked until the in-flight invocation completed
    assert!(finished.load(Ordering::SeqCst));

    ingester.join().unwrap();
    unblocker.join().unwrap();

    store.ingest(Snapshot::default());
    assert!(subscription.is_cancelled());
}

#[test]
fn callback_may_cancel_its_own_subscription() {
    use parking_lot::Mutex;
    use fleetmon::core::telemetry::Subscription;

    let store = Arc::new(TelemetryStore::new());
    let fired = Arc::new(AtomicUsize::new(0));
    let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

    let counter = Arc::clone(&fired);
    let slot_cb = Arc::clone(&slot);
    let subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        if let Some(subscription) = slot_cb.lock().as_ref() {
            subscription.cancel();
        }
    });
    *slot.lock() = Some(subscription);

    store.ingest(Snapshot::default());
    store.ingest(Snapshot::default());
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[test]
fn dispose_clears_state_and_subscribers() {
    let store = TelemetryStore::new();
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fired);
    let _subscription = store.subscribe(move || {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    store.ingest_json(
        r#"{"type": "containers_update",
            "data": {"host_metrics": {"h1": {"cpu_percent": 5.0}}}}"#,
    );
    assert!(store.host_metrics("h1").is_some());

    store.dispose();
    assert!(store.host_metrics("h1").is_none());
    assert!(store.last_update().is_none());

    store.ingest(Snapshot::default());
    assert_eq!(fired.load(Ordering::SeqCst), 1); // only the pre-dispose ingest
}

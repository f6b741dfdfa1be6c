//! Background eviction sweeper
//!
//! A dedicated thread that periodically evicts traces older than the
//! retention horizon, bounding store size under sustained load. Runs
//! concurrently with every other store operation; the store's per-record
//! atomicity means an update racing a sweep either lands before the
//! record is removed or fails `UnknownTrace`.

use parking_lot::{Condvar, Mutex};
use scantrace_store::TraceStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info};

struct SweeperShared {
    shutdown: AtomicBool,
    // The mutex guards nothing but the condvar's wait slot; the flag
    // carries the actual state
    wake_lock: Mutex<()>,
    wake: Condvar,
}

/// Recurring eviction sweep on its own named thread.
///
/// Shutdown is idempotent and joins the thread; dropping the sweeper
/// shuts it down as well.
pub struct EvictionSweeper {
    shared: Arc<SweeperShared>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl EvictionSweeper {
    /// Spawn the sweeper over `store`.
    ///
    /// Every `interval`, traces whose origin is older than `retention_ms`
    /// are removed.
    pub fn spawn(store: Arc<TraceStore>, retention_ms: i64, interval: Duration) -> Self {
        let shared = Arc::new(SweeperShared {
            shutdown: AtomicBool::new(false),
            wake_lock: Mutex::new(()),
            wake: Condvar::new(),
        });

        let thread_shared = Arc::clone(&shared);
        let handle = std::thread::Builder::new()
            .name("scantrace-sweeper".to_string())
            .spawn(move || sweep_loop(&thread_shared, &store, retention_ms, interval))
            .expect("failed to spawn eviction sweeper thread");

        Self {
            shared,
            handle: Mutex::new(Some(handle)),
        }
    }

    /// Signal the thread to exit and join it. Safe to call repeatedly.
    pub fn shutdown(&self) {
        self.shared.shutdown.store(true, Ordering::Release);

        // Lock before notifying so the thread is either already in
        // wait_for (and wakes) or has not yet checked the flag (and will
        // see it set)
        {
            let _guard = self.shared.wake_lock.lock();
            self.shared.wake.notify_all();
        }

        if let Some(handle) = self.handle.lock().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for EvictionSweeper {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sweep_loop(
    shared: &SweeperShared,
    store: &TraceStore,
    retention_ms: i64,
    interval: Duration,
) {
    debug!(retention_ms, interval_ms = interval.as_millis() as u64, "sweeper started");
    loop {
        {
            let mut guard = shared.wake_lock.lock();
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
            let _ = shared.wake.wait_for(&mut guard, interval);
            if shared.shutdown.load(Ordering::Acquire) {
                break;
            }
        }

        let evicted = store.evict_older_than(retention_ms);
        if evicted > 0 {
            info!(evicted, retained = store.len(), "evicted expired traces");
        }
    }
    debug!("sweeper stopped");
}

//! TraceStore: the sole shared mutable resource
//!
//! Owns the mapping from trace identifier to trace record and provides
//! atomic create/get/update/evict operations.
//!
//! # Design
//!
//! - DashMap: sharded by default, lock-free-ish reads, per-shard writes
//! - Per-record atomicity comes from the shard lock: a `get` clones the
//!   record under that lock, so a reader sees either the old or the new
//!   value of any slot, never a torn mix
//! - Concurrent writes to *different* slots of one trace serialize on the
//!   shard lock and both land
//! - `create` is O(1) amortized and independent of map size
//! - Eviction uses `retain`, which holds the shard lock per record, so an
//!   update arriving for a just-evicted id fails `UnknownTrace` rather
//!   than writing into freed state

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use scantrace_core::error::{Error, Result};
use scantrace_core::{Clock, Stage, StageTimes, Subject, Trace, TraceId};
use std::sync::Arc;
use tracing::debug;

/// Concurrent in-memory store of live traces.
///
/// The store exclusively owns all trace records; callers only ever hold
/// cloned snapshots. Process-local and intentionally non-durable — traces
/// are diagnostic, not transactional, data.
pub struct TraceStore {
    traces: DashMap<TraceId, Trace>,
    clock: Arc<dyn Clock>,
}

impl TraceStore {
    /// Create an empty store stamping timestamps from `clock`
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            traces: DashMap::new(),
            clock,
        }
    }

    /// Access the store's clock
    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    /// Allocate a fresh trace: new random id, `origin` stamped now.
    ///
    /// Returns the id and the origin timestamp.
    ///
    /// # Errors
    ///
    /// `AllocationFailure` if the freshly generated id is already present.
    /// A v4 collision is negligible at any realistic scan volume, but an
    /// overwrite here would corrupt an unrelated trace, so it is detected
    /// and surfaced instead.
    pub fn create(&self, subject: Subject) -> Result<(TraceId, i64)> {
        let id = TraceId::new();
        let origin = self.clock.now_ms();

        match self.traces.entry(id) {
            Entry::Occupied(_) => Err(Error::AllocationFailure(format!(
                "trace id collision: {}",
                id
            ))),
            Entry::Vacant(slot) => {
                slot.insert(Trace {
                    id,
                    subject,
                    stages: StageTimes::at_origin(origin),
                });
                debug!(%id, origin, "trace created");
                Ok((id, origin))
            }
        }
    }

    /// Read-only snapshot of a trace's current state.
    ///
    /// The clone happens under the shard lock — atomic with respect to
    /// concurrent slot writes.
    ///
    /// # Errors
    ///
    /// `UnknownTrace` if the id never existed or was evicted.
    pub fn get(&self, id: TraceId) -> Result<Trace> {
        self.traces
            .get(&id)
            .map(|r| r.value().clone())
            .ok_or(Error::UnknownTrace(id))
    }

    /// Write one post-origin slot in place. Trusted path: no stage-name
    /// policy beyond protecting `origin`, which only `create` writes.
    ///
    /// Last-write-wins on an already-set slot — client retries are
    /// expected to be idempotent resends of the same stage. No ordering
    /// check against sibling slots; ordering anomalies are a read-time
    /// concern handled by the projector.
    ///
    /// # Errors
    ///
    /// - `InvalidStage` for `Stage::Origin`
    /// - `UnknownTrace` if the id is absent or evicted
    pub fn set_stage(&self, id: TraceId, stage: Stage, timestamp_ms: i64) -> Result<()> {
        let mut record = self.traces.get_mut(&id).ok_or(Error::UnknownTrace(id))?;
        match stage {
            Stage::Origin => {
                return Err(Error::InvalidStage(
                    "origin is written only at creation".to_string(),
                ))
            }
            Stage::UpstreamDone => record.stages.upstream_done = Some(timestamp_ms),
            Stage::ClientReceived => record.stages.client_received = Some(timestamp_ms),
            Stage::ClientRendered => record.stages.client_rendered = Some(timestamp_ms),
        }
        debug!(%id, stage = %stage, timestamp_ms, "stage recorded");
        Ok(())
    }

    /// Remove all traces whose `origin` is older than `now - horizon_ms`.
    ///
    /// Returns the number removed, for diagnostics. The count is taken
    /// inside the retain closure so concurrent creates cannot skew it.
    pub fn evict_older_than(&self, horizon_ms: i64) -> usize {
        let cutoff = self.clock.now_ms() - horizon_ms;
        let mut evicted = 0usize;
        self.traces.retain(|_, trace| {
            let keep = trace.stages.origin >= cutoff;
            if !keep {
                evicted += 1;
            }
            keep
        });
        evicted
    }

    /// Number of live traces
    pub fn len(&self) -> usize {
        self.traces.len()
    }

    /// True when no traces are live
    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }
}

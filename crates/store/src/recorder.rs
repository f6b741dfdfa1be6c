//! StageRecorder: the public, validated acknowledgment path
//!
//! Display clients acknowledge `client_received` and `client_rendered`
//! through this recorder. The `upstream_done` mark is NOT acceptable
//! here — it is written by trusted gateway code straight through
//! [`TraceStore::set_stage`], so an external caller cannot forge it.

use crate::store::TraceStore;
use scantrace_core::error::{Error, Result};
use scantrace_core::{Stage, TraceId};
use std::sync::Arc;
use tracing::warn;

/// Validates and applies a named-stage update to an existing trace.
///
/// Stateless facade over the store, holding only an `Arc` reference.
#[derive(Clone)]
pub struct StageRecorder {
    store: Arc<TraceStore>,
}

impl StageRecorder {
    /// Create a recorder over `store`
    pub fn new(store: Arc<TraceStore>) -> Self {
        Self { store }
    }

    /// Record an externally-acknowledgable stage.
    ///
    /// Only `ClientReceived` and `ClientRendered` pass validation.
    /// Successful writes are unconditional last-write-wins; no ordering
    /// check against sibling slots is performed at write time.
    ///
    /// # Errors
    ///
    /// - `InvalidStage` for `Origin` or `UpstreamDone`
    /// - `UnknownTrace` if the id is absent or already evicted
    pub fn record(&self, id: TraceId, stage: Stage, timestamp_ms: i64) -> Result<()> {
        match stage {
            Stage::ClientReceived | Stage::ClientRendered => {}
            other => {
                return Err(Error::InvalidStage(format!(
                    "{} is not externally acknowledgable",
                    other
                )))
            }
        }

        let result = self.store.set_stage(id, stage, timestamp_ms);
        if matches!(result, Err(Error::UnknownTrace(_))) {
            // Most likely a client acknowledging a trace the sweeper
            // already reclaimed; benign, but worth a note
            warn!(%id, stage = %stage, "acknowledgment for unknown trace");
        }
        result
    }

    /// Wire-name front door for collaborators that carry the stage as a
    /// string. An unrecognized name fails with `InvalidStage`.
    pub fn record_by_name(&self, id: TraceId, stage_name: &str, timestamp_ms: i64) -> Result<()> {
        let stage = Stage::parse(stage_name)
            .ok_or_else(|| Error::InvalidStage(stage_name.to_string()))?;
        self.record(id, stage, timestamp_ms)
    }
}

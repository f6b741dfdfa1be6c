//! ScanRegistry: the facade the gateway's collaborators call
//!
//! Maps the four external logical operations onto the store, recorder and
//! projector, and owns the background eviction sweeper:
//!
//! - **Begin** — creates a trace when a scan-forwarding request arrives
//! - **Upstream-done report** — trusted internal mark, stamped right
//!   after the remote RPC returns
//! - **Client ack** — public, validated path for display clients
//! - **Metrics query** — raw stage timestamps plus derived CTQ intervals
//!
//! Transport and framing are the collaborators' concern; everything here
//! is a synchronous in-memory operation.

use crate::config::RegistryConfig;
use crate::sweeper::EvictionSweeper;
use scantrace_core::error::Result;
use scantrace_core::{Clock, Stage, StageTimes, Subject, SystemClock, Trace, TraceId};
use scantrace_store::{project, CtqReport, StageRecorder, TraceStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// The two stages a display client may acknowledge.
///
/// A separate enum rather than [`Stage`] so that forging the internal
/// `upstream_done` mark is unrepresentable at this API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckStage {
    /// The client received the event
    Received,
    /// The client finished rendering the event
    Rendered,
}

impl AckStage {
    /// The underlying stage slot this acknowledgment fills
    pub fn stage(&self) -> Stage {
        match self {
            AckStage::Received => Stage::ClientReceived,
            AckStage::Rendered => Stage::ClientRendered,
        }
    }
}

/// What the gateway hands back to the scan-forwarding handler on begin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BeginReceipt {
    /// The freshly allocated trace identifier
    pub id: TraceId,
    /// The stamped origin timestamp, milliseconds since epoch
    pub origin_ms: i64,
}

/// Metrics-query response: raw timestamps plus the derived intervals.
///
/// Serializes to JSON as-is so the gateway can pass it straight through
/// to dashboards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceMetrics {
    /// Trace identifier
    pub id: TraceId,
    /// Diagnostic payload carried since creation
    pub subject: Subject,
    /// Raw stage timestamps, unset slots included
    pub stages: StageTimes,
    /// Derived CTQ intervals, each possibly unknown
    pub ctq: CtqReport,
}

/// Process-local registry of in-flight scan traces.
///
/// Entry points may be called concurrently from independent
/// request-handling threads; the store underneath is the only shared
/// mutable state. Dropping the registry stops the sweeper.
pub struct ScanRegistry {
    store: Arc<TraceStore>,
    recorder: StageRecorder,
    clock: Arc<dyn Clock>,
    sweeper: Option<EvictionSweeper>,
    retention_ms: i64,
}

impl ScanRegistry {
    /// Open a registry with the system clock.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn open(config: RegistryConfig) -> Result<Self> {
        Self::open_with_clock(config, Arc::new(SystemClock))
    }

    /// Open a registry stamping time from `clock` (tests use a
    /// [`ManualClock`](scantrace_core::ManualClock) here).
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the configuration fails validation.
    pub fn open_with_clock(config: RegistryConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        config.validate()?;

        let store = Arc::new(TraceStore::new(clock.clone()));
        let recorder = StageRecorder::new(store.clone());
        let sweeper = config.sweeper_enabled.then(|| {
            EvictionSweeper::spawn(store.clone(), config.retention_ms(), config.sweep_interval())
        });

        Ok(Self {
            store,
            recorder,
            clock,
            sweeper,
            retention_ms: config.retention_ms(),
        })
    }

    /// Begin a trace for an inbound scan. One call per forwarding request,
    /// after request validation and before the outbound remote call.
    pub fn begin(&self, subject: Subject) -> Result<BeginReceipt> {
        let class = subject.class_code.clone();
        let (id, origin_ms) = self.store.create(subject)?;
        debug!(%id, class = %class, "scan trace begun");
        Ok(BeginReceipt { id, origin_ms })
    }

    /// Mark the remote RPC as done (success or failure), stamped now.
    ///
    /// Trusted internal setter — invoked by gateway code immediately
    /// after the remote call returns, never exposed to display clients.
    ///
    /// # Errors
    ///
    /// `UnknownTrace` if the id is absent or already evicted.
    pub fn upstream_done(&self, id: TraceId) -> Result<i64> {
        let now = self.clock.now_ms();
        self.store.set_stage(id, Stage::UpstreamDone, now)?;
        Ok(now)
    }

    /// Public client acknowledgment, stamped with the registry clock.
    ///
    /// # Errors
    ///
    /// `UnknownTrace` if the id is absent or already evicted.
    pub fn acknowledge(&self, id: TraceId, ack: AckStage) -> Result<()> {
        let now = self.clock.now_ms();
        self.recorder.record(id, ack.stage(), now)
    }

    /// Public client acknowledgment carrying the client's own timestamp.
    ///
    /// Client clocks may be skewed; the projector clamps and flags any
    /// resulting causality anomaly at read time.
    pub fn acknowledge_at(&self, id: TraceId, ack: AckStage, timestamp_ms: i64) -> Result<()> {
        self.recorder.record(id, ack.stage(), timestamp_ms)
    }

    /// Wire-name acknowledgment for collaborators that carry the stage as
    /// a string; unknown names fail `InvalidStage`.
    pub fn acknowledge_by_name(
        &self,
        id: TraceId,
        stage_name: &str,
        timestamp_ms: i64,
    ) -> Result<()> {
        self.recorder.record_by_name(id, stage_name, timestamp_ms)
    }

    /// Metrics query: current raw stage timestamps plus the three derived
    /// CTQ intervals for `id`.
    ///
    /// # Errors
    ///
    /// `UnknownTrace` if the identifier is absent or evicted.
    pub fn metrics(&self, id: TraceId) -> Result<TraceMetrics> {
        let Trace { id, subject, stages } = self.store.get(id)?;
        Ok(TraceMetrics {
            id,
            subject,
            ctq: project(&stages),
            stages,
        })
    }

    /// Number of live traces, for the gateway's health endpoint
    pub fn live_traces(&self) -> usize {
        self.store.len()
    }

    /// Run one eviction sweep synchronously; returns the count removed.
    /// Useful in tests and for operational tooling.
    pub fn sweep_now(&self) -> usize {
        self.store.evict_older_than(self.retention_ms)
    }

    /// Stop the background sweeper. Idempotent; also happens on drop.
    pub fn shutdown(&self) {
        if let Some(sweeper) = &self.sweeper {
            sweeper.shutdown();
        }
    }
}

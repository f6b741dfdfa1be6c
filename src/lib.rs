//! scantrace — latency instrumentation core for an RFID scan gateway
//!
//! Tracks the causal stages of a single logical scan event as it
//! propagates through three independent actors — the gateway, a remote
//! RPC service, and a client display — and computes derived
//! critical-to-quality (CTQ) timing intervals from partially-completed
//! stage data.
//!
//! # Quick Start
//!
//! ```ignore
//! use scantrace::{AckStage, RegistryConfig, ScanRegistry, Subject};
//!
//! let registry = ScanRegistry::open(RegistryConfig::default())?;
//!
//! // Gateway: a scan arrived
//! let receipt = registry.begin(Subject::new("JK3323es", "ELE-3701"))?;
//!
//! // Gateway: the remote RPC returned
//! registry.upstream_done(receipt.id)?;
//!
//! // Display client: acknowledged
//! registry.acknowledge(receipt.id, AckStage::Rendered)?;
//!
//! // Dashboard: how long did that take?
//! let metrics = registry.metrics(receipt.id)?;
//! ```
//!
//! # Architecture
//!
//! All operations go through [`ScanRegistry`], which owns the concurrent
//! trace store, the validated stage recorder, the CTQ projector and the
//! background eviction sweeper. The store is process-local and
//! intentionally non-durable — traces are diagnostic, not transactional,
//! data.

pub use scantrace_core::{
    Clock, Error, ManualClock, Result, Stage, StageTimes, Subject, SystemClock, Trace, TraceId,
};
pub use scantrace_registry::{
    AckStage, BeginReceipt, RegistryConfig, ScanRegistry, TraceMetrics, CONFIG_FILE_NAME,
};
pub use scantrace_store::{project, CtqInterval, CtqReport, StageRecorder, TraceStore};

//! Core types and traits for scantrace
//!
//! This crate defines the foundational types used throughout the system:
//! - TraceId: Unique identifier for one logical scan event
//! - Subject: Opaque diagnostic payload (badge UID + class code)
//! - Stage: Closed enumeration of causal stages
//! - StageTimes / Trace: The per-scan record and its timestamp slots
//! - Error: Error type hierarchy
//! - Clock: Wall-clock seam (SystemClock, ManualClock)

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{Error, Result};
pub use types::{Stage, StageTimes, Subject, Trace, TraceId};

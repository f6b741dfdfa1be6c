//! Error types for the scan-trace registry
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! A causality anomaly is deliberately NOT an error: it is a flag on a
//! successfully computed metric (see the projector).

use crate::types::TraceId;
use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the scan-trace registry
#[derive(Debug, Error)]
pub enum Error {
    /// Identifier absent: never created, or already evicted.
    /// Surfaced to the caller as a not-found condition; never retried.
    #[error("Unknown trace: {0}")]
    UnknownTrace(TraceId),

    /// Stage name or slot outside the writable contract.
    /// Caller error, surfaced immediately.
    #[error("Invalid stage: {0}")]
    InvalidStage(String),

    /// Trace creation could not complete. Fatal for that call — a partial
    /// trace is never left behind.
    #[error("Allocation failure: {0}")]
    AllocationFailure(String),

    /// Configuration file could not be read, parsed or validated
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::InvalidConfig(e.to_string())
    }
}

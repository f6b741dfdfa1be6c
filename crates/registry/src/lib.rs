//! Registry facade, configuration and eviction sweeper
//!
//! Ties the store, recorder and projector together behind the four
//! logical operations the gateway's collaborators invoke, and keeps the
//! store's lifetime bounded with a background eviction sweep.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod registry;
pub mod sweeper;

pub use config::{RegistryConfig, CONFIG_FILE_NAME};
pub use registry::{AckStage, BeginReceipt, ScanRegistry, TraceMetrics};
pub use sweeper::EvictionSweeper;

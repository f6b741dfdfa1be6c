//! Concurrent trace store, stage recorder and CTQ projector
//!
//! The store is the only shared mutable resource in the system; the
//! recorder and projector are stateless over it. Entry points may be
//! invoked concurrently from independent request-handling threads with
//! no ordering relationship assumed between them.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod projector;
pub mod recorder;
pub mod store;

pub use projector::{project, CtqInterval, CtqReport};
pub use recorder::StageRecorder;
pub use store::TraceStore;

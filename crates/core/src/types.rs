//! Core types for the scan-trace registry
//!
//! This module defines the foundational types:
//! - TraceId: Unique identifier for one logical scan event
//! - Subject: Opaque diagnostic payload carried by a trace
//! - Stage: Closed enumeration of causal stages
//! - StageTimes: The per-trace timestamp slots
//! - Trace: The full per-scan record

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for one logical scan event.
///
/// A TraceId is a wrapper around a UUID v4: 128 random bits, which is
/// unguessable-enough to avoid cross-trace interference and makes a
/// collision negligible at any realistic scan volume. The id is the sole
/// lookup key — it never changes and is never reused after eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceId(Uuid);

impl TraceId {
    /// Create a new random TraceId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a TraceId from a string representation
    ///
    /// Accepts standard UUID format (with or without hyphens).
    /// Returns None if the string is not a valid UUID.
    pub fn from_string(s: &str) -> Option<Self> {
        Uuid::parse_str(s).ok().map(Self)
    }

    /// Get the raw bytes of this TraceId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The business payload associated with a scan event.
///
/// Carried for diagnostic display only — the registry never interprets it.
/// Mirrors the identifier pair the gateway forwards upstream: the badge
/// (RFID UID) and the class code the scan was posted against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// RFID badge UID as read by the scanner
    pub badge_uid: String,
    /// Class/destination code the scan targets
    pub class_code: String,
}

impl Subject {
    /// Create a new subject
    pub fn new(badge_uid: impl Into<String>, class_code: impl Into<String>) -> Self {
        Self {
            badge_uid: badge_uid.into(),
            class_code: class_code.into(),
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.badge_uid, self.class_code)
    }
}

/// One named point in a trace's causal timeline.
///
/// This is a closed enumeration: stage updates riding in with any other
/// name are rejected at the boundary rather than silently accepted as
/// part of the trusted state machine.
///
/// Wire names are snake_case and stable:
/// `origin`, `upstream_done`, `client_received`, `client_rendered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Scan received by the gateway; stamped exactly once, at creation
    Origin,
    /// Remote RPC acknowledged (success or failure); trusted internal write
    UpstreamDone,
    /// Display client received the event
    ClientReceived,
    /// Display client finished rendering the event
    ClientRendered,
}

impl Stage {
    /// Stable snake_case wire name for this stage
    pub fn wire_name(&self) -> &'static str {
        match self {
            Stage::Origin => "origin",
            Stage::UpstreamDone => "upstream_done",
            Stage::ClientReceived => "client_received",
            Stage::ClientRendered => "client_rendered",
        }
    }

    /// Parse a wire name back into a stage
    ///
    /// Returns None for anything outside the closed set.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "origin" => Some(Stage::Origin),
            "upstream_done" => Some(Stage::UpstreamDone),
            "client_received" => Some(Stage::ClientReceived),
            "client_rendered" => Some(Stage::ClientRendered),
            _ => None,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// The fixed set of timestamp slots for one trace.
///
/// `origin` is always set — the store stamps it at creation and nothing
/// else may write it. The three post-origin slots start unset and are
/// filled in by independent inbound calls, in no guaranteed order.
/// All values are milliseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTimes {
    /// When the gateway accepted the scan
    pub origin: i64,
    /// When the remote RPC returned
    pub upstream_done: Option<i64>,
    /// When the display client received the event
    pub client_received: Option<i64>,
    /// When the display client finished rendering
    pub client_rendered: Option<i64>,
}

impl StageTimes {
    /// Slots for a freshly created trace: origin set, everything else unset
    pub fn at_origin(origin: i64) -> Self {
        Self {
            origin,
            upstream_done: None,
            client_received: None,
            client_rendered: None,
        }
    }

    /// Read one slot by stage name
    pub fn get(&self, stage: Stage) -> Option<i64> {
        match stage {
            Stage::Origin => Some(self.origin),
            Stage::UpstreamDone => self.upstream_done,
            Stage::ClientReceived => self.client_received,
            Stage::ClientRendered => self.client_rendered,
        }
    }
}

/// The record tracking one logical scan event's progress across stages.
///
/// Traces are plain cloneable values: a `get` returns a snapshot copy, so
/// readers never observe a half-applied update and never hold a reference
/// into the store across calls.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Immutable unique identifier, the sole lookup key
    pub id: TraceId,
    /// Opaque diagnostic payload, never interpreted
    pub subject: Subject,
    /// The four timestamp slots
    pub stages: StageTimes,
}

//! Metrics projector: derived CTQ intervals from a trace snapshot
//!
//! Computes the three critical-to-quality latency intervals. Each one is
//! independently "unknown" (`None`) unless both of its endpoint
//! timestamps are present — the projector never fabricates a value.
//!
//! A negative raw difference (clock skew between actors, or an
//! out-of-order overwrite) is clamped to zero and flagged as a causality
//! violation on that metric, so dashboards stay numerically sane while
//! callers can still distinguish "fast" from "anomalous".

use scantrace_core::StageTimes;
use serde::{Deserialize, Serialize};

/// One derived latency interval, clamped to be non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CtqInterval {
    /// Interval in milliseconds, `max(0, raw)`
    pub millis: u64,
    /// True when the raw difference was negative before clamping
    pub causality_violation: bool,
}

impl CtqInterval {
    fn from_endpoints(start_ms: i64, end_ms: i64) -> Self {
        let raw = end_ms - start_ms;
        Self {
            millis: raw.max(0) as u64,
            causality_violation: raw < 0,
        }
    }
}

/// The three CTQ intervals for one trace; `None` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CtqReport {
    /// `upstream_done - origin`: time before the remote service acknowledged
    pub mid_to_upstream: Option<CtqInterval>,
    /// `client_rendered - origin`: total observed latency to final display
    pub end_to_end: Option<CtqInterval>,
    /// `client_rendered - upstream_done`: time downstream of the remote service
    pub upstream_to_client: Option<CtqInterval>,
}

impl CtqReport {
    /// True when any computed interval carries a causality flag
    pub fn has_anomaly(&self) -> bool {
        [self.mid_to_upstream, self.end_to_end, self.upstream_to_client]
            .iter()
            .flatten()
            .any(|i| i.causality_violation)
    }
}

fn interval(start: Option<i64>, end: Option<i64>) -> Option<CtqInterval> {
    match (start, end) {
        (Some(s), Some(e)) => Some(CtqInterval::from_endpoints(s, e)),
        _ => None,
    }
}

/// Project the derived CTQ intervals from a stage snapshot.
///
/// Pure function over a copied snapshot — a metrics read interleaved with
/// writes sees a consistent set of slots, and missing inputs degrade to
/// unknown rather than zero.
pub fn project(stages: &StageTimes) -> CtqReport {
    let origin = Some(stages.origin);
    CtqReport {
        mid_to_upstream: interval(origin, stages.upstream_done),
        end_to_end: interval(origin, stages.client_rendered),
        upstream_to_client: interval(stages.upstream_done, stages.client_rendered),
    }
}

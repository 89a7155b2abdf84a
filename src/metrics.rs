//! Metric helpers for `snapwire`.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Without the
//! `metrics` feature every helper compiles to nothing.

use crate::reassembler::DropReason;

/// Name of the counter tracking received datagrams.
pub const DATAGRAMS_TOTAL: &str = "snapwire_datagrams_total";
/// Name of the counter tracking completed frames.
pub const FRAMES_COMPLETED: &str = "snapwire_frames_completed_total";
/// Name of the counter tracking frames superseded before completion.
pub const FRAMES_ABANDONED: &str = "snapwire_frames_abandoned_total";
/// Name of the counter tracking dropped datagrams, labelled by `reason`.
pub const DATAGRAMS_DROPPED: &str = "snapwire_datagrams_dropped_total";
/// Name of the counter tracking frames a sink rejected.
pub const SINK_ERRORS: &str = "snapwire_sink_errors_total";

/// Record a received datagram.
pub fn inc_datagrams() {
    #[cfg(feature = "metrics")]
    metrics::counter!(DATAGRAMS_TOTAL).increment(1);
}

/// Record a completed frame.
pub fn inc_frames_completed() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_COMPLETED).increment(1);
}

/// Record a frame abandoned by a newer header.
pub fn inc_frames_abandoned() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_ABANDONED).increment(1);
}

/// Record a dropped datagram.
pub fn inc_dropped(reason: &DropReason) {
    #[cfg(feature = "metrics")]
    metrics::counter!(DATAGRAMS_DROPPED, "reason" => reason.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = reason;
}

/// Record a sink failure.
pub fn inc_sink_errors() {
    #[cfg(feature = "metrics")]
    metrics::counter!(SINK_ERRORS).increment(1);
}

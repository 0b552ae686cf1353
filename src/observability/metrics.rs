//! Metrics collection.
//!
//! # Metrics
//! - `lynara_invocations_total` (counter): invocations by shape, outcome
//! - `lynara_invocation_duration_seconds` (histogram): total time per invocation
//! - `lynara_interface_duration_seconds` (histogram): time spent in the application call
//! - `lynara_lifecycle_events_total` (counter): handshake outcomes by event
//!
//! # Design Decisions
//! - Recorded through the `metrics` facade; without an installed recorder
//!   every call is a no-op

use std::time::Duration;

/// Record one finished invocation.
pub fn record_invocation(shape: &'static str, outcome: &'static str, total: Duration, interface: Option<Duration>) {
    metrics::counter!("lynara_invocations_total", "shape" => shape, "outcome" => outcome).increment(1);
    metrics::histogram!("lynara_invocation_duration_seconds", "shape" => shape)
        .record(total.as_secs_f64());
    if let Some(interface) = interface {
        metrics::histogram!("lynara_interface_duration_seconds", "shape" => shape)
            .record(interface.as_secs_f64());
    }
}

/// Record a lifecycle handshake event.
pub fn record_lifecycle_event(event: &'static str) {
    metrics::counter!("lynara_lifecycle_events_total", "event" => event).increment(1);
}

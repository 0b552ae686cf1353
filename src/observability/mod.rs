//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! orchestrator / lifecycle / adapters produce:
//!     → logging.rs (structured tracing events inside an invocation span)
//!     → metrics.rs (invocation counters, duration histograms)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing a subscriber or exporter is the
//!   host process's choice (the bundled CLI installs the fmt subscriber)
//! - Timings are advisory and never affect the invocation result

pub mod logging;
pub mod metrics;

//! Lifecycle (startup/shutdown handshake) subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (adapter.rs):
//!     spawn driver task → queue lifespan.startup → wait on startup latch
//!
//! Driver (driver.rs):
//!     app.call(lifespan scope) ↔ control queue / latches
//!     task exit drops both latches, waking any waiter
//!
//! Shutdown (adapter.rs):
//!     queue lifespan.shutdown → wait on shutdown latch
//! ```
//!
//! # Design Decisions
//! - The handshake owns its own queue; it never shares the invocation queue
//! - Latches are oneshot channels, so "force-set on failure" is simply the
//!   sender being dropped when the driver task ends
//! - `Auto` tolerates an application that rejects the lifespan scope; `On`
//!   does not

pub mod adapter;
pub mod driver;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use adapter::LifecycleAdapter;

/// Whether the startup/shutdown handshake runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleMode {
    /// Never run the handshake.
    Off,
    /// Run it; any failure or lack of support is fatal.
    On,
    /// Run it, but tolerate an application that does not implement it.
    #[default]
    Auto,
}

impl FromStr for LifecycleMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "off" => Ok(LifecycleMode::Off),
            "on" => Ok(LifecycleMode::On),
            "auto" => Ok(LifecycleMode::Auto),
            other => Err(format!("unknown lifecycle mode: {}", other)),
        }
    }
}

impl fmt::Display for LifecycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LifecycleMode::Off => "off",
            LifecycleMode::On => "on",
            LifecycleMode::Auto => "auto",
        })
    }
}

/// Position in the handshake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LifecyclePhase {
    #[default]
    NotStarted,
    Starting,
    Started,
    ShuttingDown,
    Stopped,
}

/// Phase plus the failure flags observed so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LifecycleState {
    pub phase: LifecyclePhase,
    pub startup_failed: bool,
    pub shutdown_failed: bool,
    pub error_occurred: bool,
}

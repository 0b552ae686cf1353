//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

use crate::interfaces::ShapeSelection;
use crate::lifecycle::LifecycleMode;

/// Root configuration for the adapter.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct LynaraConfig {
    /// Startup/shutdown handshake mode ("off", "on", "auto").
    pub lifecycle: LifecycleMode,

    /// Deployment-stage prefix stripped from incoming paths (e.g., "/dev").
    pub base_path: Option<String>,

    /// Event shape, or "auto" to detect it per event.
    pub shape: ShapeSelection,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}

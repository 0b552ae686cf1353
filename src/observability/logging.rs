//! Structured logging setup.
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Installing twice is harmless: the second call is ignored

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global fmt subscriber with `default_level` as fallback filter.
///
/// Returns false if a subscriber was already installed.
pub fn init_logging(default_level: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .is_ok()
}

/// Fallback filter covering the library and the invoke binary.
fn default_directives(level: &str) -> String {
    format!("lynara={0},lynara_invoke={0}", level)
}

/// Request id for the invocation span.
///
/// Looks for the usual request-id keys in the runtime context and falls
/// back to a fresh UUID.
pub fn request_id(context: Option<&serde_json::Value>) -> String {
    const KEYS: [&str; 4] = ["aws_request_id", "awsRequestId", "request_id", "requestId"];

    context
        .and_then(|ctx| {
            KEYS.iter()
                .find_map(|key| ctx.get(*key).and_then(serde_json::Value::as_str))
        })
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
}

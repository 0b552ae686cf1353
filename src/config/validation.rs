//! Configuration validation.
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LynaraConfig → Result<(), Vec<ValidationError>>

use thiserror::Error;

use crate::config::schema::LynaraConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("base_path must start with '/': {0}")]
    BasePathNotAbsolute(String),

    #[error("base_path must not contain a query or fragment: {0}")]
    BasePathHasQuery(String),

    #[error("unknown log level: {0}")]
    UnknownLogLevel(String),
}

/// Check a parsed configuration.
pub fn validate_config(config: &LynaraConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(base_path) = config.base_path.as_deref().filter(|p| !p.is_empty()) {
        if !base_path.starts_with('/') {
            errors.push(ValidationError::BasePathNotAbsolute(base_path.to_string()));
        }
        if base_path.contains(['?', '#']) {
            errors.push(ValidationError::BasePathHasQuery(base_path.to_string()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(
            config.observability.log_level.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::LynaraConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<LynaraConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<LynaraConfig, ConfigError> {
    let config: LynaraConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::LifecycleMode;

    #[test]
    fn test_parse_config() {
        let config = parse_config("lifecycle = \"off\"\nbase_path = \"/prod\"").unwrap();
        assert_eq!(config.lifecycle, LifecycleMode::Off);
        assert_eq!(config.base_path.as_deref(), Some("/prod"));
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("lifecycle = \"sometimes\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_error_message() {
        let err = parse_config("base_path = \"dev\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: base_path must start with '/': dev"
        );
    }

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir().join(format!("lynara-config-{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "shape = \"api_gateway_v2\"").unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.shape, crate::interfaces::ShapeSelection::ApiGatewayV2);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/nonexistent/lynara.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}

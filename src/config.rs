//! Render configuration
//!
//! Limits that bound the work a single render may do. Values can be set with
//! builder methods or loaded from a TOML file:
//!
//! ```toml
//! [limits]
//! max_depth = 16
//! max_output_len = 1048576
//! ```

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Configuration for the render pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Deepest allowed nesting of `#if`/`#each` blocks
    pub max_depth: usize,
    /// Largest rendered output in bytes
    pub max_output_len: usize,
}

/// TOML structure for deserializing configuration files
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfig {
    limits: Option<TomlLimits>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlLimits {
    max_depth: Option<usize>,
    max_output_len: Option<usize>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 32,
            max_output_len: 16 * 1024 * 1024,
        }
    }
}

impl RenderConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the block nesting limit
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Set the output size limit in bytes
    pub fn with_max_output_len(mut self, len: usize) -> Self {
        self.max_output_len = len;
        self
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a TOML string; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let parsed: TomlConfig = toml::from_str(content)?;
        let mut config = Self::default();
        if let Some(limits) = parsed.limits {
            if let Some(depth) = limits.max_depth {
                config.max_depth = depth;
            }
            if let Some(len) = limits.max_output_len {
                config.max_output_len = len;
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.max_depth, 32);
        assert_eq!(config.max_output_len, 16 * 1024 * 1024);
    }

    #[test]
    fn test_builder() {
        let config = RenderConfig::new().with_max_depth(4).with_max_output_len(100);
        assert_eq!(config.max_depth, 4);
        assert_eq!(config.max_output_len, 100);
    }

    #[test]
    fn test_parse_toml() {
        let config = RenderConfig::from_toml_str(
            r#"
[limits]
max_depth = 8
"#,
        )
        .unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.max_output_len, RenderConfig::default().max_output_len);
    }

    #[test]
    fn test_empty_toml_is_default() {
        assert_eq!(RenderConfig::from_toml_str("").unwrap(), RenderConfig::default());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result = RenderConfig::from_toml_str("[limits]\nmax_dpth = 8\n");
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }
}

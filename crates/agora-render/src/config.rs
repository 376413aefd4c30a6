//! Feed configuration
//!
//! Defaults suit an interactive feed; the replay tool can override them from
//! a TOML file.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Rendering feed configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Maximum loaded renderers kept in the resolver cache
    pub cache_capacity: usize,
    /// Maximum event slots retained by the rendering surface
    pub retain_window: usize,
    /// Payload fields searched, in order, for a synthesis blob
    pub synthesis_fields: Vec<String>,
    /// Payload field holding the 0-indexed sub-problem scope
    pub scope_field: String,
}

impl FeedConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With cache capacity
    #[inline]
    #[must_use]
    pub fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    /// With retained window size
    #[inline]
    #[must_use]
    pub fn with_retain_window(mut self, window: usize) -> Self {
        self.retain_window = window;
        self
    }

    /// Parse from TOML text; missing keys take defaults
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::InvalidValue` when validation fails
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// - `ConfigError::Io` if the file cannot be read
    /// - any error from [`FeedConfig::from_toml_str`]
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io_error(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges
    ///
    /// # Errors
    /// - `ConfigError::InvalidValue` for a zero capacity or window, or an
    ///   empty synthesis field list
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "cache_capacity",
                message: "must be at least 1".to_string(),
            });
        }
        if self.retain_window == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retain_window",
                message: "must be at least 1".to_string(),
            });
        }
        if self.synthesis_fields.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "synthesis_fields",
                message: "must name at least one field".to_string(),
            });
        }
        Ok(())
    }
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            cache_capacity: 20,
            retain_window: 500,
            synthesis_fields: vec![
                "synthesis".to_string(),
                "text".to_string(),
                "content".to_string(),
            ],
            scope_field: "sub_problem_index".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        let config = FeedConfig::new();
        assert_eq!(config.cache_capacity, 20);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = FeedConfig::from_toml_str("cache_capacity = 3").unwrap();
        assert_eq!(config.cache_capacity, 3);
        assert_eq!(config.retain_window, 500);
        assert_eq!(config.scope_field, "sub_problem_index");
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            FeedConfig::from_toml_str("retain_window = 0"),
            Err(ConfigError::InvalidValue { field: "retain_window", .. })
        ));
        assert!(matches!(
            FeedConfig::from_toml_str("cache_capacity = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "retain_window = 10\nsynthesis_fields = [\"body\"]").unwrap();

        let config = FeedConfig::from_path(file.path()).unwrap();
        assert_eq!(config.retain_window, 10);
        assert_eq!(config.synthesis_fields, vec!["body".to_string()]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let result = FeedConfig::from_path("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}

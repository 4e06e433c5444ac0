//! Optional TOML configuration for storage backends (§3 "Configuration").
//! Absence of a file is not an error — every field has a default.

use std::path::Path;

use serde::Deserialize;

use warden_model::{WardenError, WardenResult};

fn default_collection_name() -> String {
    "vakt_policies".to_string()
}

fn default_regex_cache_size() -> usize {
    1024
}

fn default_start_tag() -> String {
    "<".to_string()
}

fn default_end_tag() -> String {
    ">".to_string()
}

/// Tunables for the document-store adapter and the regex checker, loaded
/// from an optional `warden.toml`-shaped file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(default = "default_collection_name")]
    pub collection_name: String,
    #[serde(default = "default_regex_cache_size")]
    pub regex_cache_size: usize,
    #[serde(default = "default_start_tag")]
    pub regex_start_tag: String,
    #[serde(default = "default_end_tag")]
    pub regex_end_tag: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            collection_name: default_collection_name(),
            regex_cache_size: default_regex_cache_size(),
            regex_start_tag: default_start_tag(),
            regex_end_tag: default_end_tag(),
        }
    }
}

impl StorageConfig {
    /// Parse `s` as TOML. Returns `WardenError::Validation` if the document
    /// doesn't match this schema.
    pub fn from_toml_str(s: &str) -> WardenResult<Self> {
        toml::from_str(s).map_err(|e| WardenError::validation(format!("failed to parse storage config: {e}")))
    }

    /// Read and parse `path`. Returns `WardenError::Validation` if the file
    /// can't be read or doesn't parse.
    pub fn from_file(path: &Path) -> WardenResult<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| WardenError::validation(format!("failed to read config '{}': {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_spec() {
        let config = StorageConfig::default();
        assert_eq!(config.collection_name, "vakt_policies");
        assert_eq!(config.regex_cache_size, 1024);
        assert_eq!(config.regex_start_tag, "<");
        assert_eq!(config.regex_end_tag, ">");
    }

    #[test]
    fn partial_toml_fills_in_remaining_defaults() {
        let config = StorageConfig::from_toml_str(r#"collection_name = "custom_policies""#).unwrap();
        assert_eq!(config.collection_name, "custom_policies");
        assert_eq!(config.regex_cache_size, 1024);
    }

    #[test]
    fn malformed_toml_is_validation_error() {
        let err = StorageConfig::from_toml_str("not = [valid").unwrap_err();
        assert!(matches!(err, WardenError::Validation { .. }));
    }
}

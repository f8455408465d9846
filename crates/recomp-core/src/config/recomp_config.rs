//! Top-level `RecompConfig`: TOML parsing, file loading, validation.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::{AnalysisConfig, CacheConfig};
use crate::errors::ConfigError;

/// Name of the project-level config file.
pub const CONFIG_FILE_NAME: &str = "recomp.toml";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct RecompConfig {
    pub cache: CacheConfig,
    pub analysis: AnalysisConfig,
}

impl RecompConfig {
    /// Parse a config from TOML text. Unknown keys are ignored.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Load `recomp.toml` from a project directory; a missing file yields defaults.
    pub fn load(project_dir: &Path) -> Result<Self, ConfigError> {
        let path = project_dir.join(CONFIG_FILE_NAME);
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        Self::from_file(&path)
    }

    /// Load and validate a TOML config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;
        let config = Self::from_toml(&text)?;
        Self::validate(&config)?;
        Ok(config)
    }

    /// Serialize to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })
    }

    /// Reject values the engine cannot run with.
    pub fn validate(config: &RecompConfig) -> Result<(), ConfigError> {
        if config.cache.memory_expiry_secs == Some(0) {
            return Err(invalid("cache.memory_expiry_secs", "must be greater than 0"));
        }
        if config.cache.memory_capacity == Some(0) {
            return Err(invalid("cache.memory_capacity", "must be greater than 0"));
        }
        if config.cache.class_analysis_capacity == Some(0) {
            return Err(invalid("cache.class_analysis_capacity", "must be greater than 0"));
        }
        if let Some(root) = config
            .cache
            .immutable_roots
            .iter()
            .find(|root| !Path::new(root).is_absolute())
        {
            return Err(invalid(
                "cache.immutable_roots",
                &format!("'{root}' is not an absolute path"),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::ValidationFailed {
        field: field.to_string(),
        message: message.to_string(),
    }
}

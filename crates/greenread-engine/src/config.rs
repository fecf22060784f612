use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::aim::AimSolverConfig;
use crate::error::ConfigError;
use crate::integrator::IntegratorConfig;
use crate::speed::SpeedSolverConfig;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "GREENREAD_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config/greenread.toml";

/// Every tunable of the engine. Missing TOML tables and keys keep their
/// defaults.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub integrator: IntegratorConfig,
    pub speed: SpeedSolverConfig,
    pub aim: AimSolverConfig,
}

impl EngineConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load from `$GREENREAD_CONFIG`, else `config/greenread.toml`. Falls back
    /// to defaults if the file is missing, unparseable, or invalid.
    pub fn load() -> Self {
        let path =
            std::env::var(CONFIG_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        match Self::from_path(&path) {
            Ok(config) => {
                tracing::debug!("Loaded engine config from {path}");
                config
            },
            Err(ConfigError::Io(_)) => Self::default(),
            Err(e) => {
                tracing::warn!("Failed to load {path}: {e}, using defaults");
                Self::default()
            },
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.integrator.validate().map_err(ConfigError::Invalid)?;
        self.speed.validate().map_err(ConfigError::Invalid)?;
        self.aim.validate().map_err(ConfigError::Invalid)?;
        Ok(())
    }
}

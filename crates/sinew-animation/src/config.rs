//! Animation system configuration
//!
//! Loaded from a TOML file; every key is optional:
//! ```toml
//! max_controllers = 256
//! default_layer_count = 1
//! clock_rebase_threshold_ms = 1.0e30
//! ```

use crate::layer::LayerSettings;
use serde::{Deserialize, Serialize};
use sinew_core::{Result, SinewError};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    /// Controllers the system will hold at once
    #[serde(default = "default_max_controllers")]
    pub max_controllers: usize,
    /// Layers given to controllers created without an explicit count
    #[serde(default = "default_layer_count")]
    pub default_layer_count: usize,
    /// Layer clocks are rewound by this amount once they pass it
    #[serde(default = "default_clock_rebase_threshold_ms")]
    pub clock_rebase_threshold_ms: f32,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            max_controllers: default_max_controllers(),
            default_layer_count: default_layer_count(),
            clock_rebase_threshold_ms: default_clock_rebase_threshold_ms(),
        }
    }
}

fn default_max_controllers() -> usize {
    256
}
fn default_layer_count() -> usize {
    1
}
fn default_clock_rebase_threshold_ms() -> f32 {
    f32::MAX * 0.5
}

impl AnimationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content).map_err(|e| match e {
            SinewError::ConfigError(msg) => {
                SinewError::ConfigError(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: AnimationConfig =
            toml::from_str(content).map_err(|e| SinewError::ConfigError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.max_controllers == 0 {
            return Err(SinewError::ConfigError("max_controllers must be at least 1".into()));
        }
        if self.default_layer_count == 0 {
            return Err(SinewError::ConfigError(
                "default_layer_count must be at least 1".into(),
            ));
        }
        if !(self.clock_rebase_threshold_ms > 0.0) {
            return Err(SinewError::ConfigError(format!(
                "clock_rebase_threshold_ms must be positive, got {}",
                self.clock_rebase_threshold_ms
            )));
        }
        Ok(())
    }

    pub fn layer_settings(&self) -> LayerSettings {
        LayerSettings {
            clock_rebase_threshold_ms: self.clock_rebase_threshold_ms,
        }
    }
}

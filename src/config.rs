// File: src/config.rs
//! Estimator configuration.
//!
//! Every field has a default, so a config file only needs the values it changes:
//!
//! ```json
//! { "model_path": "/srv/kost/model_kost_xgb.bin", "analysis_delay_ms": 0 }
//! ```

use crate::core::interval::MODEL_RMSE;
use crate::error::{EstimatorError, EstimatorResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL_PATH: &str = "model_kost_xgb.bin";
pub const DEFAULT_SCHEMA_PATH: &str = "feature_columns.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Serialized model artifact (bincode, or JSON when the extension is `.json`).
    pub model_path: PathBuf,

    /// JSON list of feature columns in training order.
    pub schema_path: PathBuf,

    /// Error margin used for the display range, in rupiah.
    pub margin: i64,

    /// Pause shown by the interactive form before the result appears.
    pub analysis_delay_ms: u64,

    pub min_room_size: u32,
    pub max_room_size: u32,
    pub default_room_size: u32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            schema_path: PathBuf::from(DEFAULT_SCHEMA_PATH),
            margin: MODEL_RMSE,
            analysis_delay_ms: 1200,
            min_room_size: 4,
            max_room_size: 20,
            default_room_size: 12,
        }
    }
}

impl EstimatorConfig {
    pub fn builder() -> EstimatorConfigBuilder {
        EstimatorConfigBuilder::default()
    }

    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> EstimatorResult<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path).map_err(|e| {
            EstimatorError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = serde_json::from_str(&raw).map_err(|e| {
            EstimatorError::config(format!("invalid config {}: {}", path.display(), e))
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> EstimatorResult<()> {
        if self.margin < 0 {
            return Err(EstimatorError::config("margin must not be negative"));
        }
        if self.min_room_size > self.max_room_size {
            return Err(EstimatorError::config(format!(
                "room size range {}..={} is inverted",
                self.min_room_size, self.max_room_size
            )));
        }
        if !(self.min_room_size..=self.max_room_size).contains(&self.default_room_size) {
            return Err(EstimatorError::config(format!(
                "default room size {} is outside {}..={}",
                self.default_room_size, self.min_room_size, self.max_room_size
            )));
        }
        Ok(())
    }

    pub fn analysis_delay(&self) -> Duration {
        Duration::from_millis(self.analysis_delay_ms)
    }

    pub fn room_size_in_range(&self, size: f64) -> bool {
        size >= f64::from(self.min_room_size) && size <= f64::from(self.max_room_size)
    }
}

/// Builder for [`EstimatorConfig`].
#[derive(Debug, Default)]
pub struct EstimatorConfigBuilder {
    config: EstimatorConfig,
}

impl EstimatorConfigBuilder {
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.model_path = path.into();
        self
    }

    pub fn schema_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.schema_path = path.into();
        self
    }

    pub fn margin(mut self, margin: i64) -> Self {
        self.config.margin = margin;
        self
    }

    pub fn analysis_delay_ms(mut self, ms: u64) -> Self {
        self.config.analysis_delay_ms = ms;
        self
    }

    pub fn room_size_range(mut self, min: u32, max: u32) -> Self {
        self.config.min_room_size = min;
        self.config.max_room_size = max;
        self
    }

    pub fn build(self) -> EstimatorConfig {
        self.config
    }
}

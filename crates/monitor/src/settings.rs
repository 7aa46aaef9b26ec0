//! Monitor settings
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! settings file, then `DMS_*` environment variables.

use config::{Config, Environment, File};
use dms::{DmsConfig, DmsError, Sensitivity};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::Level;

/// Settings supplied by the operator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorSettings {
    /// Detection preset (`easy`, `normal`, `strict`)
    pub sensitivity: Sensitivity,
    /// Fatigue score that raises the drowsiness alert (1-10)
    pub alert_threshold: u8,
    /// Length of the calibration window at the start of a recording
    pub calibration_secs: f64,
    /// Where evidence images are written (disabled when unset)
    pub evidence_dir: Option<PathBuf>,
    /// Epoch seconds at `t = 0`, for recordings with relative timestamps
    pub recording_epoch: Option<f64>,
    /// Max log level (`trace` .. `error`)
    pub log_level: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            sensitivity: Sensitivity::Normal,
            alert_threshold: 8,
            calibration_secs: 5.0,
            evidence_dir: None,
            recording_epoch: None,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl MonitorSettings {
    /// Load settings from an optional file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }
        builder
            .add_source(Environment::with_prefix("DMS").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Detector configuration derived from these settings
    pub fn dms_config(&self) -> Result<DmsConfig, DmsError> {
        let mut config = DmsConfig::for_sensitivity(self.sensitivity)
            .with_alert_threshold(self.alert_threshold)?;
        config.calibration_secs = self.calibration_secs;
        config.validate()?;
        Ok(config)
    }

    /// Parsed log level, `INFO` when unrecognized
    pub fn level(&self) -> Level {
        self.log_level.parse().unwrap_or(Level::INFO)
    }
}

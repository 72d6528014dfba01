//! Run configuration.
//!
//! Built once at startup, from an optional JSON file with command-line
//! overrides applied on top, and passed by value into the controller and
//! transport constructors. Nothing reads configuration after that.

use std::path::Path;

use rem::DEFAULT_ROBOT_ID;
use robot_link::SerialConfig;
use serde::{Deserialize, Serialize};
use steering::SteeringConfig;
use thiserror::Error;

/// Errors loading or validating a [`RunConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid steering config: {0}")]
    Steering(#[from] steering::ConfigError),

    #[error("invalid serial config: {0}")]
    Serial(String),
}

/// Everything a run needs, fixed for the lifetime of the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Controller tuning
    pub steering: SteeringConfig,
    /// Serial port settings, used only when `conn` is set
    pub serial: SerialConfig,
    /// Robot id written into every command packet
    pub robot_id: u8,
    /// Send commands to the robot; when false the controller still runs
    pub conn: bool,
    /// Warn when a frame's step and dispatch take longer than this
    pub frame_budget_ms: Option<u64>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            steering: SteeringConfig::default(),
            serial: SerialConfig::default(),
            robot_id: DEFAULT_ROBOT_ID,
            conn: false,
            frame_budget_ms: None,
        }
    }
}

impl RunConfig {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Save as pretty-printed JSON.
    pub fn save_to_file(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.steering.validate()?;

        if self.conn {
            if self.serial.port.is_empty() {
                return Err(ConfigError::Serial("port path is empty".to_string()));
            }
            if self.serial.baud_rate == 0 {
                return Err(ConfigError::Serial("baud rate must be non-zero".to_string()));
            }
        }

        Ok(())
    }
}

use crate::subsystems::attitude::DEFAULT_RATE_NOISE_SIGMA;
use crate::subsystems::thermal::DEFAULT_TEMP_NOISE_SIGMA_C;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_TICK_PERIOD_MS: u64 = 100;
// Keep clear of the deploying spacecraft before starting nominal operation
const DEFAULT_DEPLOYMENT_DELAY_MS: u64 = 5000;
const DEFAULT_LOG_PATH: &str = "logdata.csv";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Which angular-velocity value the despin law consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ControlFeedback {
    /// True integrator state.
    #[default]
    Truth,
    /// Noisy gyro reading, as flight software would see it.
    Measured,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub tick_period_ms: u64,
    pub deployment_delay_ms: u64,
    pub seed: Option<u64>,
    pub noise_enabled: bool,
    pub temperature_noise_sigma: f32,
    pub angular_velocity_noise_sigma: f32,
    pub control_feedback: ControlFeedback,
    pub log_path: PathBuf,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_period_ms: DEFAULT_TICK_PERIOD_MS,
            deployment_delay_ms: DEFAULT_DEPLOYMENT_DELAY_MS,
            seed: None,
            noise_enabled: true,
            temperature_noise_sigma: DEFAULT_TEMP_NOISE_SIGMA_C,
            angular_velocity_noise_sigma: DEFAULT_RATE_NOISE_SIGMA,
            control_feedback: ControlFeedback::Truth,
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
        }
    }
}

impl SimulationConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::Invalid`] for out-of-range values.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`from_json_str`](Self::from_json_str).
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_period_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "tick_period_ms",
                reason: "must be greater than zero",
            });
        }
        if !is_valid_sigma(self.temperature_noise_sigma) {
            return Err(ConfigError::Invalid {
                field: "temperature_noise_sigma",
                reason: "must be a non-negative number",
            });
        }
        if !is_valid_sigma(self.angular_velocity_noise_sigma) {
            return Err(ConfigError::Invalid {
                field: "angular_velocity_noise_sigma",
                reason: "must be a non-negative number",
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_period_ms)
    }

    #[must_use]
    pub fn deployment_delay(&self) -> Duration {
        Duration::from_millis(self.deployment_delay_ms)
    }

    /// Sigmas actually applied, zeroed when noise is disabled.
    #[must_use]
    pub fn effective_temperature_sigma(&self) -> f32 {
        if self.noise_enabled {
            self.temperature_noise_sigma
        } else {
            0.0
        }
    }

    #[must_use]
    pub fn effective_angular_velocity_sigma(&self) -> f32 {
        if self.noise_enabled {
            self.angular_velocity_noise_sigma
        } else {
            0.0
        }
    }
}

fn is_valid_sigma(sigma: f32) -> bool {
    sigma.is_finite() && sigma >= 0.0
}

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_FRAME_TIMEOUT_MS, DEFAULT_READ_FAILURE_THRESHOLD, DEFAULT_TICK_INTERVAL_MS};
use crate::error::ConfigError;
use crate::filters::FilterSpec;
use crate::viewport::Resample;

/// Settings for a preview session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewConfig {
    /// Delay between live-capture ticks.
    pub tick_interval_ms: u64,
    /// Consecutive failed reads before a live device is treated as lost.
    pub read_failure_threshold: u32,
    pub resample: Resample,
    /// Read the capture device on a worker thread (latest frame wins).
    pub threaded_capture: bool,
    /// Longest wait for a fresh frame in threaded mode.
    pub frame_timeout_ms: u64,
    /// Filter active when the session starts.
    pub filter: FilterSpec,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            read_failure_threshold: DEFAULT_READ_FAILURE_THRESHOLD,
            resample: Resample::default(),
            threaded_capture: false,
            frame_timeout_ms: DEFAULT_FRAME_TIMEOUT_MS,
            filter: FilterSpec::default(),
        }
    }
}

impl PreviewConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn frame_timeout(&self) -> Duration {
        Duration::from_millis(self.frame_timeout_ms)
    }
}

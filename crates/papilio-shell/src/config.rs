//! Shell configuration loaded from JSON and overridden by CLI flags.

use std::fs;
use std::path::Path;
use std::time::Duration;

use papilio_core::{DeviceWindow, DriverTiming, SimConfig, DEFAULT_BASE_ADDRESS};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::shell::{ShellOptions, DEFAULT_MODULE};

/// Complete configuration for the `papilio-shell` binary.
///
/// Every field is optional in the file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShellConfig {
    /// Module namespace for the device verbs.
    pub module: String,
    /// Device name used in banners.
    pub title: String,
    /// Base address of the device register window.
    pub base_address: u16,
    /// Driver polling and reset timing.
    pub timing: DriverTiming,
    /// Tutorial pacing delay in milliseconds.
    pub tutorial_pacing_ms: u64,
    /// Input poll interval in milliseconds.
    pub input_poll_ms: u64,
    /// Reject malformed numeric arguments instead of coercing them to zero.
    pub strict_numbers: bool,
    /// Behaviour of the simulated peripheral used as the bus transport.
    pub sim: SimConfig,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            module: DEFAULT_MODULE.to_string(),
            title: "PapilioTemplate".to_string(),
            base_address: DEFAULT_BASE_ADDRESS,
            timing: DriverTiming::default(),
            tutorial_pacing_ms: 1000,
            input_poll_ms: 10,
            strict_numbers: false,
            sim: SimConfig::default(),
        }
    }
}

impl ShellConfig {
    /// Parses configuration JSON.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Json`] for malformed JSON or unknown fields.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read and
    /// [`ConfigError::Json`] when it does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text)
    }

    /// Validated register window for `base_address`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Driver`] when the window does not fit.
    pub fn window(&self) -> Result<DeviceWindow, ConfigError> {
        Ok(DeviceWindow::new(self.base_address)?)
    }

    /// Shell runtime options derived from this configuration.
    #[must_use]
    pub fn shell_options(&self) -> ShellOptions {
        ShellOptions {
            module: self.module.clone(),
            title: self.title.clone(),
            strict_numbers: self.strict_numbers,
            tutorial_pacing: Duration::from_millis(self.tutorial_pacing_ms),
            input_poll: Duration::from_millis(self.input_poll_ms),
        }
    }
}

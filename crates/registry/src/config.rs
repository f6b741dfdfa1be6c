//! Registry configuration via `scantrace.toml`
//!
//! A simple config file instead of a builder: on first open a default
//! `scantrace.toml` can be written next to the gateway's other state.
//! To change settings, edit the file and restart.

use scantrace_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "scantrace.toml";

fn default_retention_secs() -> u64 {
    // Long enough to cover slow client acknowledgments, short enough to
    // bound memory under sustained scan load
    1800
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_sweeper_enabled() -> bool {
    true
}

/// Registry configuration loaded from `scantrace.toml`.
///
/// # Example
///
/// ```toml
/// # Maximum trace age before eviction, in seconds
/// retention_secs = 1800
///
/// # How often the background sweep runs, in seconds
/// sweep_interval_secs = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Maximum age a trace may reach before the sweeper purges it
    #[serde(default = "default_retention_secs")]
    pub retention_secs: u64,
    /// Interval between background eviction sweeps
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
    /// Run the background sweeper thread; disable for embedded test use
    #[serde(default = "default_sweeper_enabled")]
    pub sweeper_enabled: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention_secs: default_retention_secs(),
            sweep_interval_secs: default_sweep_interval_secs(),
            sweeper_enabled: default_sweeper_enabled(),
        }
    }
}

impl RegistryConfig {
    /// Retention horizon in milliseconds
    pub fn retention_ms(&self) -> i64 {
        self.retention_secs as i64 * 1000
    }

    /// Sweep interval as a [`Duration`]
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Check the configuration for values that cannot work.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for a zero retention horizon or sweep interval.
    pub fn validate(&self) -> Result<()> {
        if self.retention_secs == 0 {
            return Err(Error::InvalidConfig(
                "retention_secs must be non-zero".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(Error::InvalidConfig(
                "sweep_interval_secs must be non-zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read, parsed or validated.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw).map_err(|e| {
            Error::InvalidConfig(format!(
                "failed to parse {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# scantrace registry configuration
#
# Maximum trace age before eviction, in seconds.
# Covers slow client acknowledgments; bounds memory under load.
retention_secs = 1800

# How often the background eviction sweep runs, in seconds.
sweep_interval_secs = 60

# Run the background sweeper thread.
sweeper_enabled = true
"#
    }

    /// Write the commented default file if `path` does not exist yet.
    pub fn write_default_if_missing<P: AsRef<Path>>(path: P) -> Result<()> {
        if path.as_ref().exists() {
            return Ok(());
        }
        std::fs::write(path, Self::default_toml())?;
        Ok(())
    }
}

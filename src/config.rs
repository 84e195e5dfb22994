//! Configuration types for Tcpload

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::{RecorderError, Result};

/// File name prefix used by TCPWatch for recorded exchanges
pub const DEFAULT_PREFIX: &str = "watch";

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the recorded capture files
    pub capture_dir: PathBuf,
    /// File name prefix of capture files
    #[serde(default = "default_prefix")]
    pub prefix: String,
    /// Directory where uploaded files are materialized
    #[serde(default = "default_dir")]
    pub upload_dir: PathBuf,
    /// Directory where the generated test case is written
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,
    /// Noise filtering rules
    #[serde(default)]
    pub filter: FilterConfig,
    /// Resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
}

fn default_prefix() -> String {
    DEFAULT_PREFIX.to_string()
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Rules deciding which exchanges are browser noise
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Status codes whose non-POST follow-up is an automatic redirect fetch
    pub redirect_codes: Vec<String>,
    /// Response content-type fragments identifying static resources
    pub static_content_types: Vec<String>,
    /// URL suffixes identifying static resources
    pub static_url_suffixes: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            redirect_codes: vec!["301".to_string(), "302".to_string()],
            static_content_types: ["image", "css", "javascript"]
                .iter()
                .map(ToString::to_string)
                .collect(),
            static_url_suffixes: [".jpg", ".png", ".gif", ".css", ".js"]
                .iter()
                .map(ToString::to_string)
                .collect(),
        }
    }
}

/// Resource limits
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Maximum header lines per captured message
    pub max_headers: usize,
    /// Maximum size of a single capture file in bytes
    pub max_capture_size: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_headers: 128,
            max_capture_size: 64 * 1024 * 1024, // 64 MB
        }
    }
}

impl Config {
    /// Create a configuration with defaults for the given capture directory
    #[must_use]
    pub fn new(capture_dir: impl Into<PathBuf>) -> Self {
        Self {
            capture_dir: capture_dir.into(),
            prefix: default_prefix(),
            upload_dir: default_dir(),
            output_dir: default_dir(),
            filter: FilterConfig::default(),
            limits: LimitsConfig::default(),
        }
    }

    /// Load configuration from TOML file
    ///
    /// # Errors
    ///
    /// Returns error if file cannot be read or parsed
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| RecorderError::ConfigError(format!("Failed to read config file: {e}")))?;

        let config: Self = toml::from_str(&content)
            .map_err(|e| RecorderError::ConfigError(format!("Failed to parse config: {e}")))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid
    pub fn validate(&self) -> Result<()> {
        if !self.capture_dir.is_dir() {
            return Err(RecorderError::ConfigError(format!(
                "Capture directory does not exist: {}",
                self.capture_dir.display()
            )));
        }

        if self.prefix.is_empty() {
            return Err(RecorderError::ConfigError(
                "Capture file prefix cannot be empty".to_string(),
            ));
        }

        if self.limits.max_headers == 0 {
            return Err(RecorderError::ConfigError(
                "max_headers must be > 0".to_string(),
            ));
        }

        if self.limits.max_capture_size == 0 {
            return Err(RecorderError::ConfigError(
                "max_capture_size must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

//! Optional user configuration.
//!
//! Read from `$DENPUSH_CONFIG` when set, otherwise from:
//! - Linux/macOS: `~/.config/denpush/config.toml`
//! - Windows: `%APPDATA%/denpush/config.toml`
//!
//! A missing file means defaults. Command-line flags take precedence.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use denpush_deploy::{DEFAULT_ARTIFACT_NAME, DEFAULT_USER_AGENT, HttpSettings};
use denpush_pack::{DEFAULT_LEVEL, MAX_LEVEL, MIN_LEVEL};
use serde::{Deserialize, Serialize};

const CONFIG_ENV: &str = "DENPUSH_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Compression level (1–100) used when `-c` is not given.
    #[serde(default = "default_compression_level")]
    pub compression_level: u8,

    /// Base name of the artifact the upload command creates.
    #[serde(default = "default_artifact_name")]
    pub artifact_name: String,

    /// Whole-request timeout for token and upload requests, in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_compression_level() -> u8 {
    DEFAULT_LEVEL
}

fn default_artifact_name() -> String {
    DEFAULT_ARTIFACT_NAME.into()
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            compression_level: default_compression_level(),
            artifact_name: default_artifact_name(),
            request_timeout_secs: None,
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Loads the configuration file, or defaults if there is none.
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&config_path())
    }

    /// Loads `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no configuration file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        let config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.validate()?;

        tracing::debug!(path = %path.display(), "configuration loaded");
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            (MIN_LEVEL..=MAX_LEVEL).contains(&self.compression_level),
            "compression_level must be between {MIN_LEVEL} and {MAX_LEVEL}, got {}",
            self.compression_level
        );
        anyhow::ensure!(
            !self.artifact_name.trim().is_empty(),
            "artifact_name must not be empty"
        );
        Ok(())
    }

    pub fn http_settings(&self) -> HttpSettings {
        HttpSettings {
            timeout: self.request_timeout_secs.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
        }
    }
}

/// Returns the configuration file path.
fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        PathBuf::from(appdata).join("denpush").join("config.toml")
    }

    #[cfg(not(target_os = "windows"))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        PathBuf::from(home)
            .join(".config")
            .join("denpush")
            .join("config.toml")
    }
}

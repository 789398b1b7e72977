//! Reads raw configuration from config files and the process environment.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::error::ConfigSourceError;
use super::keys::KNOWN_KEYS;
use super::raw::RawConfig;

/// Environment variable selecting the per-mode config file.
pub const RUN_MODE: &str = "RUN_MODE";

const DEFAULT_RUN_MODE: &str = "development";
const DEFAULT_CONFIG_DIR: &str = "config";

/// Layered configuration reader.
///
/// Sources, lowest precedence first:
/// 1. `{config_dir}/default.{toml,json,yaml,...}` (optional)
/// 2. `{config_dir}/{run_mode}.{toml,json,yaml,...}` (optional)
/// 3. process environment
///
/// File keys are written in lowercase (`secret_key = "..."`).
#[derive(Debug, Clone)]
pub struct ConfigSource {
    config_dir: PathBuf,
    run_mode: String,
}

impl ConfigSource {
    /// Source rooted at `./config`, run mode taken from `RUN_MODE`.
    #[must_use]
    pub fn from_env() -> Self {
        let run_mode = std::env::var(RUN_MODE).unwrap_or_else(|_| DEFAULT_RUN_MODE.to_string());
        Self {
            config_dir: PathBuf::from(DEFAULT_CONFIG_DIR),
            run_mode,
        }
    }

    /// Read config files from `dir` instead of `./config`.
    #[must_use]
    pub fn with_config_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config_dir = dir.into();
        self
    }

    /// Override the run mode.
    #[must_use]
    pub fn with_run_mode(mut self, run_mode: impl Into<String>) -> Self {
        self.run_mode = run_mode.into();
        self
    }

    /// Directory searched for config files.
    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Active run mode.
    #[must_use]
    pub fn run_mode(&self) -> &str {
        &self.run_mode
    }

    /// Reads every known key into a [`RawConfig`].
    ///
    /// Keys that no source sets stay absent.
    pub fn load(&self) -> Result<RawConfig, ConfigSourceError> {
        debug!(
            config_dir = %self.config_dir.display(),
            run_mode = %self.run_mode,
            "loading configuration"
        );

        let default_file = self.config_dir.join("default");
        let mode_file = self.config_dir.join(&self.run_mode);

        let settings = config::Config::builder()
            .add_source(config::File::with_name(&default_file.to_string_lossy()).required(false))
            .add_source(config::File::with_name(&mode_file.to_string_lossy()).required(false))
            .add_source(config::Environment::default())
            .build()?;

        let mut raw = RawConfig::new();
        for key in KNOWN_KEYS {
            match settings.get_string(&key.to_ascii_lowercase()) {
                Ok(value) => raw.insert(key, value),
                Err(config::ConfigError::NotFound(_)) => {}
                Err(err) => return Err(err.into()),
            }
        }

        debug!(keys = raw.len(), "configuration loaded");
        Ok(raw)
    }
}

impl Default for ConfigSource {
    fn default() -> Self {
        Self::from_env()
    }
}

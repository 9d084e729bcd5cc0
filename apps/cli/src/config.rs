//! Application configuration
//!
//! Settings are layered, later sources winning:
//! 1. Built-in defaults
//! 2. `ward.toml` in the working directory (or the file given with `--config`)
//! 3. Environment variables prefixed `WARD__`, e.g. `WARD__WARD__CAPACITY=10`
//! 4. Command-line flags (applied by the caller)

use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use ward_ledger::WardConfig;

pub const DEFAULT_CONFIG_FILE: &str = "ward.toml";
const ENV_PREFIX: &str = "WARD";
const ENV_SEPARATOR: &str = "__";
const ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ward: WardConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Level for the ward crates; `RUST_LOG` overrides it entirely.
    pub level: String,
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: PathBuf,
    pub file_prefix: String,
    /// `daily`, `hourly`, `minutely` or `never`
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            json: false,
            file_enabled: false,
            file_directory: PathBuf::from("logs"),
            file_prefix: "ward".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

impl AppConfig {
    /// Load from the config file and environment. An explicit `path` must exist;
    /// the default `ward.toml` is optional.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::new(DEFAULT_CONFIG_FILE, config::FileFormat::Toml).required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator(ENV_SEPARATOR)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true),
            )
            .build()
            .context("Failed to read configuration sources")?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.ward.validate()?;
        if !ROTATIONS.contains(&self.logging.file_rotation.as_str()) {
            bail!(
                "logging.file_rotation must be one of {}, got '{}'",
                ROTATIONS.join(", "),
                self.logging.file_rotation
            );
        }
        if self.logging.file_enabled && self.logging.file_prefix.is_empty() {
            bail!("logging.file_prefix must not be empty when file logging is enabled");
        }
        Ok(())
    }
}

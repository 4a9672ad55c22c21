//! Configuration loading for the verifier binary.
//!
//! All fields are required unless explicitly marked optional.

use savedobj_core::{SpaceId, SpaceLayout};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::ScenarioSpec;
use crate::command_fixtures::CommandTemplate;

pub const CONFIG_ENV_VAR: &str = "SAVEDOBJ_VERIFY_CONFIG";

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VerifierConfig {
    /// Base url of the API under test, e.g. `http://localhost:5601`.
    pub base_url: String,
    pub request_timeout_ms: u64,
    /// Dataset loaded around every scenario.
    pub dataset: String,
    /// Optional; the store's default space id, `default` when absent.
    pub default_space: Option<SpaceId>,
    pub fixtures: FixtureConfig,
    /// Optional; the spaces-only matrix runs when empty.
    #[serde(default)]
    pub scenarios: Vec<ScenarioSpec>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FixtureConfig {
    /// Data is prepared outside the verifier.
    Noop,
    Command {
        load: CommandTemplate,
        unload: CommandTemplate,
        timeout_ms: u64,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration file path (use --config or SAVEDOBJ_VERIFY_CONFIG)")]
    MissingConfigPath,
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl VerifierConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: VerifierConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "base_url",
                reason: "must be an http(s) url".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.dataset.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "dataset",
                reason: "must not be empty".to_string(),
            });
        }
        if let FixtureConfig::Command {
            load,
            unload,
            timeout_ms,
        } = &self.fixtures
        {
            if load.program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "fixtures.load.program",
                    reason: "must not be empty".to_string(),
                });
            }
            if unload.program.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "fixtures.unload.program",
                    reason: "must not be empty".to_string(),
                });
            }
            if *timeout_ms == 0 {
                return Err(ConfigError::InvalidValue {
                    field: "fixtures.timeout_ms",
                    reason: "must be > 0".to_string(),
                });
            }
        }
        let mut seen = std::collections::HashSet::new();
        for scenario in &self.scenarios {
            if scenario.description.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "scenarios.description",
                    reason: "must not be empty".to_string(),
                });
            }
            if !seen.insert(scenario.description.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: "scenarios.description",
                    reason: format!("'{}' is listed twice", scenario.description),
                });
            }
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn layout(&self) -> SpaceLayout {
        match &self.default_space {
            Some(space) => SpaceLayout::new(space.clone()),
            None => SpaceLayout::default(),
        }
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from)
}

fn config_path_from_args() -> Option<PathBuf> {
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" {
            return args.next().map(PathBuf::from);
        }
    }
    None
}

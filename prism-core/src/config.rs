//! Configuration loading for the explore engine.
//!
//! All fields are required in the TOML file. `ExploreConfig::standard()` is
//! the one place the stock values live.

use crate::enums::{Aggregator, OrderBy, TaskMode, VisMode};
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_ENV: &str = "PRISM_CONFIG";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExploreConfig {
    pub default_order: OrderBy,
    /// Significance passed to the resolver for fork views
    pub fork_significance: f64,
    pub association_mode: TaskMode,
    pub visual: VisualDefaults,
}

/// Starting values for the visual preference panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VisualDefaults {
    pub aggregator: Aggregator,
    pub default_aggregated: bool,
    pub default_stack: bool,
    pub vis_mode: VisMode,
    pub zoom: bool,
    pub debug: bool,
    pub nlg: bool,
    pub resize_width: u32,
    pub resize_height: u32,
}

impl ExploreConfig {
    /// Stock configuration used when the host does not supply one.
    pub fn standard() -> Self {
        Self {
            default_order: OrderBy::Default,
            fork_significance: 1.0,
            association_mode: TaskMode::Local,
            visual: VisualDefaults {
                aggregator: Aggregator::Sum,
                default_aggregated: false,
                default_stack: true,
                vis_mode: VisMode::Dist,
                zoom: false,
                debug: false,
                nlg: false,
                resize_width: 320,
                resize_height: 320,
            },
        }
    }

    pub fn load() -> Result<Self, ConfigError> {
        let path = config_path_from_args().or_else(config_path_from_env);
        let path = path.ok_or(ConfigError::MissingConfigPath)?;
        let config = Self::from_path(&path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ExploreConfig = toml::from_str(contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.fork_significance.is_finite() || self.fork_significance <= 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "fork_significance",
                reason: "must be a finite number > 0".to_string(),
            });
        }
        if self.visual.resize_width == 0 {
            return Err(ConfigError::InvalidValue {
                field: "visual.resize_width",
                reason: "must be > 0".to_string(),
            });
        }
        if self.visual.resize_height == 0 {
            return Err(ConfigError::InvalidValue {
                field: "visual.resize_height",
                reason: "must be > 0".to_string(),
            });
        }
        Ok(())
    }
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_ENV).ok().map(PathBuf::from)
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

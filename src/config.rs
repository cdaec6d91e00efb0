// src/config.rs

//! Configuration structures for the `painter` binary.
//!
//! Read from a JSON file named by the `PAINTER_CONFIG` environment variable.
//! Every field has a default, so a partial file (or none at all) is fine.

use crate::painter::LoopConfig;
use anyhow::{Context, Result};
use log::{info, warn};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable holding the config file path.
pub const CONFIG_ENV_VAR: &str = "PAINTER_CONFIG";

/// Process-wide configuration, loaded on first access.
pub static CONFIG: Lazy<Config> = Lazy::new(Config::load_or_default);

/// Root of the configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Scheduling loop settings.
    pub painter: LoopConfig,
    pub output: OutputConfig,
}

/// Where presented frames go.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for `frame-NNNNN.ppm` dumps. `None` keeps frames in memory only.
    pub frame_dir: Option<PathBuf>,
}

impl Config {
    /// Parses a JSON config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads from `$PAINTER_CONFIG`, falling back to defaults.
    pub fn load_or_default() -> Self {
        match std::env::var_os(CONFIG_ENV_VAR) {
            Some(path) => {
                let path = PathBuf::from(path);
                match Self::load(&path) {
                    Ok(config) => {
                        info!("Configuration loaded from {}", path.display());
                        config
                    }
                    Err(e) => {
                        warn!("{:#}; using default configuration", e);
                        Self::default()
                    }
                }
            }
            None => {
                info!("{} not set; using default configuration", CONFIG_ENV_VAR);
                Self::default()
            }
        }
    }
}

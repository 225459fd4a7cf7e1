//! Configuration loading for the classifier.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (CLI flag, must exist)
//! 2. `<config dir>/dnn-classify/config.toml` (user, e.g. `~/.config` on Linux)
//! 3. Built-in defaults, which match BVLC GoogLeNet
//!
//! ```toml
//! [run]
//! iterations = 10
//! warmup = 0
//! input_name = "data"
//! output_name = "prob"
//! device = "cpu"
//!
//! [preprocess]
//! width = 224
//! height = 224
//! mean = [104.0, 117.0, 123.0]
//! scale = 1.0
//! swap_rb = false
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::bench::DEFAULT_ITERATIONS;
use crate::model::{DEFAULT_INPUT_NAME, DEFAULT_OUTPUT_NAME, Device};
use crate::preprocess::PreprocessConfig;
use crate::{ClassifyError, Result};

/// Classifier configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub run: RunConfig,
    #[serde(default)]
    pub preprocess: PreprocessConfig,
}

/// How the network is driven.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunConfig {
    /// Timed forward passes (default: 10).
    #[serde(default = "default_iterations")]
    pub iterations: u32,
    /// Untimed passes before timing starts (default: 0).
    #[serde(default)]
    pub warmup: u32,
    /// Input layer name (default: "data").
    #[serde(default = "default_input_name")]
    pub input_name: String,
    /// Output layer name (default: "prob").
    #[serde(default = "default_output_name")]
    pub output_name: String,
    /// Device: "cpu", "cuda" or "cuda:<id>" (default: "cpu").
    #[serde(default = "default_device")]
    pub device: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
            warmup: 0,
            input_name: default_input_name(),
            output_name: default_output_name(),
            device: default_device(),
        }
    }
}

fn default_iterations() -> u32 {
    DEFAULT_ITERATIONS
}

fn default_input_name() -> String {
    DEFAULT_INPUT_NAME.to_string()
}

fn default_output_name() -> String {
    DEFAULT_OUTPUT_NAME.to_string()
}

fn default_device() -> String {
    "cpu".to_string()
}

impl RunConfig {
    /// Parsed execution device.
    pub fn device(&self) -> Result<Device> {
        self.device.parse()
    }
}

impl Config {
    /// Load configuration from the standard locations.
    ///
    /// An explicit path must exist. Without one, the user config is used
    /// when present and the defaults otherwise.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path),
            None => Ok(Self::default()),
        }
    }

    /// Parse a configuration file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ClassifyError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        let config: Self = toml::from_str(&content).map_err(|e| {
            ClassifyError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Resolve the config file path.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(ClassifyError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        Ok(user_config_path().filter(|p| p.exists()))
    }

    /// Reject values that cannot drive a run.
    pub fn validate(&self) -> Result<()> {
        if self.run.iterations == 0 {
            return Err(ClassifyError::Configuration(
                "iterations must be at least 1".to_string(),
            ));
        }
        if self.run.input_name.is_empty() || self.run.output_name.is_empty() {
            return Err(ClassifyError::Configuration(
                "input and output layer names must not be empty".to_string(),
            ));
        }
        self.run.device()?;
        self.preprocess.validate()
    }
}

/// Per-user config location, if the platform has a config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("dnn-classify").join("config.toml"))
}

//! Optional TOML configuration file.
//!
//! ```toml
//! [engine]
//! threshold = 0.55
//! sample_size = 10
//!
//! [confidence]
//! high = 1.0
//! medium = 0.8
//! low = 0.6
//! ```
//!
//! Every key is optional. Command-line flags override the file, and the
//! file overrides the built-in defaults.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use claims_map::EngineOptions;
use claims_model::ConfidenceThresholds;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub engine: EngineOptions,
    pub confidence: ConfidenceThresholds,
}

impl AppConfig {
    /// Parses a configuration document.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    /// Reads the file at `path`, or returns the defaults when no path is
    /// given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration: {}", path.display()))?;
        let config = Self::from_toml_str(&text)
            .with_context(|| format!("Invalid configuration: {}", path.display()))?;
        debug!(
            path = %path.display(),
            threshold = config.engine.threshold,
            sample_size = config.engine.sample_size,
            "loaded configuration"
        );
        Ok(config)
    }

    /// Applies command-line overrides on top of the loaded values.
    #[must_use]
    pub fn with_overrides(mut self, threshold: Option<f64>, sample_size: Option<usize>) -> Self {
        if let Some(threshold) = threshold {
            self.engine.threshold = threshold;
        }
        if let Some(sample_size) = sample_size {
            self.engine.sample_size = sample_size;
        }
        self
    }
}

//! Application configuration.

use std::path::Path;

use ergo_core::Error;
use ergo_pipeline::{AdapterConfig, OutputConfig};
use ergo_rula::ScoringProfile;
use serde::{Deserialize, Serialize};

/// Complete run configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ErgoConfig {
    /// Region tables, rule thresholds and action breakpoints
    pub scoring: ScoringProfile,

    /// Landmark adaptation settings
    pub adapter: AdapterConfig,

    /// Result store settings
    pub output: OutputConfig,
}

impl ErgoConfig {
    /// Load configuration from file, then environment overrides
    pub fn from_file(path: &Path) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(environment())
            .build()?;

        settings.try_deserialize()
    }

    pub fn validate(&self) -> ergo_core::Result<()> {
        self.scoring.validate()?;

        let min = self.adapter.min_confidence;
        if !(0.0..=1.0).contains(&min) {
            return Err(Error::Config(format!(
                "adapter.min_confidence must lie in [0, 1], got {min}"
            )));
        }
        Ok(())
    }
}

/// `ERGO_OUTPUT__INCLUDE_FRAME_INDEX=false` style overrides
fn environment() -> config::Environment {
    config::Environment::with_prefix("ERGO")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

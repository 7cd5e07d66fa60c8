//! Workspace configuration
//!
//! Loaded from TOML; every table and field is optional.
//!
//! ```toml
//! [orchestrator]
//! phase_delay_ms = 250
//! report_title = "Ops Review"
//!
//! [simulation]
//! seed = 7
//! error_rate = 0.2
//! min_latency_ms = 100
//! max_latency_ms = 400
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use triage_core::OrchestratorConfig;

/// Default probability that a simulated agent fails
pub const DEFAULT_ERROR_RATE: f64 = 0.1;
/// Default lower bound of simulated tool latency
pub const DEFAULT_MIN_LATENCY_MS: u64 = 150;
/// Default upper bound of simulated tool latency
pub const DEFAULT_MAX_LATENCY_MS: u64 = 600;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Simulated agent behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Seed for reproducible runs; `None` draws from OS entropy
    pub seed: Option<u64>,
    /// Probability in `[0, 1]` that an invocation fails
    pub error_rate: f64,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
}

impl SimulationConfig {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_error_rate(mut self, rate: f64) -> Self {
        self.error_rate = rate;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_latency_ms(mut self, min: u64, max: u64) -> Self {
        self.min_latency_ms = min;
        self.max_latency_ms = max;
        self
    }

    /// No simulated latency at all
    #[inline]
    #[must_use]
    pub fn instant(self) -> Self {
        self.with_latency_ms(0, 0)
    }

    /// Check ranges
    ///
    /// # Errors
    /// `ConfigError::Invalid` when the error rate is outside `[0, 1]` or the
    /// latency bounds are inverted.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.error_rate) {
            return Err(ConfigError::Invalid(format!(
                "error_rate must be within [0, 1], got {}",
                self.error_rate
            )));
        }
        if self.min_latency_ms > self.max_latency_ms {
            return Err(ConfigError::Invalid(format!(
                "min_latency_ms ({}) exceeds max_latency_ms ({})",
                self.min_latency_ms, self.max_latency_ms
            )));
        }
        Ok(())
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: None,
            error_rate: DEFAULT_ERROR_RATE,
            min_latency_ms: DEFAULT_MIN_LATENCY_MS,
            max_latency_ms: DEFAULT_MAX_LATENCY_MS,
        }
    }
}

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    pub orchestrator: OrchestratorConfig,
    pub simulation: SimulationConfig,
}

impl TriageConfig {
    /// Parse and validate TOML text
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, `ConfigError::Invalid` when
    /// validation fails.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` when the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded config file");
        Self::from_toml_str(&text)
    }

    /// # Errors
    /// See [`SimulationConfig::validate`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()
    }
}

//! Orchestrator configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default report title
pub const DEFAULT_REPORT_TITLE: &str = "Decision Report";

/// Orchestrator configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Fixed pacing delay inserted between lifecycle phases, in milliseconds
    pub phase_delay_ms: u64,
    /// Title stamped on every report
    pub report_title: String,
}

impl OrchestratorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With pacing delay
    #[inline]
    #[must_use]
    pub fn with_phase_delay_ms(mut self, ms: u64) -> Self {
        self.phase_delay_ms = ms;
        self
    }

    /// With report title
    #[inline]
    #[must_use]
    pub fn with_report_title(mut self, title: impl Into<String>) -> Self {
        self.report_title = title.into();
        self
    }

    /// Pacing delay, `None` when disabled
    #[inline]
    #[must_use]
    pub fn phase_delay(&self) -> Option<Duration> {
        (self.phase_delay_ms > 0).then(|| Duration::from_millis(self.phase_delay_ms))
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            phase_delay_ms: 0,
            report_title: DEFAULT_REPORT_TITLE.to_string(),
        }
    }
}

//! Control-cycle phase machine
//!
//! `idle → planning → executing → synthesizing → complete`, with `error`
//! absorbing from any non-idle phase.

use crate::error::PhaseError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of one control cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CyclePhase {
    #[default]
    Idle,
    Planning,
    Executing,
    Synthesizing,
    Complete,
    Error,
}

impl CyclePhase {
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        allowed_transitions(*self).is_empty()
    }
}

impl fmt::Display for CyclePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CyclePhase::Idle => "idle",
            CyclePhase::Planning => "planning",
            CyclePhase::Executing => "executing",
            CyclePhase::Synthesizing => "synthesizing",
            CyclePhase::Complete => "complete",
            CyclePhase::Error => "error",
        };
        f.write_str(s)
    }
}

/// Validates a phase transition.
pub fn validate_transition(from: CyclePhase, to: CyclePhase) -> Result<(), PhaseError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(PhaseError::IllegalTransition { from, to })
    }
}

#[must_use]
pub fn allowed_transitions(from: CyclePhase) -> Vec<CyclePhase> {
    use CyclePhase::*;
    match from {
        Idle => vec![Planning],
        Planning => vec![Executing, Error],
        Executing => vec![Synthesizing, Error],
        Synthesizing => vec![Complete, Error],
        Complete => vec![Error],
        Error => vec![],
    }
}

fn allowed(from: CyclePhase, to: CyclePhase) -> bool {
    allowed_transitions(from).into_iter().any(|s| s == to)
}

/// Tracks the phase of a single cycle
///
/// A tracker is created fresh for every cycle and never reused.
#[derive(Debug, Clone, Default)]
pub struct PhaseTracker {
    current: CyclePhase,
    history: Vec<CyclePhase>,
}

impl PhaseTracker {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn current(&self) -> CyclePhase {
        self.current
    }

    /// Phases entered so far, in order
    #[inline]
    #[must_use]
    pub fn history(&self) -> &[CyclePhase] {
        &self.history
    }

    /// Move to the next phase
    pub fn advance(&mut self, to: CyclePhase) -> Result<(), PhaseError> {
        validate_transition(self.current, to)?;
        tracing::debug!(from = %self.current, to = %to, "cycle phase transition");
        self.current = to;
        self.history.push(to);
        Ok(())
    }

    /// Enter the absorbing error phase; no-op from idle or error
    pub fn fail(&mut self) {
        if validate_transition(self.current, CyclePhase::Error).is_ok() {
            self.current = CyclePhase::Error;
            self.history.push(CyclePhase::Error);
        }
    }
}

//! Error types for triage core
//!
//! Only cycle-level failures are errors. Agent-level failures are data
//! (`AgentResponse` with an `error` status) and never surface here.

use crate::phase::CyclePhase;
use crate::types::IntentType;

/// Cycle-level failure; the caller receives no partial result
#[derive(Debug, thiserror::Error)]
pub enum OrchestrationError {
    /// Classifier broke its never-empty plan invariant
    #[error("empty execution plan for intent {0}")]
    EmptyPlan(IntentType),

    /// An observer hook rejected a transition
    #[error("observer failed during {phase}: {source}")]
    Observer {
        /// Phase in which the hook ran
        phase: CyclePhase,
        /// Underlying hook error
        #[source]
        source: ObserverError,
    },

    /// Phase machine violation
    #[error("phase error: {0}")]
    Phase(#[from] PhaseError),
}

impl OrchestrationError {
    /// Phase the cycle was in when it aborted, if known
    #[must_use]
    pub fn phase(&self) -> Option<CyclePhase> {
        match self {
            Self::EmptyPlan(_) => Some(CyclePhase::Planning),
            Self::Observer { phase, .. } => Some(*phase),
            Self::Phase(PhaseError::IllegalTransition { from, .. }) => Some(*from),
        }
    }

    /// Whether starting a fresh cycle may succeed
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Observer { .. })
    }
}

/// Phase machine errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    #[error("illegal phase transition: {from} -> {to}")]
    IllegalTransition { from: CyclePhase, to: CyclePhase },
}

/// Error returned by a lifecycle observer hook
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ObserverError(pub String);

impl ObserverError {
    #[inline]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

//! Triage Core - classification, control cycle and synthesis
//!
//! The deterministic heart of triage:
//! - Classifies free text into a typed intent profile with fixed rule tables
//! - Resolves reconciliation instances and servers mentioned in the text
//! - Runs planned agents strictly in sequence, emitting lifecycle events
//! - Merges agent responses into a single decision report
//!
//! # Example
//!
//! ```rust,ignore
//! use triage_core::{AgentRegistry, NoopObserver, Orchestrator, OrchestratorConfig};
//!
//! # async fn example(registry: AgentRegistry) -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = Orchestrator::new(registry, OrchestratorConfig::new());
//!
//! let result = orchestrator
//!     .run_cycle("Why did yesterday's FX reconciliation fail?", &NoopObserver)
//!     .await?;
//!
//! println!("{}", result.report_data.to_markdown());
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod agent;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ids;
pub mod observer;
pub mod orchestrator;
pub mod phase;
pub mod report;
pub mod resolver;
pub mod synthesizer;
pub mod types;

// Re-exports for convenience
pub use agent::{Agent, AgentRegistry};
pub use classifier::{classify, IntentClassifier};
pub use config::OrchestratorConfig;
pub use error::{ObserverError, OrchestrationError, PhaseError};
pub use ids::{IdGenerator, SequentialIdGenerator, UlidIdGenerator};
pub use observer::{ChannelObserver, CycleEvent, CycleObserver, NoopObserver, TracingObserver};
pub use orchestrator::Orchestrator;
pub use phase::{CyclePhase, PhaseTracker};
pub use report::{
    DelayedReconPanel, DomainSection, FindingStatus, HighMtpPanel, MtpAccount, ReconJob,
    ReportData, ReportFinding, ResourceGauge, ServerDiagnosisPanel,
};
pub use resolver::{DomainResolver, InstanceRef, ReferenceCatalog, ServerRef};
pub use synthesizer::{ReportSynthesizer, ServerReading};
pub use types::{
    AgentNode, AgentResponse, AgentStatus, BusinessDomain, ExtractedContext, IntentProfile,
    IntentType, OrchestrationResult, Severity, ToolCall, ToolCallStatus, UseCase,
    DOMAIN_MARKER_KEY,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with triage core
    pub use crate::{
        Agent, AgentRegistry, AgentResponse, CycleObserver, IntentProfile, Orchestrator,
        OrchestratorConfig, ReportData,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Triage Agents - simulated agents and workspace configuration
//!
//! Provides:
//! - Five simulated agents driven by one seeded random source
//! - TOML configuration for the orchestrator and the simulation
//! - [`default_registry`] wiring every agent for the orchestrator

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod agents;
pub mod config;
pub mod simulation;

pub use agents::{GovernanceReviewer, ReconMonitor, ServerHealth, SignalWatcher, TraceAnalyst};
pub use config::{ConfigError, SimulationConfig, TriageConfig};
pub use simulation::{AgentIdentity, Operation, Simulation, SimulationRng};

use std::sync::Arc;
use triage_core::{AgentRegistry, Orchestrator};

/// Registry with all five simulated agents sharing one simulation
#[must_use]
pub fn default_registry(sim: Arc<Simulation>) -> AgentRegistry {
    AgentRegistry::new()
        .with(Arc::new(SignalWatcher::new(Arc::clone(&sim))))
        .with(Arc::new(TraceAnalyst::new(Arc::clone(&sim))))
        .with(Arc::new(GovernanceReviewer::new(Arc::clone(&sim))))
        .with(Arc::new(ReconMonitor::new(Arc::clone(&sim))))
        .with(Arc::new(ServerHealth::new(sim)))
}

/// Orchestrator over the simulated agents described by `config`
#[must_use]
pub fn build_orchestrator(config: &TriageConfig) -> Orchestrator {
    let sim = Arc::new(Simulation::new(config.simulation.clone()));
    Orchestrator::new(default_registry(sim), config.orchestrator.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use triage_core::types::agents;

    #[test]
    fn default_registry_has_every_agent() {
        let sim = Arc::new(Simulation::new(SimulationConfig::new().with_seed(1)));
        let registry = default_registry(sim);

        assert_eq!(registry.len(), 5);
        for id in [
            agents::SIGNAL_WATCHER,
            agents::TRACE_ANALYST,
            agents::GOVERNANCE_REVIEWER,
            agents::RECON_MONITOR,
            agents::SERVER_HEALTH,
        ] {
            assert!(registry.contains(id), "missing {id}");
        }
        assert_eq!(
            registry.get(agents::RECON_MONITOR).map(|a| a.display_name()),
            Some("Recon Monitor")
        );
    }
}

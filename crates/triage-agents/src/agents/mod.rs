//! Simulated agents
//!
//! Each agent performs two tool calls on success and fabricates plausible
//! findings from the shared [`Simulation`](crate::simulation::Simulation).
//! On the error coin-flip it performs a single failing call instead.

mod governance_reviewer;
mod recon_monitor;
mod server_health;
mod signal_watcher;
mod trace_analyst;

pub use governance_reviewer::GovernanceReviewer;
pub use recon_monitor::ReconMonitor;
pub use server_health::ServerHealth;
pub use signal_watcher::SignalWatcher;
pub use trace_analyst::TraceAnalyst;

use serde_json::{Map, Value};

/// Payload map from a `json!` object literal
pub(crate) fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

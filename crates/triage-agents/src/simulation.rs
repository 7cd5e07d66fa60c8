//! Simulation support shared by the agents
//!
//! Every random draw (latency, the error coin-flip, fabricated readings)
//! goes through one [`SimulationRng`], so a seeded run is reproducible as
//! long as agents are invoked in the same order.

use crate::config::SimulationConfig;
use chrono::Utc;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use triage_core::{
    AgentResponse, DomainResolver, IdGenerator, ToolCall, ToolCallStatus, UlidIdGenerator,
};

/// Shared random source
#[derive(Debug)]
pub struct SimulationRng {
    inner: Mutex<StdRng>,
}

impl SimulationRng {
    /// Reproducible stream
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            inner: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    /// Stream seeded from OS entropy
    #[must_use]
    pub fn from_entropy() -> Self {
        Self {
            inner: Mutex::new(StdRng::from_os_rng()),
        }
    }

    #[must_use]
    pub fn new(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::from_entropy, Self::seeded)
    }

    /// `true` with probability `p`, clamped to `[0, 1]`
    pub fn chance(&self, p: f64) -> bool {
        let p = if p.is_nan() { 0.0 } else { p.clamp(0.0, 1.0) };
        self.inner.lock().random_bool(p)
    }

    /// Uniform integer in `[low, high]`; `low` when the range is empty
    pub fn int_between(&self, low: u64, high: u64) -> u64 {
        if low >= high {
            return low;
        }
        self.inner.lock().random_range(low..=high)
    }

    /// Uniform float in `[low, high)` rounded to `decimals` places
    pub fn float_between(&self, low: f64, high: f64, decimals: i32) -> f64 {
        let raw = if low < high {
            self.inner.lock().random_range(low..high)
        } else {
            low
        };
        let scale = 10f64.powi(decimals);
        (raw * scale).round() / scale
    }

    /// Random element of a non-empty slice
    pub fn pick<'a, T>(&self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            return None;
        }
        let index = self.inner.lock().random_range(0..items.len());
        items.get(index)
    }
}

/// Identity of a simulated agent
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentIdentity {
    pub id: &'static str,
    pub display_name: &'static str,
    /// Machine-readable reason code reported on failure
    pub failure_reason: &'static str,
}

/// One tool operation an agent performs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    pub name: &'static str,
    pub label: &'static str,
}

/// Shared environment of the simulated agents
pub struct Simulation {
    config: SimulationConfig,
    rng: SimulationRng,
    ids: Arc<dyn IdGenerator>,
    resolver: DomainResolver,
}

impl Simulation {
    #[must_use]
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            rng: SimulationRng::new(config.seed),
            config,
            ids: Arc::new(UlidIdGenerator),
            resolver: DomainResolver::default(),
        }
    }

    /// With a custom id generator for tool calls
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// With a custom reference catalog lookup
    #[must_use]
    pub fn with_resolver(mut self, resolver: DomainResolver) -> Self {
        self.resolver = resolver;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    #[inline]
    #[must_use]
    pub fn rng(&self) -> &SimulationRng {
        &self.rng
    }

    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &DomainResolver {
        &self.resolver
    }

    /// Error coin-flip for one invocation
    pub fn should_fail(&self) -> bool {
        self.rng.chance(self.config.error_rate)
    }

    /// Sample a latency, sleep for it, and return it
    pub async fn simulate_latency(&self) -> u64 {
        let ms = self
            .rng
            .int_between(self.config.min_latency_ms, self.config.max_latency_ms);
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
        ms
    }

    /// Perform a successful tool call
    pub async fn call(
        &self,
        agent: &AgentIdentity,
        op: Operation,
        input: Value,
        output: Value,
    ) -> ToolCall {
        let started_at = Utc::now();
        let duration_ms = self.simulate_latency().await;
        ToolCall {
            id: self.ids.next(),
            agent_id: agent.id.to_string(),
            agent_name: agent.display_name.to_string(),
            operation: op.name.to_string(),
            operation_label: op.label.to_string(),
            input,
            output: Some(output),
            status: ToolCallStatus::Success,
            started_at,
            duration_ms,
        }
    }

    /// Perform a tool call that fails, and wrap it into a failed response
    pub async fn fail(
        &self,
        agent: &AgentIdentity,
        op: Operation,
        input: Value,
        summary: impl Into<String>,
    ) -> AgentResponse {
        let started_at = Utc::now();
        let duration_ms = self.simulate_latency().await;
        let call = ToolCall {
            id: self.ids.next(),
            agent_id: agent.id.to_string(),
            agent_name: agent.display_name.to_string(),
            operation: op.name.to_string(),
            operation_label: op.label.to_string(),
            input,
            output: None,
            status: ToolCallStatus::Error,
            started_at,
            duration_ms,
        };
        tracing::debug!(agent = agent.id, operation = op.name, "simulated failure");
        AgentResponse::failed(
            agent.id,
            agent.display_name,
            call,
            agent.failure_reason,
            summary,
        )
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("config", &self.config)
            .field("rng", &self.rng)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use triage_core::SequentialIdGenerator;

    const AGENT: AgentIdentity = AgentIdentity {
        id: "probe",
        display_name: "Probe",
        failure_reason: "probe offline",
    };
    const OP: Operation = Operation {
        name: "ping",
        label: "Ping target",
    };

    #[test]
    fn seeded_streams_repeat() {
        let a = SimulationRng::seeded(42);
        let b = SimulationRng::seeded(42);
        let left: Vec<u64> = (0..16).map(|_| a.int_between(0, 1_000)).collect();
        let right: Vec<u64> = (0..16).map(|_| b.int_between(0, 1_000)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn chance_extremes() {
        let rng = SimulationRng::seeded(1);
        assert!((0..50).all(|_| rng.chance(1.0)));
        assert!((0..50).all(|_| !rng.chance(0.0)));
        assert!(!rng.chance(f64::NAN));
    }

    #[test]
    fn ranges_stay_in_bounds() {
        let rng = SimulationRng::seeded(3);
        for _ in 0..100 {
            let i = rng.int_between(5, 9);
            assert!((5..=9).contains(&i));
            let f = rng.float_between(0.5, 0.75, 2);
            assert!((0.5..=0.75).contains(&f));
        }
        assert_eq!(rng.int_between(7, 7), 7);
        assert_eq!(rng.pick::<u8>(&[]), None);
    }

    #[tokio::test]
    async fn failed_call_has_reason_and_no_output() {
        let sim = Simulation::new(SimulationConfig::new().with_seed(9).instant())
            .with_id_generator(Arc::new(SequentialIdGenerator::new("tc")));

        let resp = sim.fail(&AGENT, OP, json!({}), "probe timed out").await;
        assert!(resp.is_error());
        assert_eq!(resp.reason(), Some("probe offline"));
        assert_eq!(resp.tool_calls[0].id, "tc-1");
        assert_eq!(resp.tool_calls[0].output, None);
        assert_eq!(resp.tool_calls[0].duration_ms, 0);
    }

    #[tokio::test]
    async fn successful_call_records_output() {
        let sim = Simulation::new(SimulationConfig::new().with_seed(9).instant());
        let call = sim.call(&AGENT, OP, json!({"host": "a"}), json!({"up": true})).await;
        assert_eq!(call.status, ToolCallStatus::Success);
        assert_eq!(call.operation_label, "Ping target");
        assert_eq!(call.output, Some(json!({"up": true})));
    }
}

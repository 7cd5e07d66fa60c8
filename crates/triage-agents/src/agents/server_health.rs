use super::object;
use crate::simulation::{AgentIdentity, Operation, Simulation};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use triage_core::types::agents::SERVER_HEALTH;
use triage_core::{Agent, AgentResponse, IntentProfile, ServerReading, UseCase, DOMAIN_MARKER_KEY};

const IDENTITY: AgentIdentity = AgentIdentity {
    id: SERVER_HEALTH,
    display_name: "Server Health",
    failure_reason: "telemetry unavailable",
};

const SAMPLE: Operation = Operation {
    name: "sample_resources",
    label: "Sample CPU, memory and disk",
};
const COUNT_JOBS: Operation = Operation {
    name: "count_active_jobs",
    label: "Count active jobs on host",
};

const UNKNOWN_SERVER: &str = "unknown-server";

/// Server resource health
#[derive(Debug, Clone)]
pub struct ServerHealth {
    sim: Arc<Simulation>,
}

impl ServerHealth {
    #[must_use]
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }

    /// Server and owning instance from the profile, the text, or the catalog
    fn target(&self, text: &str, profile: Option<&IntentProfile>) -> (String, Option<String>) {
        let resolver = self.sim.resolver();
        let context = profile.and_then(|p| p.extracted_context.as_ref());

        let server_id = context
            .and_then(|c| c.server_id.clone())
            .or_else(|| resolver.resolve_server(text).map(|s| s.id.clone()))
            .or_else(|| resolver.catalog().servers.first().map(|s| s.id.clone()))
            .unwrap_or_else(|| UNKNOWN_SERVER.to_string());

        let instance_id = context
            .and_then(|c| c.instance_id.clone())
            .or_else(|| resolver.owning_instance(&server_id).map(|i| i.id.clone()));

        (server_id, instance_id)
    }
}

#[async_trait]
impl Agent for ServerHealth {
    fn id(&self) -> &str {
        IDENTITY.id
    }

    fn display_name(&self) -> &str {
        IDENTITY.display_name
    }

    async fn invoke(&self, text: &str, profile: Option<&IntentProfile>) -> AgentResponse {
        let (server_id, instance_id) = self.target(text, profile);
        let host = json!({ "server_id": server_id });
        if self.sim.should_fail() {
            return self
                .sim
                .fail(
                    &IDENTITY,
                    SAMPLE,
                    host,
                    format!("no telemetry received from {server_id}"),
                )
                .await;
        }

        let rng = self.sim.rng();
        let reading = ServerReading {
            server_id: server_id.clone(),
            instance_id,
            cpu_pct: rng.float_between(20.0, 99.0, 1),
            memory_pct: rng.float_between(30.0, 98.0, 1),
            disk_pct: rng.float_between(20.0, 95.0, 1),
            active_jobs: rng.int_between(0, 12),
        };

        let sampled = self
            .sim
            .call(
                &IDENTITY,
                SAMPLE,
                host.clone(),
                json!({
                    "cpu_pct": reading.cpu_pct,
                    "memory_pct": reading.memory_pct,
                    "disk_pct": reading.disk_pct,
                }),
            )
            .await;
        let counted = self
            .sim
            .call(&IDENTITY, COUNT_JOBS, host, json!({ "active_jobs": reading.active_jobs }))
            .await;

        let over: Vec<String> = reading
            .gauges()
            .into_iter()
            .filter(|g| g.is_over())
            .map(|g| g.name)
            .collect();
        let summary = if over.is_empty() {
            format!(
                "Server Health sees {server_id} within thresholds with {} active jobs.",
                reading.active_jobs
            )
        } else {
            format!(
                "Server Health sees {server_id} over threshold on {} with {} active jobs.",
                over.join(", "),
                reading.active_jobs
            )
        };

        AgentResponse::succeeded(
            IDENTITY.id,
            IDENTITY.display_name,
            vec![sampled, counted],
            summary,
            object(json!({
                DOMAIN_MARKER_KEY: UseCase::ServerDiagnosis.marker(),
                "server_id": reading.server_id,
                "instance_id": reading.instance_id,
                "cpu_pct": reading.cpu_pct,
                "memory_pct": reading.memory_pct,
                "disk_pct": reading.disk_pct,
                "active_jobs": reading.active_jobs,
            })),
        )
    }
}

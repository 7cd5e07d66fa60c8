use super::object;
use crate::simulation::{AgentIdentity, Operation, Simulation};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use triage_core::types::agents::TRACE_ANALYST;
use triage_core::{Agent, AgentResponse, IntentProfile};

const IDENTITY: AgentIdentity = AgentIdentity {
    id: TRACE_ANALYST,
    display_name: "Trace Analyst",
    failure_reason: "trace store unavailable",
};

const QUERY: Operation = Operation {
    name: "query_traces",
    label: "Query distributed trace store",
};
const CORRELATE: Operation = Operation {
    name: "correlate_root_cause",
    label: "Correlate spans to a root cause",
};

/// (affected service, root cause)
const CAUSES: &[(&str, &str)] = &[
    ("settlement-gateway", "connection pool exhaustion"),
    ("fx-rate-feed", "stale rate snapshot from upstream provider"),
    ("recon-matcher", "batch window overrun after late file arrival"),
    ("ledger-writer", "lock contention on posting table"),
    ("payment-router", "certificate expiry on outbound SWIFT link"),
];

/// Dependency tracing and root-cause analysis
#[derive(Debug, Clone)]
pub struct TraceAnalyst {
    sim: Arc<Simulation>,
}

impl TraceAnalyst {
    #[must_use]
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }
}

#[async_trait]
impl Agent for TraceAnalyst {
    fn id(&self) -> &str {
        IDENTITY.id
    }

    fn display_name(&self) -> &str {
        IDENTITY.display_name
    }

    async fn invoke(&self, text: &str, _profile: Option<&IntentProfile>) -> AgentResponse {
        let query = json!({ "query": text, "lookback_hours": 24 });
        if self.sim.should_fail() {
            return self
                .sim
                .fail(&IDENTITY, QUERY, query, "trace store rejected the span query")
                .await;
        }

        let rng = self.sim.rng();
        let correlated = rng.int_between(3, 40);
        let spans = correlated * rng.int_between(4, 12);
        let queried = self
            .sim
            .call(&IDENTITY, QUERY, query, json!({ "traces": correlated, "spans": spans }))
            .await;

        let (service, cause) = rng
            .pick(CAUSES)
            .copied()
            .unwrap_or(("unknown-service", "undetermined"));
        let confidence = rng.float_between(0.55, 0.98, 2);
        let correlated_call = self
            .sim
            .call(
                &IDENTITY,
                CORRELATE,
                json!({ "traces": correlated }),
                json!({ "root_cause": cause, "confidence": confidence }),
            )
            .await;

        AgentResponse::succeeded(
            IDENTITY.id,
            IDENTITY.display_name,
            vec![queried, correlated_call],
            format!(
                "Trace Analyst correlated {correlated} traces; likely root cause is {cause} in {service}."
            ),
            object(json!({
                "root_cause": cause,
                "confidence": confidence,
                "affected_service": service,
                "correlated_traces": correlated,
            })),
        )
    }
}

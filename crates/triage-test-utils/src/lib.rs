//! Testing utilities for the triage workspace
//!
//! Shared stub agents, recording observers and fixtures.

#![allow(missing_docs)]

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use triage_core::types::agents;
use triage_core::{
    Agent, AgentNode, AgentRegistry, AgentResponse, CycleEvent, CycleObserver, IntentProfile,
    ObserverError, Orchestrator, OrchestratorConfig, SequentialIdGenerator, ToolCall,
    ToolCallStatus,
};

/// Display names used by the stub fixtures
pub fn display_name_for(agent_id: &str) -> &'static str {
    match agent_id {
        agents::SIGNAL_WATCHER => "Signal Watcher",
        agents::TRACE_ANALYST => "Trace Analyst",
        agents::GOVERNANCE_REVIEWER => "Governance Reviewer",
        agents::RECON_MONITOR => "Recon Monitor",
        agents::SERVER_HEALTH => "Server Health",
        _ => "Stub Agent",
    }
}

pub fn tool_call(agent_id: &str, operation: &str, status: ToolCallStatus) -> ToolCall {
    ToolCall {
        id: format!("{agent_id}-{operation}"),
        agent_id: agent_id.to_string(),
        agent_name: display_name_for(agent_id).to_string(),
        operation: operation.to_string(),
        operation_label: operation.replace('_', " "),
        input: json!({}),
        output: (status == ToolCallStatus::Success).then(|| json!({"ok": true})),
        status,
        started_at: Utc::now(),
        duration_ms: 1,
    }
}

/// Successful response with the given payload entries
pub fn ok_response(agent_id: &str, summary: &str, payload: Value) -> AgentResponse {
    let payload = match payload {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    AgentResponse::succeeded(
        agent_id,
        display_name_for(agent_id),
        vec![tool_call(agent_id, "collect", ToolCallStatus::Success)],
        summary,
        payload,
    )
}

/// Payload of a healthy, unremarkable finding for the agent
pub fn quiet_payload(agent_id: &str) -> Value {
    match agent_id {
        agents::SIGNAL_WATCHER => json!({"anomaly_detected": false, "anomaly_score": 0.12}),
        agents::TRACE_ANALYST => json!({
            "root_cause": "no dominant cause",
            "confidence": 0.4,
            "affected_service": "ledger-writer",
            "correlated_traces": 2,
        }),
        agents::GOVERNANCE_REVIEWER => json!({
            "approved": true,
            "violations": [],
            "policies_checked": 10,
        }),
        _ => json!({}),
    }
}

/// Failed response carrying a single error call and the reason code
pub fn error_response(agent_id: &str, reason: &str) -> AgentResponse {
    let name = display_name_for(agent_id);
    AgentResponse::failed(
        agent_id,
        name,
        tool_call(agent_id, "collect", ToolCallStatus::Error),
        reason,
        format!("{name} could not complete: {reason}"),
    )
}

/// Agent that always returns the same response
#[derive(Debug, Clone)]
pub struct StubAgent {
    id: String,
    name: String,
    response: AgentResponse,
    invocations: Arc<Mutex<Vec<String>>>,
}

impl StubAgent {
    pub fn new(response: AgentResponse) -> Self {
        Self {
            id: response.agent_id.clone(),
            name: response.display_name.clone(),
            response,
            invocations: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Succeeds with a payload that raises no warnings
    pub fn ok(agent_id: &str) -> Self {
        let summary = format!("{} completed.", display_name_for(agent_id));
        Self::new(ok_response(agent_id, &summary, quiet_payload(agent_id)))
    }

    /// Always fails with the given reason code
    pub fn failing(agent_id: &str, reason: &str) -> Self {
        Self::new(error_response(agent_id, reason))
    }

    /// Texts this agent was invoked with, in order
    pub fn invocations(&self) -> Vec<String> {
        self.invocations.lock().clone()
    }
}

#[async_trait]
impl Agent for StubAgent {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self, text: &str, _profile: Option<&IntentProfile>) -> AgentResponse {
        self.invocations.lock().push(text.to_string());
        self.response.clone()
    }
}

/// Records every event; optionally fails on a named event
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    events: Arc<Mutex<Vec<CycleEvent>>>,
    fail_on: Option<&'static str>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fails the first time an event with this name arrives
    pub fn failing_on(event: &'static str) -> Self {
        Self {
            events: Arc::default(),
            fail_on: Some(event),
        }
    }

    pub fn events(&self) -> Vec<CycleEvent> {
        self.events.lock().clone()
    }

    pub fn event_names(&self) -> Vec<&'static str> {
        self.events.lock().iter().map(CycleEvent::name).collect()
    }

    fn record(&self, event: CycleEvent) -> Result<(), ObserverError> {
        if self.fail_on == Some(event.name()) {
            return Err(ObserverError::new(format!("refused {}", event.name())));
        }
        self.events.lock().push(event);
        Ok(())
    }
}

#[async_trait]
impl CycleObserver for RecordingObserver {
    async fn on_planning(&self, profile: &IntentProfile) -> Result<(), ObserverError> {
        self.record(CycleEvent::Planning {
            profile: profile.clone(),
        })
    }

    async fn on_agent_start(&self, display_name: &str, agent_id: &str) -> Result<(), ObserverError> {
        self.record(CycleEvent::AgentStarted {
            display_name: display_name.to_string(),
            agent_id: agent_id.to_string(),
        })
    }

    async fn on_agent_complete(
        &self,
        display_name: &str,
        response: &AgentResponse,
        node: &AgentNode,
    ) -> Result<(), ObserverError> {
        self.record(CycleEvent::AgentCompleted {
            display_name: display_name.to_string(),
            response: response.clone(),
            node: node.clone(),
        })
    }

    async fn on_synthesis(&self, summary: &str) -> Result<(), ObserverError> {
        self.record(CycleEvent::Synthesis {
            summary: summary.to_string(),
        })
    }

    async fn on_complete(&self) -> Result<(), ObserverError> {
        self.record(CycleEvent::Complete)
    }
}

/// Registry of succeeding stubs for every known agent
pub fn stub_registry() -> AgentRegistry {
    [
        agents::SIGNAL_WATCHER,
        agents::TRACE_ANALYST,
        agents::GOVERNANCE_REVIEWER,
        agents::RECON_MONITOR,
        agents::SERVER_HEALTH,
    ]
    .into_iter()
    .fold(AgentRegistry::new(), |registry, id| {
        registry.with(Arc::new(StubAgent::ok(id)))
    })
}

/// Orchestrator with no pacing and sequential node ids (`node-1`, `node-2`, ...)
pub fn deterministic_orchestrator(registry: AgentRegistry) -> Orchestrator {
    Orchestrator::new(registry, OrchestratorConfig::new())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("node")))
}

//! Core types for triage
//!
//! Defines the data that flows through one control cycle:
//! - Intent profiles produced by the classifier
//! - Tool calls and agent responses produced by agents
//! - Agent nodes recorded by the orchestrator
//! - The orchestration result handed back to the caller

use crate::report::ReportData;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Stable agent identifiers known to the rule tables
pub mod agents {
    /// Anomaly scoring over live signal feeds
    pub const SIGNAL_WATCHER: &str = "signal_watcher";
    /// Dependency tracing and root-cause analysis
    pub const TRACE_ANALYST: &str = "trace_analyst";
    /// Compliance and validation review
    pub const GOVERNANCE_REVIEWER: &str = "governance_reviewer";
    /// Reconciliation job and MTP monitoring
    pub const RECON_MONITOR: &str = "recon_monitor";
    /// Server resource health
    pub const SERVER_HEALTH: &str = "server_health";

    /// Complete agent set, in execution order
    pub const FULL_AGENT_SET: &[&str] = &[SIGNAL_WATCHER, TRACE_ANALYST, GOVERNANCE_REVIEWER];
}

/// Payload key agents use to tag domain-specific data with a [`UseCase::marker`]
pub const DOMAIN_MARKER_KEY: &str = "domain";

/// Intent categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentType {
    IncidentResponse,
    AnomalyDetection,
    RootCauseTrace,
    ComplianceCheck,
    PerformanceAnalysis,
    /// Default category, always runs the full agent set
    FullAnalysis,
    DelayedReconQuery,
    HighMtpQuery,
    ServerDiagnosis,
}

impl IntentType {
    /// Machine label (`snake_case`)
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            IntentType::IncidentResponse => "incident_response",
            IntentType::AnomalyDetection => "anomaly_detection",
            IntentType::RootCauseTrace => "root_cause_trace",
            IntentType::ComplianceCheck => "compliance_check",
            IntentType::PerformanceAnalysis => "performance_analysis",
            IntentType::FullAnalysis => "full_analysis",
            IntentType::DelayedReconQuery => "delayed_recon_query",
            IntentType::HighMtpQuery => "high_mtp_query",
            IntentType::ServerDiagnosis => "server_diagnosis",
        }
    }

    /// Human-readable label (underscores replaced with spaces)
    #[must_use]
    pub fn human_label(&self) -> String {
        self.as_str().replace('_', " ")
    }
}

impl fmt::Display for IntentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity, ordered from least to most urgent
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Business domain label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessDomain {
    ForeignExchange,
    Settlements,
    Reconciliation,
    Payments,
    Securities,
    /// Generic fallback
    #[default]
    Operations,
}

impl BusinessDomain {
    /// Display label used in summaries and findings
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            BusinessDomain::ForeignExchange => "FX",
            BusinessDomain::Settlements => "Settlements",
            BusinessDomain::Reconciliation => "Reconciliation",
            BusinessDomain::Payments => "Payments",
            BusinessDomain::Securities => "Securities",
            BusinessDomain::Operations => "Operations",
        }
    }

    /// Whether this is the generic fallback label
    #[inline]
    #[must_use]
    pub fn is_generic(&self) -> bool {
        matches!(self, BusinessDomain::Operations)
    }
}

impl fmt::Display for BusinessDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Domain-specific use case attached to an extracted context
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UseCase {
    DelayedRecon,
    HighMtp,
    ServerDiagnosis,
}

impl UseCase {
    /// Payload marker agents tag their domain data with
    #[must_use]
    pub fn marker(&self) -> &'static str {
        match self {
            UseCase::DelayedRecon => "delayed_recon",
            UseCase::HighMtp => "high_mtp",
            UseCase::ServerDiagnosis => "server_diagnosis",
        }
    }
}

/// Structured context resolved for domain-specific intents
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedContext {
    pub use_case: UseCase,
    pub instance_id: Option<String>,
    pub server_id: Option<String>,
}

/// Typed classification of a free-text request
///
/// Written once by the classifier, read by everything downstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentProfile {
    #[serde(rename = "type")]
    pub intent_type: IntentType,
    pub severity: Severity,
    /// Execution order; never empty, no duplicates
    pub agents_to_invoke: Vec<String>,
    /// Trigger terms of the winning rule, in detection order
    pub primary_keywords: Vec<String>,
    pub domain: BusinessDomain,
    pub extracted_context: Option<ExtractedContext>,
}

impl IntentProfile {
    /// Use case of the extracted context, if any
    #[inline]
    #[must_use]
    pub fn use_case(&self) -> Option<UseCase> {
        self.extracted_context.as_ref().map(|c| c.use_case)
    }
}

/// Outcome of a single tool call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolCallStatus {
    Success,
    Error,
}

/// One atomic operation performed by an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub agent_id: String,
    pub agent_name: String,
    pub operation: String,
    pub operation_label: String,
    pub input: Value,
    /// `None` when the call failed
    pub output: Option<Value>,
    pub status: ToolCallStatus,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u64,
}

/// Overall agent outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Success,
    Error,
}

/// Everything an agent reports back for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: String,
    pub display_name: String,
    pub status: AgentStatus,
    pub tool_calls: Vec<ToolCall>,
    pub summary: String,
    pub payload: Map<String, Value>,
}

impl AgentResponse {
    /// Successful response
    #[must_use]
    pub fn succeeded(
        agent_id: impl Into<String>,
        display_name: impl Into<String>,
        tool_calls: Vec<ToolCall>,
        summary: impl Into<String>,
        payload: Map<String, Value>,
    ) -> Self {
        Self {
            agent_id: agent_id.into(),
            display_name: display_name.into(),
            status: AgentStatus::Success,
            tool_calls,
            summary: summary.into(),
            payload,
        }
    }

    /// Failed response
    ///
    /// Carries exactly one tool call, forced to `error` with no output. The
    /// machine-readable reason code lands in `payload["reason"]`.
    #[must_use]
    pub fn failed(
        agent_id: impl Into<String>,
        display_name: impl Into<String>,
        mut failed_call: ToolCall,
        reason: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        failed_call.status = ToolCallStatus::Error;
        failed_call.output = None;

        let mut payload = Map::new();
        payload.insert("reason".to_string(), Value::String(reason.into()));

        Self {
            agent_id: agent_id.into(),
            display_name: display_name.into(),
            status: AgentStatus::Error,
            tool_calls: vec![failed_call],
            summary: summary.into(),
            payload,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }

    #[inline]
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.status == AgentStatus::Error
    }

    /// Reason code of a failed response
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.payload_str("reason")
    }

    #[must_use]
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(Value::as_str)
    }

    #[must_use]
    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(Value::as_f64)
    }

    #[must_use]
    pub fn payload_u64(&self, key: &str) -> Option<u64> {
        self.payload.get(key).and_then(Value::as_u64)
    }

    #[must_use]
    pub fn payload_bool(&self, key: &str) -> Option<bool> {
        self.payload.get(key).and_then(Value::as_bool)
    }
}

/// Execution record of one agent within a cycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentNode {
    pub id: String,
    pub agent_id: String,
    pub label: String,
    pub status: AgentStatus,
    /// 1-based execution order
    pub order: usize,
}

/// Result of one completed control cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationResult {
    pub intent_type: IntentType,
    pub agent_responses: Vec<AgentResponse>,
    pub agent_nodes: Vec<AgentNode>,
    pub final_summary: String,
    pub report_data: ReportData,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(status: ToolCallStatus) -> ToolCall {
        ToolCall {
            id: "tc-1".into(),
            agent_id: agents::TRACE_ANALYST.into(),
            agent_name: "Trace Analyst".into(),
            operation: "query_traces".into(),
            operation_label: "Query trace store".into(),
            input: json!({}),
            output: Some(json!({"spans": 4})),
            status,
            started_at: Utc::now(),
            duration_ms: 12,
        }
    }

    #[test]
    fn failed_response_forces_single_error_call() {
        let resp = AgentResponse::failed(
            agents::TRACE_ANALYST,
            "Trace Analyst",
            call(ToolCallStatus::Success),
            "trace store unavailable",
            "trace store did not answer",
        );

        assert!(resp.is_error());
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].status, ToolCallStatus::Error);
        assert!(resp.tool_calls[0].output.is_none());
        assert_eq!(resp.reason(), Some("trace store unavailable"));
    }

    #[test]
    fn severity_ordering() {
        assert!(Severity::Critical > Severity::High);
        assert!(Severity::High > Severity::Medium);
        assert!(Severity::Medium > Severity::Low);
        assert_eq!(Severity::default(), Severity::Medium);
    }

    #[test]
    fn intent_labels() {
        assert_eq!(IntentType::RootCauseTrace.as_str(), "root_cause_trace");
        assert_eq!(IntentType::RootCauseTrace.human_label(), "root cause trace");
        let json = serde_json::to_string(&IntentType::HighMtpQuery).unwrap();
        assert_eq!(json, "\"high_mtp_query\"");
    }

    #[test]
    fn payload_accessors() {
        let mut payload = Map::new();
        payload.insert("confidence".into(), json!(0.9));
        payload.insert("approved".into(), json!(false));
        let resp = AgentResponse::succeeded("x", "X", vec![], "ok", payload);

        assert_eq!(resp.payload_f64("confidence"), Some(0.9));
        assert_eq!(resp.payload_bool("approved"), Some(false));
        assert_eq!(resp.payload_str("missing"), None);
    }
}

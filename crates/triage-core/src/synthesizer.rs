//! Report synthesizer
//!
//! Merges every [`AgentResponse`] of a cycle plus the [`IntentProfile`] into
//! one [`ReportData`]. Pure given its inputs; the only ambient value is the
//! execution timestamp, which [`ReportSynthesizer::synthesize_at`] takes
//! explicitly.

use crate::config::DEFAULT_REPORT_TITLE;
use crate::report::{
    DelayedReconPanel, DomainSection, FindingStatus, HighMtpPanel, ReportData, ReportFinding,
    ResourceGauge, ServerDiagnosisPanel,
};
use crate::types::agents::{
    GOVERNANCE_REVIEWER, RECON_MONITOR, SERVER_HEALTH, SIGNAL_WATCHER, TRACE_ANALYST,
};
use crate::types::{AgentResponse, IntentProfile, Severity, UseCase, DOMAIN_MARKER_KEY};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Root-cause confidence at or above which a finding is an error
pub const ROOT_CAUSE_CONFIDENCE_THRESHOLD: f64 = 0.85;
/// CPU utilization threshold, percent
pub const CPU_THRESHOLD_PCT: f64 = 85.0;
/// Memory utilization threshold, percent
pub const MEMORY_THRESHOLD_PCT: f64 = 90.0;
/// Disk utilization threshold, percent
pub const DISK_THRESHOLD_PCT: f64 = 80.0;

/// Summary used when no agent said anything
pub const DEFAULT_SUMMARY: &str = "No agent findings were produced for this request.";
/// Finding value for any errored agent
pub const AGENT_UNAVAILABLE: &str = "Agent unavailable";
/// Action used when no other action fired
pub const NO_ACTION_REQUIRED: &str = "No immediate action required";

/// Resource reading reported by the server health agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerReading {
    pub server_id: String,
    #[serde(default)]
    pub instance_id: Option<String>,
    pub cpu_pct: f64,
    pub memory_pct: f64,
    pub disk_pct: f64,
    pub active_jobs: u64,
}

impl ServerReading {
    /// Gauges paired with their fixed thresholds
    #[must_use]
    pub fn gauges(&self) -> Vec<ResourceGauge> {
        let gauge = |name: &str, value: f64, threshold: f64| ResourceGauge {
            name: name.to_string(),
            value,
            threshold,
        };
        vec![
            gauge("CPU", self.cpu_pct, CPU_THRESHOLD_PCT),
            gauge("Memory", self.memory_pct, MEMORY_THRESHOLD_PCT),
            gauge("Disk", self.disk_pct, DISK_THRESHOLD_PCT),
        ]
    }

    fn into_panel(self) -> ServerDiagnosisPanel {
        ServerDiagnosisPanel {
            gauges: self.gauges(),
            server_id: self.server_id,
            instance_id: self.instance_id,
            active_jobs: self.active_jobs,
        }
    }
}

/// Builds the decision report of a cycle
#[derive(Debug, Clone)]
pub struct ReportSynthesizer {
    title: String,
}

impl ReportSynthesizer {
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }

    /// Synthesize, stamping the current time
    #[must_use]
    pub fn synthesize(&self, responses: &[AgentResponse], profile: &IntentProfile) -> ReportData {
        self.synthesize_at(responses, profile, Utc::now())
    }

    /// Synthesize with an explicit execution timestamp
    #[must_use]
    pub fn synthesize_at(
        &self,
        responses: &[AgentResponse],
        profile: &IntentProfile,
        executed_at: DateTime<Utc>,
    ) -> ReportData {
        let domain_section = select_domain_section(responses, profile);

        ReportData {
            title: self.title.clone(),
            executed_at,
            intent_type: profile.intent_type,
            severity: profile.severity,
            domain: profile.domain,
            summary: build_summary(responses, profile),
            key_findings: build_findings(responses, profile),
            impact_scope: build_impact_scope(responses, profile),
            recommended_actions: build_actions(responses, domain_section.as_ref()),
            domain_section,
        }
    }
}

impl Default for ReportSynthesizer {
    fn default() -> Self {
        Self::new(DEFAULT_REPORT_TITLE)
    }
}

/// Narrative summary: one line per response, joined with single spaces
///
/// Blank summaries are kept as empty lines. The default sentence replaces a
/// join that is empty or whitespace only, and still carries the domain
/// suffix.
#[must_use]
pub fn build_summary(responses: &[AgentResponse], profile: &IntentProfile) -> String {
    let joined = responses
        .iter()
        .map(|r| {
            if r.is_error() {
                format!("{} encountered an error: {}", r.display_name, r.summary)
            } else {
                r.summary.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ");

    let mut summary = if joined.trim().is_empty() {
        DEFAULT_SUMMARY.to_string()
    } else {
        joined
    };

    if !profile.domain.is_generic() {
        summary.push_str(&format!(" ({})", profile.domain.label()));
    }
    summary
}

/// Findings: intent, severity, domain, then one per response
#[must_use]
pub fn build_findings(responses: &[AgentResponse], profile: &IntentProfile) -> Vec<ReportFinding> {
    let mut findings = Vec::with_capacity(responses.len() + 3);

    findings.push(ReportFinding::new(
        "Intent",
        profile.intent_type.human_label(),
        FindingStatus::Info,
    ));

    let severity_status = match profile.severity {
        Severity::Critical => FindingStatus::Error,
        Severity::High => FindingStatus::Warn,
        Severity::Medium | Severity::Low => FindingStatus::Info,
    };
    findings.push(ReportFinding::new(
        "Severity",
        profile.severity.as_str(),
        severity_status,
    ));

    if !profile.domain.is_generic() {
        findings.push(ReportFinding::new(
            "Domain",
            profile.domain.label(),
            FindingStatus::Info,
        ));
    }

    findings.extend(responses.iter().map(agent_finding));
    findings
}

fn agent_finding(resp: &AgentResponse) -> ReportFinding {
    if resp.is_error() {
        return ReportFinding::new(&resp.display_name, AGENT_UNAVAILABLE, FindingStatus::Error);
    }

    match resp.agent_id.as_str() {
        SIGNAL_WATCHER => {
            let score = resp.payload_f64("anomaly_score").unwrap_or(0.0);
            if resp.payload_bool("anomaly_detected").unwrap_or(false) {
                ReportFinding::new(
                    "Anomaly Signals",
                    format!("Anomaly detected (score {score:.2})"),
                    FindingStatus::Warn,
                )
            } else {
                ReportFinding::new(
                    "Anomaly Signals",
                    format!("No anomaly detected (score {score:.2})"),
                    FindingStatus::Ok,
                )
            }
        }
        TRACE_ANALYST => {
            let confidence = resp.payload_f64("confidence").unwrap_or(0.0);
            let cause = resp.payload_str("root_cause").unwrap_or("undetermined");
            let status = if confidence >= ROOT_CAUSE_CONFIDENCE_THRESHOLD {
                FindingStatus::Error
            } else {
                FindingStatus::Warn
            };
            ReportFinding::new(
                "Root Cause",
                format!("{cause} ({:.0}% confidence)", confidence * 100.0),
                status,
            )
        }
        GOVERNANCE_REVIEWER => {
            if is_approved(resp) {
                let checked = resp.payload_u64("policies_checked").unwrap_or(0);
                ReportFinding::new(
                    "Compliance",
                    format!("Approved ({checked} policies checked)"),
                    FindingStatus::Ok,
                )
            } else {
                let violations = string_list(resp, "violations");
                let value = if violations.is_empty() {
                    "Not approved".to_string()
                } else {
                    format!("Not approved: {}", violations.join("; "))
                };
                ReportFinding::new("Compliance", value, FindingStatus::Error)
            }
        }
        SERVER_HEALTH => match parse_payload::<ServerReading>(resp) {
            Some(reading) => {
                let over: Vec<String> = reading
                    .gauges()
                    .iter()
                    .filter(|g| g.is_over())
                    .map(|g| format!("{} {:.0}% > {:.0}%", g.name, g.value, g.threshold))
                    .collect();
                if over.is_empty() {
                    ReportFinding::new(
                        "Resource Health",
                        format!("{} within thresholds", reading.server_id),
                        FindingStatus::Ok,
                    )
                } else {
                    ReportFinding::new("Resource Health", over.join(", "), FindingStatus::Warn)
                }
            }
            None => ReportFinding::new("Resource Health", &resp.summary, FindingStatus::Info),
        },
        RECON_MONITOR => recon_finding(resp),
        _ => ReportFinding::new(&resp.display_name, &resp.summary, FindingStatus::Info),
    }
}

fn recon_finding(resp: &AgentResponse) -> ReportFinding {
    let marker = resp.payload_str(DOMAIN_MARKER_KEY);

    if marker == Some(UseCase::DelayedRecon.marker()) {
        if let Some(panel) = parse_payload::<DelayedReconPanel>(resp) {
            let delayed = panel.jobs.iter().filter(|j| j.is_delayed()).count();
            return if delayed > 0 {
                ReportFinding::new(
                    "Reconciliation Jobs",
                    format!("{delayed} delayed job(s)"),
                    FindingStatus::Warn,
                )
            } else {
                ReportFinding::new("Reconciliation Jobs", "No delayed jobs", FindingStatus::Ok)
            };
        }
    } else if marker == Some(UseCase::HighMtp.marker()) {
        if let Some(panel) = parse_payload::<HighMtpPanel>(resp) {
            let over = panel.over_threshold().count();
            return if over > 0 {
                ReportFinding::new(
                    "MTP",
                    format!("{over} account(s) above MTP {:.2}", panel.threshold),
                    FindingStatus::Warn,
                )
            } else {
                ReportFinding::new("MTP", "All accounts within threshold", FindingStatus::Ok)
            };
        }
    }

    ReportFinding::new(&resp.display_name, &resp.summary, FindingStatus::Info)
}

/// Impact scope, preferring trace data, then server data, then the plan
#[must_use]
pub fn build_impact_scope(responses: &[AgentResponse], profile: &IntentProfile) -> Vec<String> {
    if let Some(trace) = successful(responses, TRACE_ANALYST) {
        let service = trace.payload_str("affected_service").unwrap_or("unknown service");
        let traces = trace.payload_u64("correlated_traces").unwrap_or(0);
        return vec![
            format!("Affected service: {service}"),
            format!("Correlated traces: {traces}"),
        ];
    }

    if let Some(server) = successful(responses, SERVER_HEALTH) {
        let server_id = server.payload_str("server_id").unwrap_or("unknown server");
        let jobs = server.payload_u64("active_jobs").unwrap_or(0);
        return vec![format!("Server: {server_id}"), format!("Active jobs: {jobs}")];
    }

    profile
        .agents_to_invoke
        .iter()
        .map(|id| format!("{} scope", id.replace('_', " ")))
        .collect()
}

/// Recommended actions in fixed order
#[must_use]
pub fn build_actions(responses: &[AgentResponse], section: Option<&DomainSection>) -> Vec<String> {
    let mut actions = Vec::new();

    let failed: Vec<&str> = responses
        .iter()
        .filter(|r| r.is_error())
        .map(|r| r.display_name.as_str())
        .collect();
    if !failed.is_empty() {
        actions.push(format!("Retry failed agents: {}", failed.join(", ")));
    }

    if let Some(watcher) = responses.iter().find(|r| {
        r.is_success()
            && r.agent_id == SIGNAL_WATCHER
            && r.payload_bool("anomaly_detected") == Some(true)
    }) {
        actions.push(format!(
            "Investigate anomalous signals flagged by {}",
            watcher.display_name
        ));
    }

    if let Some(trace) = responses.iter().find(|r| {
        r.is_success()
            && r.agent_id == TRACE_ANALYST
            && r.payload_f64("confidence").unwrap_or(0.0) >= ROOT_CAUSE_CONFIDENCE_THRESHOLD
    }) {
        let cause = trace.payload_str("root_cause").unwrap_or("undetermined");
        actions.push(format!("Remediate root cause: {cause}"));
    }

    if responses
        .iter()
        .any(|r| r.is_success() && r.agent_id == GOVERNANCE_REVIEWER && !is_approved(r))
    {
        actions.push("Resolve governance violations before sign-off".to_string());
    }

    if let Some(section) = section {
        actions.extend(domain_actions(section));
    }

    if actions.is_empty() {
        actions.push(NO_ACTION_REQUIRED.to_string());
    }
    actions
}

fn domain_actions(section: &DomainSection) -> Vec<String> {
    match section {
        DomainSection::DelayedRecon(panel) => {
            let instance = panel.instance_id.as_deref().unwrap_or("its instance");
            panel
                .jobs
                .iter()
                .filter(|j| j.is_delayed())
                .map(|j| {
                    format!(
                        "Escalate delayed job {} ({}) on {}: {} min behind",
                        j.name, j.job_id, instance, j.delay_minutes
                    )
                })
                .collect()
        }
        DomainSection::HighMtp(panel) => panel
            .over_threshold()
            .map(|a| {
                format!(
                    "Review account {} ({}): MTP {:.2} above threshold {:.2}",
                    a.name, a.account_id, a.mtp, panel.threshold
                )
            })
            .collect(),
        DomainSection::ServerDiagnosis(panel) => panel
            .gauges
            .iter()
            .filter(|g| g.is_over())
            .map(|g| {
                format!(
                    "Reduce {} load on {}: {:.0}% exceeds {:.0}%",
                    g.name, panel.server_id, g.value, g.threshold
                )
            })
            .collect(),
    }
}

/// Domain panel for the profile's use case, if its agent succeeded
#[must_use]
pub fn select_domain_section(
    responses: &[AgentResponse],
    profile: &IntentProfile,
) -> Option<DomainSection> {
    let use_case = profile.use_case()?;
    let expected_agent = match use_case {
        UseCase::DelayedRecon | UseCase::HighMtp => RECON_MONITOR,
        UseCase::ServerDiagnosis => SERVER_HEALTH,
    };

    let resp = responses.iter().find(|r| {
        r.is_success()
            && r.agent_id == expected_agent
            && r.payload_str(DOMAIN_MARKER_KEY) == Some(use_case.marker())
    })?;

    let section = match use_case {
        UseCase::DelayedRecon => parse_payload(resp).map(DomainSection::DelayedRecon),
        UseCase::HighMtp => parse_payload(resp).map(DomainSection::HighMtp),
        UseCase::ServerDiagnosis => parse_payload::<ServerReading>(resp)
            .map(|reading| DomainSection::ServerDiagnosis(reading.into_panel())),
    };
    if section.is_none() {
        tracing::warn!(
            agent = %resp.agent_id,
            use_case = use_case.marker(),
            "domain payload did not match its schema"
        );
    }
    section
}

fn successful<'a>(responses: &'a [AgentResponse], agent_id: &str) -> Option<&'a AgentResponse> {
    responses
        .iter()
        .find(|r| r.is_success() && r.agent_id == agent_id)
}

fn is_approved(resp: &AgentResponse) -> bool {
    resp.payload_bool("approved").unwrap_or(false)
}

fn string_list(resp: &AgentResponse, key: &str) -> Vec<String> {
    resp.payload
        .get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn parse_payload<T: DeserializeOwned>(resp: &AgentResponse) -> Option<T> {
    serde_json::from_value(Value::Object(resp.payload.clone())).ok()
}

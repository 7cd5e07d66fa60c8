//! Decision report data
//!
//! The synthesizer writes a [`ReportData`] once per cycle; callers render or
//! serialize it.

use crate::types::{BusinessDomain, IntentType, Severity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// Status of a single finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingStatus {
    Ok,
    Warn,
    Error,
    Info,
}

impl FindingStatus {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Ok => "ok",
            FindingStatus::Warn => "warn",
            FindingStatus::Error => "error",
            FindingStatus::Info => "info",
        }
    }
}

/// Labelled finding in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportFinding {
    pub label: String,
    pub value: String,
    pub status: FindingStatus,
}

impl ReportFinding {
    #[inline]
    #[must_use]
    pub fn new(label: impl Into<String>, value: impl Into<String>, status: FindingStatus) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
            status,
        }
    }
}

/// Reconciliation job row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconJob {
    pub job_id: String,
    pub name: String,
    pub delay_minutes: u64,
    pub status: String,
}

impl ReconJob {
    #[inline]
    #[must_use]
    pub fn is_delayed(&self) -> bool {
        self.delay_minutes > 0
    }
}

/// Account row of an MTP table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MtpAccount {
    pub account_id: String,
    pub name: String,
    pub mtp: f64,
}

/// Utilization gauge with its fixed threshold, both in percent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceGauge {
    pub name: String,
    pub value: f64,
    pub threshold: f64,
}

impl ResourceGauge {
    #[inline]
    #[must_use]
    pub fn is_over(&self) -> bool {
        self.value > self.threshold
    }
}

/// Delayed reconciliation panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayedReconPanel {
    #[serde(default)]
    pub instance_id: Option<String>,
    pub jobs: Vec<ReconJob>,
}

/// High MTP panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HighMtpPanel {
    #[serde(default)]
    pub instance_id: Option<String>,
    pub threshold: f64,
    pub accounts: Vec<MtpAccount>,
}

impl HighMtpPanel {
    /// Accounts strictly above the threshold
    pub fn over_threshold(&self) -> impl Iterator<Item = &MtpAccount> {
        self.accounts.iter().filter(move |a| a.mtp > self.threshold)
    }
}

/// Server diagnosis panel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerDiagnosisPanel {
    pub server_id: String,
    pub instance_id: Option<String>,
    pub gauges: Vec<ResourceGauge>,
    pub active_jobs: u64,
}

/// Structured domain panel, one variant per use case
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DomainSection {
    DelayedRecon(DelayedReconPanel),
    HighMtp(HighMtpPanel),
    ServerDiagnosis(ServerDiagnosisPanel),
}

/// Final decision report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportData {
    pub title: String,
    pub executed_at: DateTime<Utc>,
    pub intent_type: IntentType,
    pub severity: Severity,
    pub domain: BusinessDomain,
    pub summary: String,
    pub key_findings: Vec<ReportFinding>,
    pub impact_scope: Vec<String>,
    pub recommended_actions: Vec<String>,
    pub domain_section: Option<DomainSection>,
}

impl ReportData {
    /// Findings with the given status
    pub fn findings_with(&self, status: FindingStatus) -> impl Iterator<Item = &ReportFinding> {
        self.key_findings.iter().filter(move |f| f.status == status)
    }

    /// Render as markdown
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# {}", self.title);
        let _ = writeln!(
            out,
            "_{} | {} | severity {} | {}_",
            self.executed_at.format("%Y-%m-%d %H:%M:%S UTC"),
            self.intent_type.human_label(),
            self.severity,
            self.domain
        );
        let _ = writeln!(out, "\n{}\n", self.summary);

        out.push_str("## Key findings\n");
        for f in &self.key_findings {
            let _ = writeln!(out, "- [{}] {}: {}", f.status.as_str(), f.label, f.value);
        }

        out.push_str("\n## Impact scope\n");
        for line in &self.impact_scope {
            let _ = writeln!(out, "- {line}");
        }

        out.push_str("\n## Recommended actions\n");
        for (i, action) in self.recommended_actions.iter().enumerate() {
            let _ = writeln!(out, "{}. {}", i + 1, action);
        }

        if let Some(section) = &self.domain_section {
            out.push('\n');
            render_section(&mut out, section);
        }

        out
    }
}

fn render_section(out: &mut String, section: &DomainSection) {
    match section {
        DomainSection::DelayedRecon(panel) => {
            let _ = writeln!(
                out,
                "## Delayed reconciliations ({})",
                panel.instance_id.as_deref().unwrap_or("all instances")
            );
            out.push_str("| Job | Name | Delay (min) | Status |\n|---|---|---|---|\n");
            for job in &panel.jobs {
                let _ = writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    job.job_id, job.name, job.delay_minutes, job.status
                );
            }
        }
        DomainSection::HighMtp(panel) => {
            let _ = writeln!(
                out,
                "## MTP by account ({}, threshold {:.1})",
                panel.instance_id.as_deref().unwrap_or("all instances"),
                panel.threshold
            );
            out.push_str("| Account | Name | MTP |\n|---|---|---|\n");
            for acct in &panel.accounts {
                let _ = writeln!(out, "| {} | {} | {:.2} |", acct.account_id, acct.name, acct.mtp);
            }
        }
        DomainSection::ServerDiagnosis(panel) => {
            let _ = writeln!(
                out,
                "## Server {} ({} active jobs)",
                panel.server_id, panel.active_jobs
            );
            for g in &panel.gauges {
                let marker = if g.is_over() { " !" } else { "" };
                let _ = writeln!(
                    out,
                    "- {}: {:.0}% / {:.0}%{}",
                    g.name, g.value, g.threshold, marker
                );
            }
        }
    }
}

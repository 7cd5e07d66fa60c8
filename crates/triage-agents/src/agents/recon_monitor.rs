use super::object;
use crate::simulation::{AgentIdentity, Operation, Simulation};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use triage_core::types::agents::RECON_MONITOR;
use triage_core::{
    Agent, AgentResponse, IntentProfile, MtpAccount, ReconJob, ToolCall, UseCase,
    DOMAIN_MARKER_KEY,
};

const IDENTITY: AgentIdentity = AgentIdentity {
    id: RECON_MONITOR,
    display_name: "Recon Monitor",
    failure_reason: "recon feed timeout",
};

const LIST_JOBS: Operation = Operation {
    name: "list_recon_jobs",
    label: "List reconciliation jobs",
};
const MEASURE_DELAYS: Operation = Operation {
    name: "measure_job_delays",
    label: "Measure delay against schedule",
};
const LIST_ACCOUNTS: Operation = Operation {
    name: "list_accounts",
    label: "List reconciled accounts",
};
const MEASURE_MTP: Operation = Operation {
    name: "measure_mtp",
    label: "Measure match-to-post times",
};

const JOB_NAMES: &[&str] = &[
    "EOD Cash Match",
    "Trade vs Custody",
    "Nostro Statement Load",
    "FX Confirmation Match",
    "Fee Accrual Check",
];

const ACCOUNT_NAMES: &[&str] = &[
    "Nostro USD",
    "Nostro EUR",
    "Custody Omnibus",
    "Margin Collateral",
    "Suspense GBP",
];

/// MTP threshold, in days
const MTP_THRESHOLD: f64 = 3.0;

/// Reconciliation job and MTP monitoring
#[derive(Debug, Clone)]
pub struct ReconMonitor {
    sim: Arc<Simulation>,
}

impl ReconMonitor {
    #[must_use]
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }

    /// Use case from the profile, else inferred from the text
    fn use_case(text: &str, profile: Option<&IntentProfile>) -> UseCase {
        match profile.and_then(IntentProfile::use_case) {
            Some(use_case @ (UseCase::DelayedRecon | UseCase::HighMtp)) => use_case,
            _ if text.to_lowercase().contains("mtp") => UseCase::HighMtp,
            _ => UseCase::DelayedRecon,
        }
    }

    fn instance(&self, text: &str, profile: Option<&IntentProfile>) -> Option<String> {
        profile
            .and_then(|p| p.extracted_context.as_ref())
            .and_then(|c| c.instance_id.clone())
            .or_else(|| {
                self.sim
                    .resolver()
                    .resolve_instance(text)
                    .map(|i| i.id.clone())
            })
    }

    async fn delayed_jobs(&self, instance: Option<String>) -> AgentResponse {
        let rng = self.sim.rng();
        let prefix = instance.as_deref().unwrap_or("RECON");
        let count = rng.int_between(3, 5);

        let jobs: Vec<ReconJob> = (1..=count)
            .map(|n| {
                let delay_minutes = if rng.chance(0.5) {
                    rng.int_between(5, 180)
                } else {
                    0
                };
                ReconJob {
                    job_id: format!("{prefix}-J{n:03}"),
                    name: rng.pick(JOB_NAMES).copied().unwrap_or("Recon Job").to_string(),
                    delay_minutes,
                    status: (if delay_minutes > 0 { "delayed" } else { "on_time" }).to_string(),
                }
            })
            .collect();
        let delayed = jobs.iter().filter(|j| j.is_delayed()).count();

        let calls = vec![
            self.sim
                .call(
                    &IDENTITY,
                    LIST_JOBS,
                    json!({ "instance_id": instance }),
                    json!({ "jobs": jobs.len() }),
                )
                .await,
            self.sim
                .call(
                    &IDENTITY,
                    MEASURE_DELAYS,
                    json!({ "jobs": jobs.len() }),
                    json!({ "delayed": delayed }),
                )
                .await,
        ];

        let summary = format!(
            "Recon Monitor found {delayed} of {} jobs delayed on {}.",
            jobs.len(),
            instance.as_deref().unwrap_or("all instances")
        );
        respond(
            calls,
            summary,
            json!({
                DOMAIN_MARKER_KEY: UseCase::DelayedRecon.marker(),
                "instance_id": instance,
                "jobs": jobs,
            }),
        )
    }

    async fn high_mtp(&self, instance: Option<String>) -> AgentResponse {
        let rng = self.sim.rng();
        let prefix = instance.as_deref().unwrap_or("ACC");

        let accounts: Vec<MtpAccount> = ACCOUNT_NAMES
            .iter()
            .enumerate()
            .map(|(i, name)| MtpAccount {
                account_id: format!("{prefix}-A{:02}", i + 1),
                name: (*name).to_string(),
                mtp: rng.float_between(0.5, 6.0, 2),
            })
            .collect();
        let over = accounts.iter().filter(|a| a.mtp > MTP_THRESHOLD).count();

        let calls = vec![
            self.sim
                .call(
                    &IDENTITY,
                    LIST_ACCOUNTS,
                    json!({ "instance_id": instance }),
                    json!({ "accounts": accounts.len() }),
                )
                .await,
            self.sim
                .call(
                    &IDENTITY,
                    MEASURE_MTP,
                    json!({ "threshold": MTP_THRESHOLD }),
                    json!({ "over_threshold": over }),
                )
                .await,
        ];

        let summary = format!(
            "Recon Monitor found {over} of {} accounts above the {MTP_THRESHOLD:.1} day MTP threshold.",
            accounts.len()
        );
        respond(
            calls,
            summary,
            json!({
                DOMAIN_MARKER_KEY: UseCase::HighMtp.marker(),
                "instance_id": instance,
                "threshold": MTP_THRESHOLD,
                "accounts": accounts,
            }),
        )
    }
}

fn respond(calls: Vec<ToolCall>, summary: String, payload: Value) -> AgentResponse {
    AgentResponse::succeeded(
        IDENTITY.id,
        IDENTITY.display_name,
        calls,
        summary,
        object(payload),
    )
}

#[async_trait]
impl Agent for ReconMonitor {
    fn id(&self) -> &str {
        IDENTITY.id
    }

    fn display_name(&self) -> &str {
        IDENTITY.display_name
    }

    async fn invoke(&self, text: &str, profile: Option<&IntentProfile>) -> AgentResponse {
        let use_case = Self::use_case(text, profile);
        let instance = self.instance(text, profile);
        tracing::debug!(use_case = use_case.marker(), instance = ?instance, "recon monitor scope");

        if self.sim.should_fail() {
            let op = match use_case {
                UseCase::HighMtp => LIST_ACCOUNTS,
                _ => LIST_JOBS,
            };
            return self
                .sim
                .fail(
                    &IDENTITY,
                    op,
                    json!({ "instance_id": instance }),
                    "reconciliation feed did not respond",
                )
                .await;
        }

        match use_case {
            UseCase::HighMtp => self.high_mtp(instance).await,
            _ => self.delayed_jobs(instance).await,
        }
    }
}

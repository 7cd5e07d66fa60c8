use super::object;
use crate::simulation::{AgentIdentity, Operation, Simulation};
use async_trait::async_trait;
use serde_json::json;
use std::sync::Arc;
use triage_core::types::agents::GOVERNANCE_REVIEWER;
use triage_core::{Agent, AgentResponse, IntentProfile};

const IDENTITY: AgentIdentity = AgentIdentity {
    id: GOVERNANCE_REVIEWER,
    display_name: "Governance Reviewer",
    failure_reason: "policy engine timeout",
};

const LOAD: Operation = Operation {
    name: "load_policies",
    label: "Load applicable policies",
};
const EVALUATE: Operation = Operation {
    name: "evaluate_controls",
    label: "Evaluate controls against findings",
};

const VIOLATIONS: &[&str] = &[
    "four-eyes approval missing on manual adjustment",
    "break aged beyond regulatory reporting window",
    "override applied without ticket reference",
    "segregation of duties conflict on release",
];

/// Probability the review finds at least one violation
const VIOLATION_RATE: f64 = 0.3;

/// Compliance and validation review
#[derive(Debug, Clone)]
pub struct GovernanceReviewer {
    sim: Arc<Simulation>,
}

impl GovernanceReviewer {
    #[must_use]
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }
}

#[async_trait]
impl Agent for GovernanceReviewer {
    fn id(&self) -> &str {
        IDENTITY.id
    }

    fn display_name(&self) -> &str {
        IDENTITY.display_name
    }

    async fn invoke(&self, _text: &str, profile: Option<&IntentProfile>) -> AgentResponse {
        let scope = json!({
            "intent": profile.map(|p| p.intent_type.as_str()),
            "domain": profile.map(|p| p.domain.label()),
        });
        if self.sim.should_fail() {
            return self
                .sim
                .fail(&IDENTITY, LOAD, scope, "policy engine did not respond")
                .await;
        }

        let rng = self.sim.rng();
        let checked = rng.int_between(8, 24);
        let loaded = self
            .sim
            .call(&IDENTITY, LOAD, scope, json!({ "policies": checked }))
            .await;

        let mut violations: Vec<&str> = Vec::new();
        if rng.chance(VIOLATION_RATE) {
            let count = rng.int_between(1, 2);
            for _ in 0..count {
                if let Some(&v) = rng.pick(VIOLATIONS) {
                    if !violations.contains(&v) {
                        violations.push(v);
                    }
                }
            }
        }
        let approved = violations.is_empty();
        let evaluated = self
            .sim
            .call(
                &IDENTITY,
                EVALUATE,
                json!({ "policies": checked }),
                json!({ "approved": approved, "violations": violations.len() }),
            )
            .await;

        let summary = if approved {
            format!("Governance Reviewer checked {checked} policies with no violations.")
        } else {
            format!(
                "Governance Reviewer found {} violation(s) across {checked} policies.",
                violations.len()
            )
        };

        AgentResponse::succeeded(
            IDENTITY.id,
            IDENTITY.display_name,
            vec![loaded, evaluated],
            summary,
            object(json!({
                "approved": approved,
                "violations": violations,
                "policies_checked": checked,
            })),
        )
    }
}

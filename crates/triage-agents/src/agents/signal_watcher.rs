use super::object;
use crate::simulation::{AgentIdentity, Operation, Simulation};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use triage_core::types::agents::SIGNAL_WATCHER;
use triage_core::{Agent, AgentResponse, IntentProfile, Severity};

const IDENTITY: AgentIdentity = AgentIdentity {
    id: SIGNAL_WATCHER,
    display_name: "Signal Watcher",
    failure_reason: "feed timeout",
};

const READ_FEED: Operation = Operation {
    name: "read_signal_feed",
    label: "Read live signal feed",
};
const SCORE: Operation = Operation {
    name: "score_anomalies",
    label: "Score signals against baseline",
};

const SIGNALS: &[(&str, f64)] = &[
    ("txn_volume", 1_200.0),
    ("error_rate_pct", 0.8),
    ("queue_depth", 40.0),
    ("p99_latency_ms", 320.0),
];

/// Score at or above which the watcher flags an anomaly
const ANOMALY_THRESHOLD: f64 = 0.7;

/// Anomaly scoring over live signal feeds
#[derive(Debug, Clone)]
pub struct SignalWatcher {
    sim: Arc<Simulation>,
}

impl SignalWatcher {
    #[must_use]
    pub fn new(sim: Arc<Simulation>) -> Self {
        Self { sim }
    }
}

#[async_trait]
impl Agent for SignalWatcher {
    fn id(&self) -> &str {
        IDENTITY.id
    }

    fn display_name(&self) -> &str {
        IDENTITY.display_name
    }

    async fn invoke(&self, _text: &str, profile: Option<&IntentProfile>) -> AgentResponse {
        let window = json!({ "window_minutes": 15 });
        if self.sim.should_fail() {
            return self
                .sim
                .fail(
                    &IDENTITY,
                    READ_FEED,
                    window,
                    "signal feed stopped answering within the polling window",
                )
                .await;
        }

        let rng = self.sim.rng();
        let signals: Vec<Value> = SIGNALS
            .iter()
            .map(|(name, baseline)| {
                let factor = rng.float_between(0.6, 2.4, 2);
                json!({
                    "name": name,
                    "baseline": baseline,
                    "value": (baseline * factor * 100.0).round() / 100.0,
                })
            })
            .collect();
        let read = self
            .sim
            .call(&IDENTITY, READ_FEED, window, json!({ "signals": signals.len() }))
            .await;

        // Urgent requests skew towards anomalous readings
        let floor = match profile.map(|p| p.severity) {
            Some(Severity::Critical | Severity::High) => 0.5,
            _ => 0.1,
        };
        let score = rng.float_between(floor, 0.99, 2);
        let detected = score >= ANOMALY_THRESHOLD;
        let scored = self
            .sim
            .call(
                &IDENTITY,
                SCORE,
                json!({ "signals": signals.len() }),
                json!({ "anomaly_score": score }),
            )
            .await;

        let summary = if detected {
            format!(
                "Signal Watcher flagged anomalous behaviour across {} signals (score {score:.2}).",
                signals.len()
            )
        } else {
            format!(
                "Signal Watcher saw {} signals within normal bounds (score {score:.2}).",
                signals.len()
            )
        };

        AgentResponse::succeeded(
            IDENTITY.id,
            IDENTITY.display_name,
            vec![read, scored],
            summary,
            object(json!({
                "anomaly_detected": detected,
                "anomaly_score": score,
                "signals": signals,
            })),
        )
    }
}

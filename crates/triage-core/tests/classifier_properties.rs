//! Property tests for classification and synthesis invariants

use proptest::prelude::*;
use std::collections::HashSet;
use triage_core::types::agents::{FULL_AGENT_SET, GOVERNANCE_REVIEWER};
use triage_core::{classify, IntentType, ReportSynthesizer, Severity};
use triage_test_utils::{error_response, ok_response, quiet_payload};

/// Words that trigger the rule tables, mixed with filler
const VOCABULARY: &[&str] = &[
    "incident", "outage", "P0", "sev1", "anomaly", "spike", "root cause", "trace", "upstream",
    "compliance", "audit", "policy", "latency", "slow", "bottleneck", "delayed recon",
    "high MTP", "server health", "cpu usage", "FX", "foreign exchange", "settlement",
    "SWIFT", "payments", "bond", "urgent", "down", "minor", "fyi", "failed", "stuck",
    "INV", "FXO", "recon-app-02", "the", "ledger", "yesterday", "please", "check", "why",
];

fn request() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(VOCABULARY), 0..8).prop_map(|words| words.join(" "))
}

proptest! {
    #[test]
    fn classification_is_deterministic(text in request()) {
        prop_assert_eq!(classify(&text), classify(&text));
    }

    #[test]
    fn plan_is_non_empty_without_duplicates(text in ".{0,80}") {
        let profile = classify(&text);
        prop_assert!(!profile.agents_to_invoke.is_empty());
        let unique: HashSet<_> = profile.agents_to_invoke.iter().collect();
        prop_assert_eq!(unique.len(), profile.agents_to_invoke.len());
    }

    #[test]
    fn compliance_agent_runs_last(text in request()) {
        let profile = classify(&text);
        if profile.agents_to_invoke.len() > 1 {
            if let Some(pos) = profile.agents_to_invoke.iter().position(|a| a == GOVERNANCE_REVIEWER) {
                prop_assert_eq!(pos, profile.agents_to_invoke.len() - 1);
            }
        }
    }

    #[test]
    fn critical_requests_plan_the_full_set(text in request()) {
        let profile = classify(&text);
        if profile.severity == Severity::Critical || profile.intent_type == IntentType::FullAnalysis {
            prop_assert_eq!(profile.agents_to_invoke, FULL_AGENT_SET.to_vec());
        }
    }

    #[test]
    fn full_analysis_has_no_keywords(text in request()) {
        let profile = classify(&text);
        if profile.intent_type == IntentType::FullAnalysis {
            prop_assert!(profile.primary_keywords.is_empty());
        } else {
            prop_assert!(!profile.primary_keywords.is_empty());
        }
    }

    #[test]
    fn domain_rules_take_precedence(prefix in request(), suffix in request()) {
        let text = format!("{prefix} delayed recon {suffix}");
        let profile = classify(&text);
        let domain_intents = [
            IntentType::DelayedReconQuery,
            IntentType::HighMtpQuery,
            IntentType::ServerDiagnosis,
        ];
        prop_assert!(domain_intents.contains(&profile.intent_type));
        prop_assert!(profile.extracted_context.is_some());
    }

    #[test]
    fn findings_lead_with_intent_and_severity(
        text in request(),
        failures in prop::collection::vec(any::<bool>(), 3),
    ) {
        let profile = classify(&text);
        let responses: Vec<_> = profile
            .agents_to_invoke
            .iter()
            .zip(failures.iter().cycle())
            .map(|(id, failed)| {
                if *failed {
                    error_response(id, "unavailable")
                } else {
                    ok_response(id, "done.", quiet_payload(id))
                }
            })
            .collect();

        let report = ReportSynthesizer::default().synthesize(&responses, &profile);
        prop_assert_eq!(report.key_findings[0].label.as_str(), "Intent");
        prop_assert_eq!(report.key_findings[1].label.as_str(), "Severity");
        prop_assert!(!report.recommended_actions.is_empty());
        prop_assert!(!report.summary.is_empty());

        let failed = responses.iter().filter(|r| r.is_error()).count();
        let unavailable = report
            .key_findings
            .iter()
            .filter(|f| f.value == "Agent unavailable")
            .count();
        prop_assert_eq!(unavailable, failed);
    }
}

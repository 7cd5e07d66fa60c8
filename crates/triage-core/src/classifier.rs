//! Intent classifier
//!
//! Turns free text into an [`IntentProfile`] using fixed rule tables:
//! 1. Domain-specific rules (first hit wins, bypasses step 2)
//! 2. General rules, falling back to full analysis
//! 3. Severity scoring over the lowercased text
//! 4. Critical severity forces the full agent set
//! 5. The compliance agent always runs last
//! 6. Business-domain labeling over the original-case text
//!
//! Keyword matching is plain substring containment: `"down"` matches inside
//! `"shutdown"`.

use crate::resolver::DomainResolver;
use crate::types::agents::{
    FULL_AGENT_SET, GOVERNANCE_REVIEWER, RECON_MONITOR, SERVER_HEALTH, SIGNAL_WATCHER,
    TRACE_ANALYST,
};
use crate::types::{BusinessDomain, ExtractedContext, IntentProfile, IntentType, Severity, UseCase};
use once_cell::sync::Lazy;
use regex::Regex;

struct DomainRule {
    intent: IntentType,
    agents: &'static [&'static str],
    use_case: UseCase,
    keywords: &'static [&'static str],
}

struct GeneralRule {
    intent: IntentType,
    agents: &'static [&'static str],
    keywords: &'static [&'static str],
}

const DOMAIN_RULES: &[DomainRule] = &[
    DomainRule {
        intent: IntentType::DelayedReconQuery,
        agents: &[RECON_MONITOR],
        use_case: UseCase::DelayedRecon,
        keywords: &[
            "delayed recon",
            "delayed reconciliation",
            "recon delay",
            "late recon",
            "stuck recon",
            "pending recon",
        ],
    },
    DomainRule {
        intent: IntentType::HighMtpQuery,
        agents: &[RECON_MONITOR],
        use_case: UseCase::HighMtp,
        keywords: &[
            "high mtp",
            "mtp breach",
            "mtp threshold",
            "match-to-post",
            "mtp above",
        ],
    },
    DomainRule {
        intent: IntentType::ServerDiagnosis,
        agents: &[SERVER_HEALTH],
        use_case: UseCase::ServerDiagnosis,
        keywords: &[
            "server health",
            "diagnose server",
            "server diagnosis",
            "cpu usage",
            "memory usage",
            "disk usage",
            "server load",
        ],
    },
];

const GENERAL_RULES: &[GeneralRule] = &[
    GeneralRule {
        intent: IntentType::IncidentResponse,
        agents: FULL_AGENT_SET,
        keywords: &["incident", "outage", "p0", "p1", "sev1", "escalat"],
    },
    GeneralRule {
        intent: IntentType::AnomalyDetection,
        agents: &[SIGNAL_WATCHER, GOVERNANCE_REVIEWER],
        keywords: &["anomal", "spike", "unusual", "outlier", "deviation"],
    },
    GeneralRule {
        intent: IntentType::RootCauseTrace,
        agents: &[TRACE_ANALYST, SIGNAL_WATCHER],
        keywords: &["root cause", "trace", "dependency", "upstream", "downstream"],
    },
    GeneralRule {
        intent: IntentType::ComplianceCheck,
        agents: &[GOVERNANCE_REVIEWER, TRACE_ANALYST],
        keywords: &["compliance", "policy", "audit", "governance", "regulator"],
    },
    GeneralRule {
        intent: IntentType::PerformanceAnalysis,
        agents: &[SIGNAL_WATCHER, TRACE_ANALYST],
        keywords: &["latency", "slow", "throughput", "performance", "bottleneck"],
    },
];

const CRITICAL_TERMS: &[&str] = &[
    "critical",
    "p0",
    "sev1",
    "down",
    "outage",
    "urgent",
    "emergency",
];
const HIGH_TERMS: &[&str] = &["fail", "error", "breach", "p1", "delayed", "stuck", "high"];
const LOW_TERMS: &[&str] = &["minor", "fyi", "routine", "informational", "no rush"];

// Evaluated over the original-case text so acronyms stay distinguishable.
static DOMAIN_PATTERNS: Lazy<Vec<(BusinessDomain, Regex)>> = Lazy::new(|| {
    [
        (BusinessDomain::ForeignExchange, r"\bFX\b|(?i:foreign exchange)"),
        (BusinessDomain::Settlements, r"(?i)settle"),
        (BusinessDomain::Reconciliation, r"(?i:recon)|\bMTP\b"),
        (BusinessDomain::Payments, r"(?i:payment)|\bSWIFT\b"),
        (BusinessDomain::Securities, r"(?i)securit|equit|bond"),
    ]
    .into_iter()
    .map(|(domain, pattern)| {
        (
            domain,
            Regex::new(pattern).expect("domain pattern is a valid constant regex"),
        )
    })
    .collect()
});

/// Rule-table intent classifier
///
/// Pure and total: the same text always yields the same profile.
#[derive(Debug, Clone, Default)]
pub struct IntentClassifier {
    resolver: DomainResolver,
}

impl IntentClassifier {
    #[inline]
    #[must_use]
    pub fn new(resolver: DomainResolver) -> Self {
        Self { resolver }
    }

    #[inline]
    #[must_use]
    pub fn resolver(&self) -> &DomainResolver {
        &self.resolver
    }

    /// Classify free text into an intent profile
    #[must_use]
    pub fn classify(&self, text: &str) -> IntentProfile {
        let lower = text.to_lowercase();
        let severity = score_severity(&lower);
        let domain = detect_domain(text);

        let (intent_type, agents, primary_keywords, extracted_context) =
            if let Some((rule, hits)) = match_domain_rule(&lower) {
                tracing::debug!(intent = %rule.intent, ?hits, "domain rule matched");
                let context = self.resolve_context(rule.use_case, text);
                (rule.intent, rule.agents, hits, Some(context))
            } else if let Some((rule, hits)) = match_general_rule(&lower) {
                tracing::debug!(intent = %rule.intent, ?hits, "general rule matched");
                (rule.intent, rule.agents, hits, None)
            } else {
                tracing::debug!("no rule matched, falling back to full analysis");
                (IntentType::FullAnalysis, FULL_AGENT_SET, Vec::new(), None)
            };

        let mut agents_to_invoke = if severity == Severity::Critical
            && intent_type != IntentType::FullAnalysis
        {
            tracing::debug!(intent = %intent_type, "critical severity, escalating to full agent set");
            owned(FULL_AGENT_SET)
        } else {
            owned(agents)
        };
        move_compliance_last(&mut agents_to_invoke);

        IntentProfile {
            intent_type,
            severity,
            agents_to_invoke,
            primary_keywords,
            domain,
            extracted_context,
        }
    }

    fn resolve_context(&self, use_case: UseCase, text: &str) -> ExtractedContext {
        let (instance_id, server_id) = match use_case {
            UseCase::ServerDiagnosis => {
                let server = self.resolver.resolve_server(text);
                // A mentioned instance wins over the server's first hosted one
                let instance = server.and_then(|s| {
                    self.resolver
                        .resolve_instance(text)
                        .filter(|i| i.server_id == s.id)
                        .or_else(|| self.resolver.owning_instance(&s.id))
                });
                (instance.map(|i| i.id.clone()), server.map(|s| s.id.clone()))
            }
            UseCase::DelayedRecon | UseCase::HighMtp => {
                let instance = self.resolver.resolve_instance(text);
                (
                    instance.map(|i| i.id.clone()),
                    instance.map(|i| i.server_id.clone()),
                )
            }
        };

        ExtractedContext {
            use_case,
            instance_id,
            server_id,
        }
    }
}

/// Classify with the built-in catalog
#[must_use]
pub fn classify(text: &str) -> IntentProfile {
    IntentClassifier::default().classify(text)
}

fn matched_keywords(lower: &str, keywords: &[&str]) -> Vec<String> {
    keywords
        .iter()
        .filter(|k| lower.contains(*k))
        .map(|k| (*k).to_string())
        .collect()
}

fn match_domain_rule(lower: &str) -> Option<(&'static DomainRule, Vec<String>)> {
    DOMAIN_RULES.iter().find_map(|rule| {
        let hits = matched_keywords(lower, rule.keywords);
        (!hits.is_empty()).then_some((rule, hits))
    })
}

fn match_general_rule(lower: &str) -> Option<(&'static GeneralRule, Vec<String>)> {
    GENERAL_RULES.iter().find_map(|rule| {
        let hits = matched_keywords(lower, rule.keywords);
        (!hits.is_empty()).then_some((rule, hits))
    })
}

/// Severity from the first keyword set with a hit
#[must_use]
pub fn score_severity(lower: &str) -> Severity {
    let hit = |terms: &[&str]| terms.iter().any(|t| lower.contains(t));

    if hit(CRITICAL_TERMS) {
        Severity::Critical
    } else if hit(HIGH_TERMS) {
        Severity::High
    } else if hit(LOW_TERMS) {
        Severity::Low
    } else {
        Severity::Medium
    }
}

/// Business domain from the original-case text
#[must_use]
pub fn detect_domain(text: &str) -> BusinessDomain {
    DOMAIN_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(text))
        .map_or(BusinessDomain::Operations, |(domain, _)| *domain)
}

fn owned(agents: &[&str]) -> Vec<String> {
    agents.iter().map(|a| (*a).to_string()).collect()
}

fn move_compliance_last(agents: &mut Vec<String>) {
    if agents.len() < 2 {
        return;
    }
    if let Some(pos) = agents.iter().position(|a| a == GOVERNANCE_REVIEWER) {
        let reviewer = agents.remove(pos);
        agents.push(reviewer);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scenario_fx_reconciliation_failure() {
        let profile = classify("Why did yesterday's FX reconciliation fail?");

        assert_eq!(profile.intent_type, IntentType::FullAnalysis);
        assert_eq!(profile.agents_to_invoke, owned(FULL_AGENT_SET));
        assert_eq!(profile.agents_to_invoke.last().unwrap(), GOVERNANCE_REVIEWER);
        assert_eq!(profile.severity, Severity::High);
        assert_eq!(profile.domain, BusinessDomain::ForeignExchange);
        assert!(profile.primary_keywords.is_empty());
        assert!(profile.extracted_context.is_none());
    }

    #[test]
    fn scenario_delayed_recon_for_instance() {
        let profile = classify("Show me delayed recon jobs for INV");

        assert_eq!(profile.intent_type, IntentType::DelayedReconQuery);
        assert_eq!(profile.agents_to_invoke, vec![RECON_MONITOR.to_string()]);
        assert_eq!(profile.primary_keywords, vec!["delayed recon".to_string()]);
        let ctx = profile.extracted_context.unwrap();
        assert_eq!(ctx.use_case, UseCase::DelayedRecon);
        assert_eq!(ctx.instance_id.as_deref(), Some("INV"));
        assert_eq!(ctx.server_id.as_deref(), Some("recon-app-01"));
    }

    #[test]
    fn scenario_p0_incident() {
        let profile = classify("P0 incident: settlement engine is down.");

        assert_eq!(profile.intent_type, IntentType::IncidentResponse);
        assert_eq!(profile.severity, Severity::Critical);
        assert_eq!(profile.agents_to_invoke, owned(FULL_AGENT_SET));
        assert_eq!(
            profile.primary_keywords,
            vec!["incident".to_string(), "p0".to_string()]
        );
        assert_eq!(profile.domain, BusinessDomain::Settlements);
    }

    #[test]
    fn domain_rules_take_precedence_over_general() {
        // "incident" would hit the general table first
        let profile = classify("incident: high mtp on FXO accounts");
        assert_eq!(profile.intent_type, IntentType::HighMtpQuery);
        assert_eq!(profile.primary_keywords, vec!["high mtp".to_string()]);
    }

    #[test]
    fn substring_matching_is_not_tokenized() {
        assert_eq!(score_severity("planned shutdown tonight"), Severity::Critical);
    }

    #[test]
    fn critical_severity_escalates_domain_intent() {
        let profile = classify("urgent: cpu usage spiking on recon-app-02");
        assert_eq!(profile.intent_type, IntentType::ServerDiagnosis);
        assert_eq!(profile.severity, Severity::Critical);
        assert_eq!(profile.agents_to_invoke, owned(FULL_AGENT_SET));
        let ctx = profile.extracted_context.unwrap();
        assert_eq!(ctx.server_id.as_deref(), Some("recon-app-02"));
        assert_eq!(ctx.instance_id.as_deref(), Some("FXO"));
    }

    #[test]
    fn compliance_agent_moved_last() {
        let profile = classify("Run a compliance review of the ledger");
        assert_eq!(profile.intent_type, IntentType::ComplianceCheck);
        assert_eq!(
            profile.agents_to_invoke,
            vec![TRACE_ANALYST.to_string(), GOVERNANCE_REVIEWER.to_string()]
        );
    }

    #[test]
    fn severity_falls_through_tables() {
        assert_eq!(score_severity("minor question about reports"), Severity::Low);
        assert_eq!(score_severity("what happened yesterday"), Severity::Medium);
        assert_eq!(score_severity("job stuck again"), Severity::High);
    }

    #[test]
    fn domain_labeling_is_case_sensitive_for_acronyms() {
        // Pinned asymmetry: the domain table sees the original case, the
        // intent and severity tables see lowercase.
        assert_eq!(detect_domain("FX rates look off"), BusinessDomain::ForeignExchange);
        assert_eq!(detect_domain("fx rates look off"), BusinessDomain::Operations);
        assert_eq!(
            detect_domain("fx reconciliation"),
            BusinessDomain::Reconciliation
        );
        assert_eq!(detect_domain("MTP report"), BusinessDomain::Reconciliation);
        assert_eq!(detect_domain("anything else"), BusinessDomain::Operations);
    }

    #[test]
    fn server_diagnosis_keeps_mentioned_instance() {
        let profile = classify("Run a server health check for TRSY");
        let ctx = profile.extracted_context.unwrap();
        assert_eq!(ctx.server_id.as_deref(), Some("recon-app-02"));
        assert_eq!(ctx.instance_id.as_deref(), Some("TRSY"));
    }

    #[test]
    fn server_diagnosis_without_mention_has_empty_context() {
        let profile = classify("give me a server health overview");
        let ctx = profile.extracted_context.unwrap();
        assert_eq!(ctx.use_case, UseCase::ServerDiagnosis);
        assert!(ctx.server_id.is_none());
        assert!(ctx.instance_id.is_none());
    }
}

//! Control cycles over the simulated agents

use pretty_assertions::assert_eq;
use std::io::Write as _;
use std::sync::Arc;
use triage_agents::{build_orchestrator, default_registry, Simulation, SimulationConfig, TriageConfig};
use triage_core::types::agents::RECON_MONITOR;
use triage_core::{
    AgentStatus, DomainResolver, DomainSection, InstanceRef, IntentClassifier, IntentType,
    Orchestrator, OrchestratorConfig, ReferenceCatalog, SequentialIdGenerator, ServerRef,
    ToolCallStatus,
};
use triage_test_utils::RecordingObserver;

fn orchestrator(sim: SimulationConfig) -> Orchestrator {
    let sim = Simulation::new(sim.instant())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("tc")));
    Orchestrator::new(default_registry(Arc::new(sim)), OrchestratorConfig::new())
        .with_id_generator(Arc::new(SequentialIdGenerator::new("node")))
}

#[tokio::test]
async fn seeded_runs_are_reproducible() {
    let text = "P0 incident: settlement engine is down.";
    let config = SimulationConfig::new().with_seed(42).with_error_rate(0.3);

    let first = orchestrator(config.clone())
        .run_cycle(text, &RecordingObserver::new())
        .await
        .unwrap();
    let second = orchestrator(config)
        .run_cycle(text, &RecordingObserver::new())
        .await
        .unwrap();

    let outline = |r: &triage_core::OrchestrationResult| {
        r.agent_responses
            .iter()
            .map(|resp| (resp.agent_id.clone(), resp.status, resp.summary.clone(), resp.payload.clone()))
            .collect::<Vec<_>>()
    };
    assert_eq!(outline(&first), outline(&second));
    assert_eq!(first.report_data.key_findings, second.report_data.key_findings);
    assert_eq!(
        first.report_data.recommended_actions,
        second.report_data.recommended_actions
    );
}

#[tokio::test]
async fn every_agent_fails_at_full_error_rate() {
    let result = orchestrator(SimulationConfig::new().with_seed(1).with_error_rate(1.0))
        .run_cycle("Why did yesterday's FX reconciliation fail?", &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(result.agent_responses.len(), 3);
    for resp in &result.agent_responses {
        assert_eq!(resp.status, AgentStatus::Error);
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].status, ToolCallStatus::Error);
        assert!(resp.reason().is_some());
    }
    let reasons: Vec<_> = result
        .agent_responses
        .iter()
        .filter_map(|r| r.reason())
        .collect();
    assert_eq!(
        reasons,
        vec!["feed timeout", "trace store unavailable", "policy engine timeout"]
    );
    assert_eq!(
        result.report_data.recommended_actions[0],
        "Retry failed agents: Signal Watcher, Trace Analyst, Governance Reviewer"
    );
}

#[tokio::test]
async fn every_agent_succeeds_at_zero_error_rate() {
    let result = orchestrator(SimulationConfig::new().with_seed(7).with_error_rate(0.0))
        .run_cycle("P0 incident: settlement engine is down.", &RecordingObserver::new())
        .await
        .unwrap();

    assert!(result.agent_nodes.iter().all(|n| n.status == AgentStatus::Success));
    for resp in &result.agent_responses {
        assert_eq!(resp.tool_calls.len(), 2);
        assert!(resp
            .tool_calls
            .iter()
            .all(|c| c.status == ToolCallStatus::Success && c.output.is_some()));
    }
    assert!(result.report_data.impact_scope[0].starts_with("Affected service: "));
}

#[tokio::test]
async fn delayed_recon_request_yields_domain_panel() {
    let result = orchestrator(SimulationConfig::new().with_seed(11).with_error_rate(0.0))
        .run_cycle("Show me delayed recon jobs for INV", &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(result.intent_type, IntentType::DelayedReconQuery);
    assert_eq!(result.agent_nodes[0].agent_id, RECON_MONITOR);
    match result.report_data.domain_section {
        Some(DomainSection::DelayedRecon(panel)) => {
            assert_eq!(panel.instance_id.as_deref(), Some("INV"));
            assert!((3..=5).contains(&panel.jobs.len()));
            assert!(panel.jobs.iter().all(|j| j.job_id.starts_with("INV-J")));
        }
        other => panic!("expected delayed recon panel, got {other:?}"),
    }
}

#[tokio::test]
async fn high_mtp_request_yields_domain_panel() {
    let result = orchestrator(SimulationConfig::new().with_seed(3).with_error_rate(0.0))
        .run_cycle("Which accounts have high MTP on FXO?", &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(result.intent_type, IntentType::HighMtpQuery);
    match &result.report_data.domain_section {
        Some(DomainSection::HighMtp(panel)) => {
            assert_eq!(panel.instance_id.as_deref(), Some("FXO"));
            let over = panel.over_threshold().count();
            let review_actions = result
                .report_data
                .recommended_actions
                .iter()
                .filter(|a| a.starts_with("Review account"))
                .count();
            assert_eq!(review_actions, over);
        }
        other => panic!("expected high MTP panel, got {other:?}"),
    }
}

#[tokio::test]
async fn server_diagnosis_request_yields_gauges() {
    let result = orchestrator(SimulationConfig::new().with_seed(5).with_error_rate(0.0))
        .run_cycle("server health for recon-app-03", &RecordingObserver::new())
        .await
        .unwrap();

    match &result.report_data.domain_section {
        Some(DomainSection::ServerDiagnosis(panel)) => {
            assert_eq!(panel.server_id, "recon-app-03");
            assert_eq!(panel.instance_id.as_deref(), Some("CSL"));
            let names: Vec<_> = panel.gauges.iter().map(|g| g.name.as_str()).collect();
            assert_eq!(names, vec!["CPU", "Memory", "Disk"]);
        }
        other => panic!("expected server diagnosis panel, got {other:?}"),
    }
    assert_eq!(result.report_data.impact_scope[0], "Server: recon-app-03");
}

#[tokio::test]
async fn custom_catalog_reaches_classifier_and_agents() {
    let catalog = ReferenceCatalog {
        instances: vec![InstanceRef {
            id: "ZED".into(),
            name: "Zed Ledger".into(),
            server_id: "zed-app-01".into(),
        }],
        servers: vec![ServerRef {
            id: "zed-app-01".into(),
            host: "zed-app-01.internal".into(),
        }],
    };
    let resolver = DomainResolver::new(catalog);
    let sim = Simulation::new(SimulationConfig::new().with_seed(8).with_error_rate(0.0).instant())
        .with_resolver(resolver.clone());
    let orchestrator = Orchestrator::new(default_registry(Arc::new(sim)), OrchestratorConfig::new())
        .with_classifier(IntentClassifier::new(resolver));

    let result = orchestrator
        .run_cycle("server health for zed-app-01", &RecordingObserver::new())
        .await
        .unwrap();

    assert_eq!(result.intent_type, IntentType::ServerDiagnosis);
    match &result.report_data.domain_section {
        Some(DomainSection::ServerDiagnosis(panel)) => {
            assert_eq!(panel.server_id, "zed-app-01");
            assert_eq!(panel.instance_id.as_deref(), Some("ZED"));
        }
        other => panic!("expected server diagnosis panel, got {other:?}"),
    }
}

#[tokio::test]
async fn config_file_drives_the_orchestrator() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[orchestrator]
report_title = "Ops Review"

[simulation]
seed = 99
error_rate = 0.0
min_latency_ms = 0
max_latency_ms = 0
"#
    )
    .unwrap();

    let config = TriageConfig::load(file.path()).unwrap();
    assert_eq!(config.simulation.seed, Some(99));

    let result = build_orchestrator(&config)
        .run_cycle("trace the upstream dependency", &RecordingObserver::new())
        .await
        .unwrap();
    assert_eq!(result.report_data.title, "Ops Review");
    assert_eq!(result.intent_type, IntentType::RootCauseTrace);
    assert!(result.report_data.to_markdown().contains("Ops Review"));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = TriageConfig::load(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, triage_agents::ConfigError::Io { .. }));
}

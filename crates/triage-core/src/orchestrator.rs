//! Control-cycle orchestrator
//!
//! Runs one cycle per call:
//! 1. Planning: classify the text, fix the plan
//! 2. Executing: invoke planned agents strictly in order
//! 3. Synthesizing: merge responses into the report
//! 4. Complete: hand the result back
//!
//! Agent-level failures are folded into the report. Anything that escapes a
//! phase aborts the cycle and no partial result is returned.

use crate::agent::AgentRegistry;
use crate::classifier::IntentClassifier;
use crate::config::OrchestratorConfig;
use crate::error::{ObserverError, OrchestrationError};
use crate::ids::{IdGenerator, UlidIdGenerator};
use crate::observer::CycleObserver;
use crate::phase::{CyclePhase, PhaseTracker};
use crate::synthesizer::ReportSynthesizer;
use crate::types::{AgentNode, AgentResponse, IntentProfile, OrchestrationResult};
use std::sync::Arc;

/// Sequential control-cycle orchestrator
///
/// Holds no per-cycle state; every call to [`run_cycle`](Self::run_cycle)
/// starts from idle with freshly allocated accumulators.
pub struct Orchestrator {
    config: OrchestratorConfig,
    classifier: IntentClassifier,
    registry: AgentRegistry,
    synthesizer: ReportSynthesizer,
    ids: Arc<dyn IdGenerator>,
}

impl Orchestrator {
    /// Create orchestrator over an explicit agent registry
    #[must_use]
    pub fn new(registry: AgentRegistry, config: OrchestratorConfig) -> Self {
        Self {
            synthesizer: ReportSynthesizer::new(config.report_title.clone()),
            config,
            classifier: IntentClassifier::default(),
            registry,
            ids: Arc::new(UlidIdGenerator),
        }
    }

    /// With a custom id generator for agent nodes
    #[must_use]
    pub fn with_id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// With a custom classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Run one full control cycle
    ///
    /// # Errors
    /// Returns `OrchestrationError` when an observer hook fails, the plan is
    /// empty, or the phase machine is violated. Agent failures are not
    /// errors.
    pub async fn run_cycle(
        &self,
        text: &str,
        observer: &dyn CycleObserver,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        tracing::info!("Starting control cycle");
        let mut phases = PhaseTracker::new();

        match self.drive(text, observer, &mut phases).await {
            Ok(result) => {
                tracing::info!(
                    intent = %result.intent_type,
                    agents = result.agent_nodes.len(),
                    "Control cycle complete"
                );
                Ok(result)
            }
            Err(e) => {
                let failed_in = phases.current();
                phases.fail();
                tracing::error!(phase = %failed_in, "Control cycle aborted: {}", e);
                Err(e)
            }
        }
    }

    async fn drive(
        &self,
        text: &str,
        observer: &dyn CycleObserver,
        phases: &mut PhaseTracker,
    ) -> Result<OrchestrationResult, OrchestrationError> {
        // 1. Planning
        phases.advance(CyclePhase::Planning)?;
        let profile = self.classifier.classify(text);
        if profile.agents_to_invoke.is_empty() {
            return Err(OrchestrationError::EmptyPlan(profile.intent_type));
        }
        observer
            .on_planning(&profile)
            .await
            .map_err(hook_failed(CyclePhase::Planning))?;
        self.pace().await;

        // 2. Executing
        phases.advance(CyclePhase::Executing)?;
        let (responses, nodes) = self.execute_plan(text, &profile, observer).await?;
        self.pace().await;

        // 3. Synthesizing
        phases.advance(CyclePhase::Synthesizing)?;
        let report = self.synthesizer.synthesize(&responses, &profile);
        let summary = report.summary.clone();
        observer
            .on_synthesis(&summary)
            .await
            .map_err(hook_failed(CyclePhase::Synthesizing))?;
        self.pace().await;

        // 4. Complete
        phases.advance(CyclePhase::Complete)?;
        observer
            .on_complete()
            .await
            .map_err(hook_failed(CyclePhase::Complete))?;

        Ok(OrchestrationResult {
            intent_type: profile.intent_type,
            agent_responses: responses,
            agent_nodes: nodes,
            final_summary: summary,
            report_data: report,
        })
    }

    /// Invoke planned agents one at a time, in plan order
    async fn execute_plan(
        &self,
        text: &str,
        profile: &IntentProfile,
        observer: &dyn CycleObserver,
    ) -> Result<(Vec<AgentResponse>, Vec<AgentNode>), OrchestrationError> {
        let mut responses: Vec<AgentResponse> = Vec::with_capacity(profile.agents_to_invoke.len());
        let mut nodes: Vec<AgentNode> = Vec::with_capacity(profile.agents_to_invoke.len());

        for agent_id in &profile.agents_to_invoke {
            let Some(agent) = self.registry.get(agent_id) else {
                tracing::warn!(agent = %agent_id, "No agent registered under id, skipping");
                continue;
            };
            let display_name = agent.display_name().to_string();

            observer
                .on_agent_start(&display_name, agent_id)
                .await
                .map_err(hook_failed(CyclePhase::Executing))?;

            let response = agent.invoke(text, Some(profile)).await;
            if response.is_error() {
                tracing::warn!(
                    agent = %agent_id,
                    reason = response.reason().unwrap_or("unknown"),
                    "Agent reported failure, continuing"
                );
            }

            let node = AgentNode {
                id: self.ids.next(),
                agent_id: agent_id.clone(),
                label: display_name.clone(),
                status: response.status,
                order: nodes.len() + 1,
            };
            observer
                .on_agent_complete(&display_name, &response, &node)
                .await
                .map_err(hook_failed(CyclePhase::Executing))?;
            responses.push(response);
            nodes.push(node);
        }

        Ok((responses, nodes))
    }

    async fn pace(&self) {
        if let Some(delay) = self.config.phase_delay() {
            tokio::time::sleep(delay).await;
        }
    }
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

fn hook_failed(phase: CyclePhase) -> impl FnOnce(ObserverError) -> OrchestrationError {
    move |source| OrchestrationError::Observer { phase, source }
}

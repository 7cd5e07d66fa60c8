//! Lifecycle observers
//!
//! The orchestrator awaits each hook before moving on, so events reach an
//! observer in strict transition order. A hook returning `Err` aborts the
//! cycle.

use crate::error::ObserverError;
use crate::types::{AgentNode, AgentResponse, IntentProfile};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Tagged lifecycle event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CycleEvent {
    Planning {
        profile: IntentProfile,
    },
    AgentStarted {
        display_name: String,
        agent_id: String,
    },
    AgentCompleted {
        display_name: String,
        response: AgentResponse,
        node: AgentNode,
    },
    Synthesis {
        summary: String,
    },
    Complete,
}

impl CycleEvent {
    /// Short event name
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            CycleEvent::Planning { .. } => "planning",
            CycleEvent::AgentStarted { .. } => "agent_started",
            CycleEvent::AgentCompleted { .. } => "agent_completed",
            CycleEvent::Synthesis { .. } => "synthesis",
            CycleEvent::Complete => "complete",
        }
    }
}

/// Hooks invoked at each cycle transition; all default to no-ops
#[async_trait::async_trait]
pub trait CycleObserver: Send + Sync {
    async fn on_planning(&self, _profile: &IntentProfile) -> Result<(), ObserverError> {
        Ok(())
    }

    async fn on_agent_start(
        &self,
        _display_name: &str,
        _agent_id: &str,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    async fn on_agent_complete(
        &self,
        _display_name: &str,
        _response: &AgentResponse,
        _node: &AgentNode,
    ) -> Result<(), ObserverError> {
        Ok(())
    }

    async fn on_synthesis(&self, _summary: &str) -> Result<(), ObserverError> {
        Ok(())
    }

    async fn on_complete(&self) -> Result<(), ObserverError> {
        Ok(())
    }
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CycleObserver for NoopObserver {}

/// Forwards events as [`CycleEvent`]s over an unbounded channel
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<CycleEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<CycleEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: CycleEvent) -> Result<(), ObserverError> {
        self.sender
            .send(event)
            .map_err(|_| ObserverError::new("event channel closed"))
    }
}

#[async_trait::async_trait]
impl CycleObserver for ChannelObserver {
    async fn on_planning(&self, profile: &IntentProfile) -> Result<(), ObserverError> {
        self.send(CycleEvent::Planning {
            profile: profile.clone(),
        })
    }

    async fn on_agent_start(&self, display_name: &str, agent_id: &str) -> Result<(), ObserverError> {
        self.send(CycleEvent::AgentStarted {
            display_name: display_name.to_string(),
            agent_id: agent_id.to_string(),
        })
    }

    async fn on_agent_complete(
        &self,
        display_name: &str,
        response: &AgentResponse,
        node: &AgentNode,
    ) -> Result<(), ObserverError> {
        self.send(CycleEvent::AgentCompleted {
            display_name: display_name.to_string(),
            response: response.clone(),
            node: node.clone(),
        })
    }

    async fn on_synthesis(&self, summary: &str) -> Result<(), ObserverError> {
        self.send(CycleEvent::Synthesis {
            summary: summary.to_string(),
        })
    }

    async fn on_complete(&self) -> Result<(), ObserverError> {
        self.send(CycleEvent::Complete)
    }
}

/// Logs every event through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

#[async_trait::async_trait]
impl CycleObserver for TracingObserver {
    async fn on_planning(&self, profile: &IntentProfile) -> Result<(), ObserverError> {
        tracing::info!(
            intent = %profile.intent_type,
            severity = %profile.severity,
            domain = %profile.domain,
            agents = ?profile.agents_to_invoke,
            "plan decided"
        );
        Ok(())
    }

    async fn on_agent_start(&self, display_name: &str, agent_id: &str) -> Result<(), ObserverError> {
        tracing::info!(agent = agent_id, "{display_name} starting");
        Ok(())
    }

    async fn on_agent_complete(
        &self,
        display_name: &str,
        response: &AgentResponse,
        node: &AgentNode,
    ) -> Result<(), ObserverError> {
        tracing::info!(
            agent = %response.agent_id,
            order = node.order,
            status = ?response.status,
            tool_calls = response.tool_calls.len(),
            "{display_name} complete"
        );
        Ok(())
    }

    async fn on_synthesis(&self, summary: &str) -> Result<(), ObserverError> {
        tracing::info!(summary, "report synthesized");
        Ok(())
    }

    async fn on_complete(&self) -> Result<(), ObserverError> {
        tracing::info!("cycle complete");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_observer_forwards_events() {
        let (observer, mut rx) = ChannelObserver::channel();
        observer.on_agent_start("Trace Analyst", "trace_analyst").await.unwrap();
        observer.on_complete().await.unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.name(), "agent_started");
        assert_eq!(rx.recv().await.unwrap(), CycleEvent::Complete);
    }

    #[tokio::test]
    async fn channel_observer_fails_when_receiver_dropped() {
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        let err = observer.on_synthesis("done").await.unwrap_err();
        assert_eq!(err, ObserverError::new("event channel closed"));
    }

    #[tokio::test]
    async fn noop_observer_accepts_everything() {
        assert!(NoopObserver.on_complete().await.is_ok());
        assert!(NoopObserver.on_synthesis("x").await.is_ok());
    }
}

//! Orchestrator adapter (§1 "Deliberately OUT of scope": container
//! orchestration mechanics are an opaque "set replica count to N").

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("orchestrator command failed: {0}")]
    CommandFailed(String),
    #[error("orchestrator enumeration unavailable")]
    Unavailable,
}

/// The scaling controller's view of the deployment platform: set a
/// target replica count, and (best-effort) enumerate the current
/// count. A real deployment wires this to its orchestrator's API
/// (Kubernetes, docker-compose, Nomad, ...); this core treats it as
/// an opaque external collaborator.
#[async_trait]
pub trait Orchestrator: Send + Sync {
    async fn set_replicas(&self, target: u32) -> Result<(), OrchestratorError>;
    async fn worker_count(&self) -> Result<u32, OrchestratorError>;
}

/// Records the scaling intent via logging only, for external
/// orchestration to pick up (§4.6 step 6: "If the orchestrator is
/// unavailable, still record the intended target ... for external
/// orchestration").
pub struct LoggingOrchestrator;

#[async_trait]
impl Orchestrator for LoggingOrchestrator {
    async fn set_replicas(&self, target: u32) -> Result<(), OrchestratorError> {
        info!(target, "orchestrator: recording replica-count intent (no live orchestrator wired in)");
        Ok(())
    }

    async fn worker_count(&self) -> Result<u32, OrchestratorError> {
        Err(OrchestratorError::Unavailable)
    }
}

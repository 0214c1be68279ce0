//! Outcome verification
//!
//! Decides whether the run settles or earns a bounded retry. Only an applied
//! actuator action is probed; escalations, policy denials and explicit
//! failures keep the executor's outcome untouched.

use crate::collab::HealthProbe;
use crate::error::CollaboratorError;
use crate::types::{AgentState, ExecutionDisposition, ExecutionOutcome};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// What the orchestrator should do after verification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The run is finished; the recorded outcome is final
    Settled,
    /// The service is still unhealthy; take the retry edge
    Retry,
}

/// Probe that reports recovery without consulting anything
///
/// The shipping default: reaching verification without a fatal fault is
/// treated as tentative success. A real probe can re-query service health
/// through this same seam.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeRecovered;

#[async_trait]
impl HealthProbe for AssumeRecovered {
    async fn healthy(&self, _service: &str) -> Result<bool, CollaboratorError> {
        Ok(true)
    }
}

/// Verifies post-remediation health and drives the retry counter
pub struct OutcomeVerifier {
    probe: Arc<dyn HealthProbe>,
}

impl OutcomeVerifier {
    /// Verifier with the tentative-success default probe
    #[must_use]
    pub fn new() -> Self {
        Self {
            probe: Arc::new(AssumeRecovered),
        }
    }

    /// Verifier with a custom health probe
    #[must_use]
    pub fn with_probe(probe: Arc<dyn HealthProbe>) -> Self {
        Self { probe }
    }

    /// Verify the state after execution
    ///
    /// On a failed probe the retry counter is incremented, never decremented
    /// or reset. A degraded probe counts as recovery, matching the
    /// degraded-collaborator policy everywhere else.
    pub async fn verify(&self, state: &mut AgentState) -> Verdict {
        match state.disposition {
            Some(ExecutionDisposition::Applied) => {}
            // Nothing was applied, or the failure is already explicit; the
            // recorded outcome stands and the run settles.
            _ => return Verdict::Settled,
        }

        let healthy = match self.probe.healthy(&state.alert.service).await {
            Ok(healthy) => healthy,
            Err(cause) => {
                warn!(error = %cause, "health probe unavailable, assuming recovery");
                state
                    .degradations
                    .push(format!("health probe: {cause}"));
                true
            }
        };

        if healthy {
            info!(run_id = %state.run_id, "post-remediation health check passed");
            state.finalize_outcome(ExecutionOutcome::success("Success: System recovered."));
            Verdict::Settled
        } else {
            state.retries.bump();
            warn!(
                run_id = %state.run_id,
                retries = state.retries.count(),
                "service still unhealthy after remediation"
            );
            state.finalize_outcome(ExecutionOutcome::failure("Failure: System still unhealthy."));
            Verdict::Retry
        }
    }
}

impl Default for OutcomeVerifier {
    fn default() -> Self {
        Self::new()
    }
}

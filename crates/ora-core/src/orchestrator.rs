//! Run orchestration
//!
//! Owns the sequencing of one remediation run as an explicit finite-state
//! machine over `RunPhase`. Stages never call each other; they read and
//! extend the shared `AgentState` and the orchestrator routes between them,
//! including the bounded retry edge out of verification.

use crate::audit::AuditCollector;
use crate::decision::DecisionEngine;
use crate::diagnostics::DiagnosticCollector;
use crate::error::CollaboratorError;
use crate::executor::RemediationExecutor;
use crate::flags::FeatureFlags;
use crate::phase::{validate_transition, RunPhase};
use crate::types::{AgentState, AlertInfo, AuditContext, Collected};
use crate::verifier::{OutcomeVerifier, Verdict};
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Where a retry cycle re-enters the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryPolicy {
    /// Jump straight back to deciding with the already-collected context
    Reassess,
    /// Re-run diagnosis and audit before deciding again
    Recollect,
}

/// Orchestrator tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Retry routing out of a failed verification
    pub retry_policy: RetryPolicy,
}

impl OrchestratorConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With a retry policy
    #[inline]
    #[must_use]
    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            // Collectors are best-effort and their context is already merged
            // into the state, so reassessment skips recollection.
            retry_policy: RetryPolicy::Reassess,
        }
    }
}

/// Sequences the stages of one remediation run
pub struct Orchestrator {
    diagnostics: DiagnosticCollector,
    audit: AuditCollector,
    engine: DecisionEngine,
    executor: RemediationExecutor,
    verifier: OutcomeVerifier,
    config: OrchestratorConfig,
}

impl Orchestrator {
    /// Orchestrator over the given stages with default configuration
    #[must_use]
    pub fn new(
        diagnostics: DiagnosticCollector,
        audit: AuditCollector,
        engine: DecisionEngine,
        executor: RemediationExecutor,
        verifier: OutcomeVerifier,
    ) -> Self {
        Self {
            diagnostics,
            audit,
            engine,
            executor,
            verifier,
            config: OrchestratorConfig::default(),
        }
    }

    /// With orchestrator configuration
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: OrchestratorConfig) -> Self {
        self.config = config;
        self
    }

    /// Process one alert end to end
    ///
    /// Never raises: every collaborator fault is absorbed by its stage, and
    /// the returned state always carries an outcome, an explicit error, or
    /// both. `flags` is the caller's per-run snapshot.
    pub async fn run(&self, alert: AlertInfo, flags: &FeatureFlags) -> AgentState {
        let mut state = AgentState::new(alert);
        info!(
            run_id = %state.run_id,
            alert = %state.alert.alert_name,
            service = %state.alert.service,
            "starting remediation run"
        );

        let mut phase = RunPhase::Diagnosing;
        let mut audit_task: Option<JoinHandle<Collected<AuditContext>>> = None;

        loop {
            let next = match phase {
                RunPhase::Diagnosing => {
                    // Audit collection is independent of diagnosis; let it
                    // run while logs are fetched and join it next phase.
                    audit_task = Some(self.spawn_audit(&state));
                    let collected = self.diagnostics.collect(&state.alert.service).await;
                    state.record_diagnostics(collected);
                    RunPhase::Auditing
                }
                RunPhase::Auditing => {
                    let collected = match audit_task.take() {
                        Some(handle) => join_audit(handle).await,
                        None => self.audit.collect(&state.alert.service).await,
                    };
                    state.record_audit(collected);
                    RunPhase::Deciding
                }
                RunPhase::Deciding => {
                    let analysis = state.analysis().unwrap_or_default().to_string();
                    let plan = self.engine.decide(&analysis, state.retries.count());
                    info!(
                        run_id = %state.run_id,
                        action = %plan.action,
                        confidence = plan.confidence,
                        "plan decided"
                    );
                    state.record_plan(plan);
                    RunPhase::Remediating
                }
                RunPhase::Remediating => {
                    self.executor.execute(&mut state, flags).await;
                    RunPhase::Verifying
                }
                RunPhase::Verifying => match self.verifier.verify(&mut state).await {
                    Verdict::Settled => RunPhase::Done,
                    Verdict::Retry => match self.config.retry_policy {
                        RetryPolicy::Reassess => RunPhase::Deciding,
                        RetryPolicy::Recollect => RunPhase::Diagnosing,
                    },
                },
                RunPhase::Done => break,
            };

            if let Err(fault) = validate_transition(phase, next) {
                // Guards the table; unreachable as long as the arms above
                // agree with it.
                error!(run_id = %state.run_id, %fault, "aborting run");
                state.record_error(fault.to_string());
                break;
            }
            debug!(run_id = %state.run_id, from = ?phase, to = ?next, "phase transition");
            phase = next;
        }

        info!(
            run_id = %state.run_id,
            outcome = state.outcome_message().unwrap_or("none"),
            retries = state.retries.count(),
            "run finished"
        );
        state
    }

    fn spawn_audit(&self, state: &AgentState) -> JoinHandle<Collected<AuditContext>> {
        let collector = self.audit.clone();
        let service = state.alert.service.clone();
        tokio::spawn(async move { collector.collect(&service).await })
    }
}

/// Join the audit task, degrading if it panicked or was cancelled
async fn join_audit(handle: JoinHandle<Collected<AuditContext>>) -> Collected<AuditContext> {
    match handle.await {
        Ok(collected) => collected,
        Err(fault) => Collected::degraded(
            AuditContext::default(),
            CollaboratorError::Transport(format!("audit task failed: {fault}")),
        ),
    }
}

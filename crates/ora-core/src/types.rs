//! Core types for ORA
//!
//! Defines the fundamental types for one remediation run:
//! - Alert and diagnostic/audit context
//! - Remediation plans and execution outcomes
//! - The shared run state mutated by each stage

use crate::error::CollaboratorError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Unique identifier for one remediation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate new run ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An inbound alert naming an unhealthy service
///
/// Immutable once ingested. `service` is used to derive the log-group and
/// commit-source identifiers downstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertInfo {
    /// Alert rule name
    pub alert_name: String,
    /// Severity label from the alerting system
    pub severity: String,
    /// The affected service
    pub service: String,
    /// Raw upstream payload fields, kept for operator context
    pub details: BTreeMap<String, serde_json::Value>,
}

impl AlertInfo {
    /// Create new alert info
    #[inline]
    #[must_use]
    pub fn new(
        alert_name: impl Into<String>,
        severity: impl Into<String>,
        service: impl Into<String>,
    ) -> Self {
        Self {
            alert_name: alert_name.into(),
            severity: severity.into(),
            service: service.into(),
            details: BTreeMap::new(),
        }
    }

    /// With an upstream detail field
    #[inline]
    #[must_use]
    pub fn with_detail(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.details.insert(key.into(), value);
        self
    }
}

/// Log evidence plus a human-readable root-cause summary
///
/// `logs` may be empty in degraded mode; `analysis` is always populated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosticContext {
    /// Recent log lines matching the error filter
    pub logs: Vec<String>,
    /// Textual summary derived from the logs
    pub analysis: String,
}

/// A single source-control commit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit SHA
    pub sha: String,
    /// First line of the commit message
    pub message: String,
    /// Author name
    pub author: String,
    /// Author date
    pub date: DateTime<Utc>,
}

/// Recent commits for the affected service
///
/// Commits are repo-wide; scoping them to the service path needs monorepo
/// layout information this stage does not have.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditContext {
    /// Most-recent-first commit list, possibly empty
    pub commits: Vec<CommitInfo>,
}

/// Remediation action classes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemediationAction {
    /// Force a fresh deployment of the service
    RestartService,
    /// Add one task to the service's desired count
    ScaleUp,
    /// Open a revert PR for the most recent commit
    RevertCommit,
    /// Hand the incident to a human operator
    Escalate,
}

impl RemediationAction {
    /// Stable lowercase name, matching the wire encoding
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            RemediationAction::RestartService => "restart_service",
            RemediationAction::ScaleUp => "scale_up",
            RemediationAction::RevertCommit => "revert_commit",
            RemediationAction::Escalate => "escalate",
        }
    }
}

impl std::fmt::Display for RemediationAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A graded, explainable remediation decision
///
/// Invariant: `confidence < 0.7` implies `action == Escalate`. The decision
/// engine enforces this after classification, for custom classifiers too.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemediationPlan {
    /// Chosen action class
    pub action: RemediationAction,
    /// Why this action was chosen
    pub reasoning: String,
    /// Confidence in [0.0, 1.0]
    pub confidence: f64,
}

/// Terminal result of executing or verifying a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    /// Whether the step ended in an acceptable state
    pub succeeded: bool,
    /// Operator-facing description of what happened
    pub message: String,
}

impl ExecutionOutcome {
    /// Successful outcome
    #[inline]
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            message: message.into(),
        }
    }

    /// Failed outcome
    #[inline]
    #[must_use]
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            message: message.into(),
        }
    }
}

/// What the executor actually did with the plan
///
/// Keeps "degraded but successful" and "genuinely failed" apart without
/// string-matching outcome messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionDisposition {
    /// An actuator was invoked and reported success
    Applied,
    /// The action was disabled by feature flag; nothing was invoked
    PolicyDenied,
    /// The plan itself was an escalation
    Escalated,
    /// An actuator was invoked (or required data was missing) and the step failed
    ActuatorFailed,
    /// No plan was present on the state
    NoPlan,
}

/// Autonomous retry counter for one run
///
/// Monotonically non-decreasing by construction: the API exposes read and
/// increment only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryCounter(u32);

impl RetryCounter {
    /// Current count
    #[inline]
    #[must_use]
    pub fn count(&self) -> u32 {
        self.0
    }

    /// Increment by one
    #[inline]
    pub fn bump(&mut self) {
        self.0 += 1;
    }
}

/// A collector result that never raises
///
/// Carries the collected value plus the cause of degradation, if any, so the
/// fresh/degraded distinction stays visible at the seam.
#[derive(Debug, Clone)]
pub struct Collected<T> {
    /// The collected value (a documented fallback when degraded)
    pub value: T,
    /// Why the collaborator could not be consulted, if it could not
    pub degradation: Option<CollaboratorError>,
}

impl<T> Collected<T> {
    /// A value obtained from a healthy collaborator
    #[inline]
    #[must_use]
    pub fn fresh(value: T) -> Self {
        Self {
            value,
            degradation: None,
        }
    }

    /// A fallback value recorded after a collaborator failure
    #[inline]
    #[must_use]
    pub fn degraded(value: T, cause: CollaboratorError) -> Self {
        Self {
            value,
            degradation: Some(cause),
        }
    }

    /// Whether the collaborator failed and the value is a fallback
    #[inline]
    #[must_use]
    pub fn is_degraded(&self) -> bool {
        self.degradation.is_some()
    }
}

/// Shared context for one remediation run
///
/// Owned by exactly one orchestrator run and discarded when the outcome is
/// returned. Stages extend it through the record methods; `record_plan` and
/// `finalize_outcome` may replace their field on a retry cycle, everything
/// else is write-once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentState {
    /// Run identifier, for log correlation
    pub run_id: RunId,
    /// The triggering alert
    pub alert: AlertInfo,
    /// Log evidence and analysis, set by the diagnostic stage
    pub diagnostics: Option<DiagnosticContext>,
    /// Recent commits, set by the audit stage
    pub audit: Option<AuditContext>,
    /// The current plan, set (and on retry replaced) by the decision stage
    pub plan: Option<RemediationPlan>,
    /// Latest execution/verification outcome
    pub outcome: Option<ExecutionOutcome>,
    /// What the executor did, for the verifier
    pub disposition: Option<ExecutionDisposition>,
    /// Autonomous retry counter
    pub retries: RetryCounter,
    /// Fatal stage error, distinct from a failed outcome
    pub error: Option<String>,
    /// Collaborators that were unavailable during this run
    pub degradations: Vec<String>,
}

impl AgentState {
    /// Create the run context for a fresh alert
    #[inline]
    #[must_use]
    pub fn new(alert: AlertInfo) -> Self {
        Self {
            run_id: RunId::new(),
            alert,
            diagnostics: None,
            audit: None,
            plan: None,
            outcome: None,
            disposition: None,
            retries: RetryCounter::default(),
            error: None,
            degradations: Vec::new(),
        }
    }

    /// Record the diagnostic stage result
    pub fn record_diagnostics(&mut self, collected: Collected<DiagnosticContext>) {
        if let Some(cause) = &collected.degradation {
            self.degradations.push(format!("log source: {cause}"));
        }
        self.diagnostics = Some(collected.value);
    }

    /// Record the audit stage result
    pub fn record_audit(&mut self, collected: Collected<AuditContext>) {
        if let Some(cause) = &collected.degradation {
            self.degradations.push(format!("commit source: {cause}"));
        }
        self.audit = Some(collected.value);
    }

    /// Record the decision stage result
    pub fn record_plan(&mut self, plan: RemediationPlan) {
        self.plan = Some(plan);
    }

    /// Record the execution stage result
    pub fn record_outcome(&mut self, outcome: ExecutionOutcome, disposition: ExecutionDisposition) {
        self.outcome = Some(outcome);
        self.disposition = Some(disposition);
    }

    /// Replace the tentative execution outcome with the verified one
    pub fn finalize_outcome(&mut self, outcome: ExecutionOutcome) {
        self.outcome = Some(outcome);
    }

    /// Record a fatal stage error
    pub fn record_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// The diagnostic analysis text, if collected
    #[inline]
    #[must_use]
    pub fn analysis(&self) -> Option<&str> {
        self.diagnostics.as_ref().map(|d| d.analysis.as_str())
    }

    /// Collected commits, empty when the audit stage was degraded or skipped
    #[inline]
    #[must_use]
    pub fn commits(&self) -> &[CommitInfo] {
        self.audit.as_ref().map(|a| a.commits.as_slice()).unwrap_or(&[])
    }

    /// The chosen action, if a plan was produced
    #[inline]
    #[must_use]
    pub fn action(&self) -> Option<RemediationAction> {
        self.plan.as_ref().map(|p| p.action)
    }

    /// The operator-facing result of the run
    #[inline]
    #[must_use]
    pub fn outcome_message(&self) -> Option<&str> {
        self.outcome.as_ref().map(|o| o.message.as_str())
    }
}

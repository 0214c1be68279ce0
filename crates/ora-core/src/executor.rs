//! Plan execution
//!
//! Dispatches the chosen remediation action to the infrastructure or
//! source-control actuator, after the feature-flag gate. Records both the
//! operator-facing outcome and the machine-facing disposition on the state.

use crate::collab::{InfraActuator, ScmActuator};
use crate::flags::FeatureFlags;
use crate::types::{
    AgentState, ExecutionDisposition, ExecutionOutcome, RemediationAction,
};
use std::sync::Arc;
use tracing::{info, warn};

const CLUSTER_VAR: &str = "ORA_CLUSTER";
const SERVICE_VAR: &str = "ORA_SERVICE";

const DEFAULT_CLUSTER: &str = "ops-cluster-dev";
const DEFAULT_SERVICE: &str = "frontend-app-dev";

/// Desired-count baseline while the live count is not queried
const DEFAULT_TASK_COUNT: u32 = 1;

/// Cluster/service identity the actuators operate on
///
/// An immutable snapshot taken at process start, like the feature flags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployTarget {
    /// Orchestration cluster name
    pub cluster: String,
    /// Service name within the cluster
    pub service: String,
}

impl DeployTarget {
    /// Target from explicit values
    #[inline]
    #[must_use]
    pub fn new(cluster: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            cluster: cluster.into(),
            service: service.into(),
        }
    }

    /// Snapshot the target from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot the target from an arbitrary lookup function
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cluster: lookup(CLUSTER_VAR).unwrap_or_else(|| DEFAULT_CLUSTER.to_string()),
            service: lookup(SERVICE_VAR).unwrap_or_else(|| DEFAULT_SERVICE.to_string()),
        }
    }
}

impl Default for DeployTarget {
    fn default() -> Self {
        Self::new(DEFAULT_CLUSTER, DEFAULT_SERVICE)
    }
}

/// Executes remediation plans against the actuators
pub struct RemediationExecutor {
    infra: Arc<dyn InfraActuator>,
    scm: Arc<dyn ScmActuator>,
    target: DeployTarget,
}

impl RemediationExecutor {
    /// Executor bound to the given actuators and deploy target
    #[must_use]
    pub fn new(
        infra: Arc<dyn InfraActuator>,
        scm: Arc<dyn ScmActuator>,
        target: DeployTarget,
    ) -> Self {
        Self { infra, scm, target }
    }

    /// Execute the plan on `state`
    ///
    /// Missing plan is reported through `state.error`, not as an outcome.
    /// A policy-denied action never touches an actuator. Actuator failures
    /// surface in the outcome message and are not retried here.
    pub async fn execute(
        &self,
        state: &mut AgentState,
        flags: &FeatureFlags,
    ) -> ExecutionDisposition {
        let Some(plan) = state.plan.clone() else {
            state.record_error("No plan provided.");
            state.disposition = Some(ExecutionDisposition::NoPlan);
            return ExecutionDisposition::NoPlan;
        };

        let action = plan.action;
        if !flags.allows(action) {
            warn!(%action, "action disabled by feature flag, escalating");
            let outcome = ExecutionOutcome::success(format!(
                "Action '{action}' is disabled by feature flag. Escalated to human operator."
            ));
            state.record_outcome(outcome, ExecutionDisposition::PolicyDenied);
            return ExecutionDisposition::PolicyDenied;
        }

        info!(%action, confidence = plan.confidence, "executing remediation");

        let (outcome, disposition) = match action {
            RemediationAction::RestartService => self.restart_service().await,
            RemediationAction::ScaleUp => self.scale_up().await,
            RemediationAction::RevertCommit => self.revert_commit(state).await,
            RemediationAction::Escalate => (
                ExecutionOutcome::success("Escalated to human operator."),
                ExecutionDisposition::Escalated,
            ),
        };

        state.record_outcome(outcome, disposition);
        disposition
    }

    async fn restart_service(&self) -> (ExecutionOutcome, ExecutionDisposition) {
        let ok = self
            .infra
            .force_redeploy(&self.target.cluster, &self.target.service)
            .await;
        if ok {
            (
                ExecutionOutcome::success("Success: Service restarted."),
                ExecutionDisposition::Applied,
            )
        } else {
            (
                ExecutionOutcome::failure("Failure: Could not restart service."),
                ExecutionDisposition::ActuatorFailed,
            )
        }
    }

    async fn scale_up(&self) -> (ExecutionOutcome, ExecutionDisposition) {
        // Live count is not queried yet; scale from the fixed baseline.
        let desired = DEFAULT_TASK_COUNT + 1;
        let ok = self
            .infra
            .set_desired_count(&self.target.cluster, &self.target.service, desired)
            .await;
        if ok {
            (
                ExecutionOutcome::success(format!("Success: Scaled service to {desired} tasks.")),
                ExecutionDisposition::Applied,
            )
        } else {
            (
                ExecutionOutcome::failure("Failure: Could not scale service."),
                ExecutionDisposition::ActuatorFailed,
            )
        }
    }

    async fn revert_commit(
        &self,
        state: &AgentState,
    ) -> (ExecutionOutcome, ExecutionDisposition) {
        let Some(commit) = state.commits().first() else {
            return (
                ExecutionOutcome::failure("Failure: No recent commits found to revert."),
                ExecutionDisposition::ActuatorFailed,
            );
        };

        let reason = state.analysis().unwrap_or("Unknown issue detected");
        let result = self.scm.create_revert_pr(&commit.sha, reason).await;

        if result.success {
            let mut message = format!("Success: {}.", result.message);
            if let Some(url) = result.pr_url {
                message.push_str(&format!(" PR: {url}"));
            }
            (
                ExecutionOutcome::success(message),
                ExecutionDisposition::Applied,
            )
        } else {
            (
                ExecutionOutcome::failure(format!(
                    "Failure: Could not create revert PR. {}",
                    result.message
                )),
                ExecutionDisposition::ActuatorFailed,
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{MockInfraActuator, MockScmActuator, RevertOutcome};
    use crate::types::{
        AlertInfo, AuditContext, Collected, CommitInfo, DiagnosticContext, RemediationPlan,
    };
    use chrono::Utc;

    fn state_with_plan(action: RemediationAction) -> AgentState {
        let mut state = AgentState::new(AlertInfo::new("HighErrorRate", "critical", "checkout"));
        state.record_plan(RemediationPlan {
            action,
            reasoning: "Based on analysis: test".to_string(),
            confidence: 0.9,
        });
        state
    }

    fn executor(infra: MockInfraActuator, scm: MockScmActuator) -> RemediationExecutor {
        RemediationExecutor::new(
            Arc::new(infra),
            Arc::new(scm),
            DeployTarget::new("cluster-a", "svc-a"),
        )
    }

    fn quiet_mocks() -> (MockInfraActuator, MockScmActuator) {
        let mut infra = MockInfraActuator::new();
        infra.expect_force_redeploy().times(0);
        infra.expect_set_desired_count().times(0);
        let mut scm = MockScmActuator::new();
        scm.expect_create_revert_pr().times(0);
        (infra, scm)
    }

    #[tokio::test]
    async fn missing_plan_sets_error_and_no_outcome() {
        let (infra, scm) = quiet_mocks();
        let mut state = AgentState::new(AlertInfo::new("X", "warning", "svc"));

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::NoPlan);
        assert_eq!(state.error.as_deref(), Some("No plan provided."));
        assert!(state.outcome.is_none());
    }

    #[tokio::test]
    async fn disabled_action_never_touches_actuators() {
        let (infra, scm) = quiet_mocks();
        let mut state = state_with_plan(RemediationAction::RevertCommit);
        let flags = FeatureFlags::allow_all().with_revert_commit(false);

        let disposition = executor(infra, scm).execute(&mut state, &flags).await;

        assert_eq!(disposition, ExecutionDisposition::PolicyDenied);
        let message = state.outcome_message().unwrap();
        assert!(message.contains("disabled by feature flag"));
        assert!(message.to_lowercase().contains("escalated"));
    }

    #[tokio::test]
    async fn restart_reports_actuator_result() {
        let mut infra = MockInfraActuator::new();
        infra
            .expect_force_redeploy()
            .withf(|cluster, service| cluster == "cluster-a" && service == "svc-a")
            .times(1)
            .returning(|_, _| true);
        let scm = MockScmActuator::new();
        let mut state = state_with_plan(RemediationAction::RestartService);

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::Applied);
        assert_eq!(
            state.outcome_message(),
            Some("Success: Service restarted.")
        );
    }

    #[tokio::test]
    async fn restart_failure_is_explicit() {
        let mut infra = MockInfraActuator::new();
        infra.expect_force_redeploy().returning(|_, _| false);
        let scm = MockScmActuator::new();
        let mut state = state_with_plan(RemediationAction::RestartService);

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::ActuatorFailed);
        assert_eq!(
            state.outcome_message(),
            Some("Failure: Could not restart service.")
        );
    }

    #[tokio::test]
    async fn scale_up_adds_one_task() {
        let mut infra = MockInfraActuator::new();
        infra
            .expect_set_desired_count()
            .withf(|_, _, count| *count == 2)
            .times(1)
            .returning(|_, _, _| true);
        let scm = MockScmActuator::new();
        let mut state = state_with_plan(RemediationAction::ScaleUp);

        executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(
            state.outcome_message(),
            Some("Success: Scaled service to 2 tasks.")
        );
    }

    #[tokio::test]
    async fn revert_without_commits_fails_without_calling_scm() {
        let infra = MockInfraActuator::new();
        let mut scm = MockScmActuator::new();
        scm.expect_create_revert_pr().times(0);
        let mut state = state_with_plan(RemediationAction::RevertCommit);
        state.record_audit(Collected::fresh(AuditContext::default()));

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::ActuatorFailed);
        assert_eq!(
            state.outcome_message(),
            Some("Failure: No recent commits found to revert.")
        );
    }

    #[tokio::test]
    async fn revert_uses_newest_commit_and_analysis_reason() {
        let infra = MockInfraActuator::new();
        let mut scm = MockScmActuator::new();
        scm.expect_create_revert_pr()
            .withf(|sha, reason| sha == "abc123" && reason.contains("NullPointer"))
            .times(1)
            .returning(|_, _| RevertOutcome {
                success: true,
                pr_url: Some("https://forge.example/pr/7".to_string()),
                message: "Created PR #7 to revert abc123".to_string(),
            });

        let mut state = state_with_plan(RemediationAction::RevertCommit);
        state.record_diagnostics(Collected::fresh(DiagnosticContext {
            logs: vec![],
            analysis: "Found 1 error logs. Top error: NullPointerException...".to_string(),
        }));
        state.record_audit(Collected::fresh(AuditContext {
            commits: vec![
                CommitInfo {
                    sha: "abc123".to_string(),
                    message: "newest".to_string(),
                    author: "dev".to_string(),
                    date: Utc::now(),
                },
                CommitInfo {
                    sha: "older".to_string(),
                    message: "older".to_string(),
                    author: "dev".to_string(),
                    date: Utc::now(),
                },
            ],
        }));

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::Applied);
        let message = state.outcome_message().unwrap();
        assert!(message.starts_with("Success:"));
        assert!(message.contains("PR: https://forge.example/pr/7"));
    }

    #[tokio::test]
    async fn escalation_succeeds_trivially() {
        let (infra, scm) = quiet_mocks();
        let mut state = state_with_plan(RemediationAction::Escalate);

        let disposition = executor(infra, scm)
            .execute(&mut state, &FeatureFlags::allow_all())
            .await;

        assert_eq!(disposition, ExecutionDisposition::Escalated);
        assert_eq!(
            state.outcome_message(),
            Some("Escalated to human operator.")
        );
        assert!(state.outcome.as_ref().unwrap().succeeded);
    }

    #[test]
    fn deploy_target_lookup_with_defaults() {
        let target = DeployTarget::from_lookup(|key| match key {
            "ORA_CLUSTER" => Some("prod-cluster".to_string()),
            _ => None,
        });
        assert_eq!(target.cluster, "prod-cluster");
        assert_eq!(target.service, DEFAULT_SERVICE);
    }
}

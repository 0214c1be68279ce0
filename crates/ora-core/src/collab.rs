//! Collaborator seams
//!
//! Every external system the core touches sits behind one of these traits:
//! the log store, the source-control host, the infrastructure actuator and
//! the post-remediation health probe. Stages own the graceful-degradation
//! policy; implementations just report faults honestly.

use crate::error::CollaboratorError;
use crate::types::CommitInfo;
use async_trait::async_trait;
use std::time::Duration;

/// Read access to recent service logs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LogSource: Send + Sync {
    /// Fetch log lines from `log_group` matching `filter` within the lookback
    /// window, newest last, at most `limit` entries.
    async fn query(
        &self,
        log_group: &str,
        filter: &str,
        lookback: Duration,
        limit: usize,
    ) -> Result<Vec<String>, CollaboratorError>;
}

/// Read access to recent source-control history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommitSource: Send + Sync {
    /// Fetch up to `limit` most-recent commits touching the repository that
    /// deploys `service`.
    async fn recent_commits(
        &self,
        service: &str,
        limit: usize,
    ) -> Result<Vec<CommitInfo>, CollaboratorError>;
}

/// Mutating access to the container-orchestration platform
///
/// Both operations report failure as `false` rather than raising, so the
/// executor needs no fault handling around them.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait InfraActuator: Send + Sync {
    /// Force a fresh deployment of `service` in `cluster`.
    async fn force_redeploy(&self, cluster: &str, service: &str) -> bool;

    /// Set the desired task count for `service` in `cluster`.
    async fn set_desired_count(&self, cluster: &str, service: &str, count: u32) -> bool;
}

/// Result of asking the source-control host for a revert PR
#[derive(Debug, Clone)]
pub struct RevertOutcome {
    /// Whether the PR was opened
    pub success: bool,
    /// URL of the opened PR, when available
    pub pr_url: Option<String>,
    /// Host-provided description of what happened
    pub message: String,
}

/// Mutating access to the source-control host
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ScmActuator: Send + Sync {
    /// Open a pull request reverting `commit_sha`, citing `reason`.
    async fn create_revert_pr(&self, commit_sha: &str, reason: &str) -> RevertOutcome;
}

/// Post-remediation health signal
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HealthProbe: Send + Sync {
    /// Whether `service` looks healthy right now.
    async fn healthy(&self, service: &str) -> Result<bool, CollaboratorError>;
}

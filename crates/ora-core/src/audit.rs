//! Audit collection
//!
//! Fetches the most recent commits for the affected service so the executor
//! has a revert candidate. Same degradation contract as diagnostics: a
//! failing commit source yields an empty list, never a fault.

use crate::collab::CommitSource;
use crate::types::{AuditContext, Collected};
use std::sync::Arc;
use tracing::{debug, warn};

const DEFAULT_COMMIT_LIMIT: usize = 5;

/// Collects recent commits for one service
#[derive(Clone)]
pub struct AuditCollector {
    source: Arc<dyn CommitSource>,
    limit: usize,
}

impl AuditCollector {
    /// Collector fetching up to five commits
    #[must_use]
    pub fn new(source: Arc<dyn CommitSource>) -> Self {
        Self {
            source,
            limit: DEFAULT_COMMIT_LIMIT,
        }
    }

    /// With a different commit limit
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Collect recent commits for `service`, never raising
    pub async fn collect(&self, service: &str) -> Collected<AuditContext> {
        debug!(%service, limit = self.limit, "querying commit source");

        match self.source.recent_commits(service, self.limit).await {
            Ok(commits) => Collected::fresh(AuditContext { commits }),
            Err(cause) => {
                warn!(error = %cause, %service, "commit source unavailable, proceeding without commits");
                Collected::degraded(AuditContext::default(), cause)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::MockCommitSource;
    use crate::error::CollaboratorError;
    use crate::types::CommitInfo;
    use chrono::Utc;

    fn commit(sha: &str) -> CommitInfo {
        CommitInfo {
            sha: sha.to_string(),
            message: "tune retries".to_string(),
            author: "dev".to_string(),
            date: Utc::now(),
        }
    }

    #[tokio::test]
    async fn failing_source_yields_empty_commits() {
        let mut mock = MockCommitSource::new();
        mock.expect_recent_commits()
            .returning(|_, _| Err(CollaboratorError::Auth("bad token".to_string())));

        let collected = AuditCollector::new(Arc::new(mock)).collect("checkout").await;

        assert!(collected.is_degraded());
        assert!(collected.value.commits.is_empty());
    }

    #[tokio::test]
    async fn commits_pass_through_with_default_limit() {
        let mut mock = MockCommitSource::new();
        mock.expect_recent_commits()
            .withf(|service, limit| service == "checkout" && *limit == 5)
            .times(1)
            .returning(|_, _| Ok(vec![commit("abc123"), commit("def456")]));

        let collected = AuditCollector::new(Arc::new(mock)).collect("checkout").await;

        assert!(!collected.is_degraded());
        assert_eq!(collected.value.commits.len(), 2);
        assert_eq!(collected.value.commits[0].sha, "abc123");
    }
}

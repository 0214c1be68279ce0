//! Source-control forge client
//!
//! Lists recent commits and opens revert PRs against a GitHub-compatible
//! API. Without credentials the client degrades to clearly labeled
//! placeholder data instead of failing, so demonstration deployments always
//! have a revert candidate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ora_core::collab::{CommitSource, RevertOutcome, ScmActuator};
use ora_core::error::CollaboratorError;
use ora_core::types::CommitInfo;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

const FORGE_URL_VAR: &str = "ORA_FORGE_URL";
const FORGE_OWNER_VAR: &str = "ORA_FORGE_OWNER";
const FORGE_REPO_VAR: &str = "ORA_FORGE_REPO";
const FORGE_TOKEN_VAR: &str = "ORA_FORGE_TOKEN";
const FORGE_BRANCH_VAR: &str = "ORA_FORGE_BRANCH";

const DEFAULT_FORGE_URL: &str = "https://api.github.com";
const DEFAULT_BRANCH: &str = "main";

const PLACEHOLDER_SHA: &str = "0000000placeholder";

/// Forge endpoint and repository configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForgeConfig {
    /// Base URL of the forge API
    pub api_url: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Default branch revert PRs target
    pub default_branch: String,
    /// API token; absent means placeholder mode
    pub token: Option<String>,
}

impl ForgeConfig {
    /// Snapshot the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot the configuration from an arbitrary lookup function
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            api_url: lookup(FORGE_URL_VAR).unwrap_or_else(|| DEFAULT_FORGE_URL.to_string()),
            owner: lookup(FORGE_OWNER_VAR).unwrap_or_else(|| "example".to_string()),
            repo: lookup(FORGE_REPO_VAR).unwrap_or_else(|| "platform".to_string()),
            default_branch: lookup(FORGE_BRANCH_VAR).unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            token: lookup(FORGE_TOKEN_VAR).filter(|t| !t.is_empty()),
        }
    }
}

/// Commit entry as the forge API returns it
#[derive(Debug, Deserialize)]
struct ForgeCommitEntry {
    sha: String,
    commit: ForgeCommitBody,
}

#[derive(Debug, Deserialize)]
struct ForgeCommitBody {
    message: String,
    author: ForgeCommitAuthor,
}

#[derive(Debug, Deserialize)]
struct ForgeCommitAuthor {
    name: String,
    date: DateTime<Utc>,
}

impl From<ForgeCommitEntry> for CommitInfo {
    fn from(entry: ForgeCommitEntry) -> Self {
        let title = entry
            .commit
            .message
            .lines()
            .next()
            .unwrap_or_default()
            .to_string();
        CommitInfo {
            sha: entry.sha,
            message: title,
            author: entry.commit.author.name,
            date: entry.commit.author.date,
        }
    }
}

/// GitHub-compatible forge client
pub struct ForgeClient {
    http: reqwest::Client,
    config: ForgeConfig,
}

impl ForgeClient {
    /// Client for the configured forge and repository
    pub fn new(config: ForgeConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            http: crate::http_client()?,
            config,
        })
    }

    fn repo_url(&self, tail: &str) -> String {
        format!(
            "{}/repos/{}/{}/{tail}",
            self.config.api_url, self.config.owner, self.config.repo
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get_json(&self, url: &str) -> Result<serde_json::Value, CollaboratorError> {
        let response = self
            .authorized(self.http.get(url))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(crate::transport_error)?;
        if let Some(fault) = crate::status_error(response.status(), url) {
            return Err(fault);
        }
        response
            .json()
            .await
            .map_err(|e| CollaboratorError::Transport(format!("bad forge payload: {e}")))
    }

    async fn post_json(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<serde_json::Value, CollaboratorError> {
        let response = self
            .authorized(self.http.post(url))
            .header("Accept", "application/vnd.github.v3+json")
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;
        if let Some(fault) = crate::status_error(response.status(), url) {
            return Err(fault);
        }
        response
            .json()
            .await
            .map_err(|e| CollaboratorError::Transport(format!("bad forge payload: {e}")))
    }

    /// The placeholder commit served when no credentials are configured
    fn placeholder_commit(service: &str) -> CommitInfo {
        CommitInfo {
            sha: PLACEHOLDER_SHA.to_string(),
            message: format!("Placeholder commit for {service} (no forge credentials)"),
            author: "ora".to_string(),
            date: Utc::now(),
        }
    }

    async fn open_revert_pr(
        &self,
        commit_sha: &str,
        reason: &str,
    ) -> Result<RevertOutcome, CollaboratorError> {
        // Title the PR from the commit being reverted.
        let commit = self.get_json(&self.repo_url(&format!("commits/{commit_sha}"))).await?;
        let title_line = commit["commit"]["message"]
            .as_str()
            .unwrap_or(commit_sha)
            .lines()
            .next()
            .unwrap_or(commit_sha)
            .to_string();

        // Branch the revert off the default branch head.
        let head = self
            .get_json(&self.repo_url(&format!(
                "git/ref/heads/{}",
                self.config.default_branch
            )))
            .await?;
        let base_sha = head["object"]["sha"].as_str().unwrap_or_default().to_string();

        let short = &commit_sha[..commit_sha.len().min(7)];
        let branch = format!("ora/revert-{short}");
        if let Err(fault) = self
            .post_json(
                &self.repo_url("git/refs"),
                json!({ "ref": format!("refs/heads/{branch}"), "sha": base_sha }),
            )
            .await
        {
            // The branch may exist from an earlier attempt; the PR call
            // decides whether that matters.
            debug!(%branch, %fault, "revert branch creation failed");
        }

        let pr = self
            .post_json(
                &self.repo_url("pulls"),
                json!({
                    "title": format!("[ora] Revert: {title_line}"),
                    "body": format!(
                        "Automated revert.\n\n**Reason:** {reason}\n\n**Reverted commit:** {commit_sha}"
                    ),
                    "head": branch,
                    "base": self.config.default_branch,
                }),
            )
            .await?;

        let pr_url = pr["html_url"].as_str().map(|u| u.to_string());
        let number = pr["number"].as_u64().unwrap_or_default();
        info!(pr = number, "revert PR opened");
        Ok(RevertOutcome {
            success: true,
            pr_url,
            message: format!("Created PR #{number} to revert {short}"),
        })
    }
}

#[async_trait]
impl CommitSource for ForgeClient {
    async fn recent_commits(
        &self,
        service: &str,
        limit: usize,
    ) -> Result<Vec<CommitInfo>, CollaboratorError> {
        if self.config.token.is_none() {
            warn!("no forge token configured, serving placeholder commit");
            return Ok(vec![Self::placeholder_commit(service)]);
        }

        let url = self.repo_url(&format!("commits?per_page={limit}"));
        debug!(%service, limit, "listing recent commits");

        let response = self
            .authorized(self.http.get(&url))
            .header("Accept", "application/vnd.github.v3+json")
            .send()
            .await
            .map_err(crate::transport_error)?;
        if let Some(fault) = crate::status_error(response.status(), &url) {
            return Err(fault);
        }

        let entries: Vec<ForgeCommitEntry> = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Transport(format!("bad commit payload: {e}")))?;

        Ok(entries.into_iter().map(CommitInfo::from).collect())
    }
}

#[async_trait]
impl ScmActuator for ForgeClient {
    async fn create_revert_pr(&self, commit_sha: &str, reason: &str) -> RevertOutcome {
        if self.config.token.is_none() {
            warn!("no forge token configured, serving placeholder revert PR");
            return RevertOutcome {
                success: true,
                pr_url: Some(format!(
                    "https://github.com/{}/{}/pull/placeholder",
                    self.config.owner, self.config.repo
                )),
                message: format!("[placeholder] Would create revert PR for commit {commit_sha}"),
            };
        }

        match self.open_revert_pr(commit_sha, reason).await {
            Ok(outcome) => outcome,
            Err(fault) => {
                warn!(%fault, %commit_sha, "revert PR failed");
                RevertOutcome {
                    success: false,
                    pr_url: None,
                    message: fault.to_string(),
                }
            }
        }
    }
}

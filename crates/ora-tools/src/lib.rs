//! ORA Tools
//!
//! Concrete clients for the collaborator seams defined by `ora-core`:
//! - `LogStoreClient`: recent error logs from a REST log store
//! - `ForgeClient`: commit history and revert PRs on a source-control host
//! - `ClusterClient`: redeploy and scaling calls against the orchestration
//!   platform
//!
//! Clients report faults as `CollaboratorError` (or `false`, for the
//! actuators); the degradation policy lives in the core stages.

pub mod cluster;
pub mod forge;
pub mod logstore;

pub use cluster::{ClusterClient, ClusterConfig};
pub use forge::{ForgeClient, ForgeConfig};
pub use logstore::{LogStoreClient, LogStoreConfig};

use ora_core::error::CollaboratorError;
use std::time::Duration;

/// Client-side deadline for every collaborator call
pub(crate) const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Build the shared HTTP client
pub(crate) fn http_client() -> Result<reqwest::Client, CollaboratorError> {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent("ora-agent/0.1")
        .build()
        .map_err(|e| CollaboratorError::Transport(e.to_string()))
}

/// Map a transport-level reqwest failure onto the seam error
pub(crate) fn transport_error(err: reqwest::Error) -> CollaboratorError {
    if err.is_timeout() {
        CollaboratorError::Timeout(REQUEST_TIMEOUT)
    } else {
        CollaboratorError::Transport(err.to_string())
    }
}

/// Map an HTTP status onto the seam error, if it is a failure
pub(crate) fn status_error(status: reqwest::StatusCode, context: &str) -> Option<CollaboratorError> {
    if status.is_success() {
        return None;
    }
    Some(match status.as_u16() {
        404 => CollaboratorError::NotFound(context.to_string()),
        401 | 403 => CollaboratorError::Auth(context.to_string()),
        _ => CollaboratorError::Transport(format!("{context}: HTTP {status}")),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        use reqwest::StatusCode;
        assert!(status_error(StatusCode::OK, "x").is_none());
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "group"),
            Some(CollaboratorError::NotFound(_))
        ));
        assert!(matches!(
            status_error(StatusCode::UNAUTHORIZED, "repo"),
            Some(CollaboratorError::Auth(_))
        ));
        assert!(matches!(
            status_error(StatusCode::INTERNAL_SERVER_ERROR, "api"),
            Some(CollaboratorError::Transport(_))
        ));
    }
}

//! Cluster actuator client
//!
//! Drives the container-orchestration platform: forced redeploys and
//! desired-count updates. Per the actuator contract both operations report
//! failure as `false`, logging the cause, so the executor stays free of
//! fault handling.

use async_trait::async_trait;
use ora_core::collab::InfraActuator;
use ora_core::error::CollaboratorError;
use serde_json::json;
use tracing::{info, warn};

const CLUSTER_API_URL_VAR: &str = "ORA_CLUSTER_API_URL";
const DEFAULT_CLUSTER_API_URL: &str = "http://127.0.0.1:4700";

/// Orchestration platform endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterConfig {
    /// Base URL of the orchestration API
    pub base_url: String,
}

impl ClusterConfig {
    /// Snapshot the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot the configuration from an arbitrary lookup function
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup(CLUSTER_API_URL_VAR)
                .unwrap_or_else(|| DEFAULT_CLUSTER_API_URL.to_string()),
        }
    }
}

/// Orchestration platform client
pub struct ClusterClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClusterClient {
    /// Client for the configured endpoint
    pub fn new(config: ClusterConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            http: crate::http_client()?,
            base_url: config.base_url,
        })
    }

    fn service_url(&self, cluster: &str, service: &str, tail: &str) -> String {
        format!(
            "{}/clusters/{cluster}/services/{service}/{tail}",
            self.base_url
        )
    }

    async fn post(
        &self,
        url: &str,
        body: serde_json::Value,
    ) -> Result<(), CollaboratorError> {
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(crate::transport_error)?;
        match crate::status_error(response.status(), url) {
            Some(fault) => Err(fault),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl InfraActuator for ClusterClient {
    async fn force_redeploy(&self, cluster: &str, service: &str) -> bool {
        let url = self.service_url(cluster, service, "redeploy");
        match self.post(&url, json!({ "force": true })).await {
            Ok(()) => {
                info!(%cluster, %service, "redeploy initiated");
                true
            }
            Err(fault) => {
                warn!(%cluster, %service, %fault, "redeploy failed");
                false
            }
        }
    }

    async fn set_desired_count(&self, cluster: &str, service: &str, count: u32) -> bool {
        let url = self.service_url(cluster, service, "desired-count");
        match self.post(&url, json!({ "count": count })).await {
            Ok(()) => {
                info!(%cluster, %service, count, "desired count updated");
                true
            }
            Err(fault) => {
                warn!(%cluster, %service, count, %fault, "desired count update failed");
                false
            }
        }
    }
}

//! Log store client
//!
//! Queries a REST log store for recent entries matching an error filter.
//! Faults surface as `CollaboratorError`; the diagnostic collector turns
//! them into degraded analysis.

use async_trait::async_trait;
use ora_core::collab::LogSource;
use ora_core::error::CollaboratorError;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const LOG_STORE_URL_VAR: &str = "ORA_LOG_STORE_URL";
const DEFAULT_LOG_STORE_URL: &str = "http://127.0.0.1:4600";

/// Log store endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogStoreConfig {
    /// Base URL of the log store API
    pub base_url: String,
}

impl LogStoreConfig {
    /// Snapshot the configuration from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot the configuration from an arbitrary lookup function
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            base_url: lookup(LOG_STORE_URL_VAR)
                .unwrap_or_else(|| DEFAULT_LOG_STORE_URL.to_string()),
        }
    }
}

/// One entry in the log store response
#[derive(Debug, Deserialize)]
struct LogEvent {
    message: String,
}

/// Log store query response
#[derive(Debug, Deserialize)]
struct EventsResponse {
    #[serde(default)]
    events: Vec<LogEvent>,
}

/// REST log store client
pub struct LogStoreClient {
    http: reqwest::Client,
    base_url: String,
}

impl LogStoreClient {
    /// Client for the configured endpoint
    pub fn new(config: LogStoreConfig) -> Result<Self, CollaboratorError> {
        Ok(Self {
            http: crate::http_client()?,
            base_url: config.base_url,
        })
    }
}

#[async_trait]
impl LogSource for LogStoreClient {
    async fn query(
        &self,
        log_group: &str,
        filter: &str,
        lookback: Duration,
        limit: usize,
    ) -> Result<Vec<String>, CollaboratorError> {
        let url = format!("{}/events", self.base_url);
        let lookback_minutes = (lookback.as_secs() / 60).to_string();
        let limit = limit.to_string();
        debug!(%log_group, %filter, %lookback_minutes, %limit, "log store query");

        let response = self
            .http
            .get(&url)
            .query(&[
                ("group", log_group),
                ("filter", filter),
                ("lookback_minutes", lookback_minutes.as_str()),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(crate::transport_error)?;

        if let Some(fault) = crate::status_error(response.status(), log_group) {
            return Err(fault);
        }

        let body: EventsResponse = response
            .json()
            .await
            .map_err(|e| CollaboratorError::Transport(format!("bad events payload: {e}")))?;

        Ok(body.events.into_iter().map(|e| e.message).collect())
    }
}

//! HTTP server for the agent

use crate::metrics::AgentMetrics;
use crate::routes;
use anyhow::Result;
use ora_core::{FeatureFlags, Orchestrator};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub orchestrator: Orchestrator,
    /// Flag snapshot taken at process start, passed into every run
    pub flags: FeatureFlags,
    pub metrics: AgentMetrics,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, flags: FeatureFlags) -> Self {
        Self {
            orchestrator,
            flags,
            metrics: AgentMetrics::new(),
        }
    }
}

/// Run the HTTP server
pub async fn run(addr: &str, state: AppState) -> Result<()> {
    let state = Arc::new(state);

    let app = routes::router()
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

//! HTTP routes: webhook ingestion, health, metrics

use crate::ingest;
use crate::server::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use ora_core::types::ExecutionDisposition;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/webhook", post(webhook))
        .route("/metrics", get(metrics))
}

async fn root() -> Json<serde_json::Value> {
    Json(json!({ "message": "ORA agent is running" }))
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "healthy", "service": "ora-agent" }))
}

async fn webhook(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<serde_json::Value>,
) -> Json<serde_json::Value> {
    state.metrics.alerts_received.inc();

    let alert = ingest::alert_from_payload(&payload);
    info!(alert = %alert.alert_name, service = %alert.service, "webhook alert received");

    let result = state.orchestrator.run(alert, &state.flags).await;

    let action = result
        .action()
        .map(|a| a.as_str())
        .unwrap_or("unknown");
    state
        .metrics
        .remediations_attempted
        .with_label_values(&[action])
        .inc();
    // A successful remediation means an actuator ran and verification held;
    // escalations and policy denials are attempts, not successes.
    let succeeded = result.disposition == Some(ExecutionDisposition::Applied)
        && result.outcome.as_ref().map(|o| o.succeeded).unwrap_or(false);
    if succeeded {
        state
            .metrics
            .remediations_successful
            .with_label_values(&[action])
            .inc();
    }

    Json(json!({
        "status": "processed",
        "action": action,
        "result": result.outcome_message().unwrap_or("No outcome produced."),
        "error": result.error,
    }))
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.render() {
        Ok(text) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

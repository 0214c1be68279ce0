//! Prometheus metrics for the agent

use prometheus::{
    register_int_counter_vec_with_registry, register_int_counter_with_registry, Encoder,
    IntCounter, IntCounterVec, Registry, TextEncoder,
};
use std::sync::Arc;

/// Counters the outcome boundary maintains per run
#[derive(Clone)]
pub struct AgentMetrics {
    /// Alerts received on the webhook
    pub alerts_received: IntCounter,
    /// Remediation attempts by action
    pub remediations_attempted: IntCounterVec,
    /// Successful remediations by action
    pub remediations_successful: IntCounterVec,

    registry: Arc<Registry>,
}

impl AgentMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();

        let alerts_received = register_int_counter_with_registry!(
            "ora_alerts_received_total",
            "Total alerts received by the agent",
            registry
        )
        .unwrap();

        let remediations_attempted = register_int_counter_vec_with_registry!(
            "ora_remediations_attempted_total",
            "Total remediation attempts by action",
            &["action"],
            registry
        )
        .unwrap();

        let remediations_successful = register_int_counter_vec_with_registry!(
            "ora_remediations_successful_total",
            "Total successful remediations by action",
            &["action"],
            registry
        )
        .unwrap();

        Self {
            alerts_received,
            remediations_attempted,
            remediations_successful,
            registry: Arc::new(registry),
        }
    }

    /// Render the registry in Prometheus text exposition format
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }
}

impl Default for AgentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

//! Alert ingestion
//!
//! Translates the upstream alerting payload into an `AlertInfo`. Missing
//! fields default rather than fail; the full payload rides along in
//! `details` for operator context.

use ora_core::types::AlertInfo;
use serde_json::Value;

/// Build an `AlertInfo` from an alerting webhook payload
pub fn alert_from_payload(payload: &Value) -> AlertInfo {
    let alert_name = payload
        .pointer("/groupLabels/alertname")
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let severity = payload
        .pointer("/commonLabels/severity")
        .and_then(Value::as_str)
        .unwrap_or("unknown");
    let service = payload
        .pointer("/commonLabels/instance")
        .and_then(Value::as_str)
        .unwrap_or("unknown");

    let mut alert = AlertInfo::new(alert_name, severity, service);
    if let Some(fields) = payload.as_object() {
        for (key, value) in fields {
            alert = alert.with_detail(key, value.clone());
        }
    }
    alert
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn full_payload_maps_all_fields() {
        let payload = json!({
            "groupLabels": { "alertname": "HighErrorRate" },
            "commonLabels": { "severity": "critical", "instance": "checkout" },
            "status": "firing"
        });

        let alert = alert_from_payload(&payload);

        assert_eq!(alert.alert_name, "HighErrorRate");
        assert_eq!(alert.severity, "critical");
        assert_eq!(alert.service, "checkout");
        assert_eq!(alert.details.len(), 3);
    }

    #[test]
    fn missing_fields_default() {
        let alert = alert_from_payload(&json!({}));

        assert_eq!(alert.alert_name, "Unknown");
        assert_eq!(alert.severity, "unknown");
        assert_eq!(alert.service, "unknown");
    }

    #[test]
    fn non_object_payload_still_defaults() {
        let alert = alert_from_payload(&json!("not an object"));
        assert_eq!(alert.service, "unknown");
        assert!(alert.details.is_empty());
    }
}

//! The decision engine
//!
//! Turns an analysis summary and the run's retry count into a
//! `RemediationPlan`. Pure and deterministic: same inputs, same plan.
//! Ordering of the checks matters: circuit breaker, then classification,
//! then the confidence gate.

use crate::classifier::{Classifier, KeywordClassifier};
use crate::types::{RemediationAction, RemediationPlan};
use tracing::warn;

/// Autonomous retries allowed before the circuit breaker trips
pub const RETRY_LIMIT: u32 = 2;

/// Minimum confidence for an autonomous action
pub const CONFIDENCE_FLOOR: f64 = 0.7;

/// Produces remediation plans from diagnostic analysis
pub struct DecisionEngine {
    classifier: Box<dyn Classifier>,
}

impl DecisionEngine {
    /// Engine with the default keyword classifier
    #[must_use]
    pub fn new() -> Self {
        Self::with_classifier(Box::new(KeywordClassifier))
    }

    /// Engine with a custom classifier
    #[must_use]
    pub fn with_classifier(classifier: Box<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Decide what to do about `analysis` given `retry_count` prior attempts
    ///
    /// Invariants, regardless of classifier:
    /// - `retry_count > RETRY_LIMIT` always escalates with confidence 1.0
    /// - any classification below `CONFIDENCE_FLOOR` escalates, keeping the
    ///   classifier's confidence for the record
    #[must_use]
    pub fn decide(&self, analysis: &str, retry_count: u32) -> RemediationPlan {
        if retry_count > RETRY_LIMIT {
            warn!(retry_count, "circuit breaker tripped, escalating");
            return RemediationPlan {
                action: RemediationAction::Escalate,
                reasoning: "Circuit breaker tripped.".to_string(),
                confidence: 1.0,
            };
        }

        let (action, confidence) = self.classifier.classify(analysis);

        if confidence < CONFIDENCE_FLOOR {
            warn!(%action, confidence, "confidence below floor, escalating");
            return RemediationPlan {
                action: RemediationAction::Escalate,
                reasoning: "Low confidence in autonomous fix.".to_string(),
                confidence,
            };
        }

        RemediationPlan {
            action,
            reasoning: format!("Based on analysis: {analysis}"),
            confidence,
        }
    }
}

impl Default for DecisionEngine {
    fn default() -> Self {
        Self::new()
    }
}

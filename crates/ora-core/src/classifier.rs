//! Analysis classification
//!
//! Maps a diagnostic analysis string to an `(action, confidence)` pair. The
//! keyword table below is the default implementation; the trait exists so a
//! smarter classifier can slot in without touching the decision engine.

use crate::types::RemediationAction;

/// Maps an analysis summary to a candidate action with a confidence score
pub trait Classifier: Send + Sync {
    /// Classify `analysis` into an action and a confidence in [0.0, 1.0].
    ///
    /// The confidence gate downstream may still override the action; an
    /// implementation should not apply the gate itself.
    fn classify(&self, analysis: &str) -> (RemediationAction, f64);
}

/// Ordered first-match keyword classification
///
/// Rule order is significant: an analysis matching several rows resolves to
/// the first. Quoted tokens match case-sensitively unless noted.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl Classifier for KeywordClassifier {
    fn classify(&self, analysis: &str) -> (RemediationAction, f64) {
        let lower = analysis.to_lowercase();

        if analysis.contains("Connection refused") || analysis.contains("Network") {
            (RemediationAction::RestartService, 0.90)
        } else if analysis.contains("High CPU")
            || lower.contains("capacity")
            || lower.contains("overload")
        {
            (RemediationAction::ScaleUp, 0.85)
        } else if analysis.contains("NullPointer")
            || analysis.contains("TypeError")
            || lower.contains("undefined")
        {
            // Code-shaped failures point at a recent deploy
            (RemediationAction::RevertCommit, 0.75)
        } else if lower.contains("test") || lower.contains("simulated") {
            (RemediationAction::RestartService, 0.95)
        } else {
            (RemediationAction::RestartService, 0.80)
        }
    }
}

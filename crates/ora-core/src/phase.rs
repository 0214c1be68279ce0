//! Run phases and the transition table
//!
//! One remediation run is an explicit finite-state machine. The pipeline is
//! linear; the only backward edges are the bounded retry edges out of
//! `Verifying`, routed by the orchestrator's retry policy.

use crate::error::PhaseError;
use serde::{Deserialize, Serialize};

/// Phases of one remediation run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RunPhase {
    /// Collecting log evidence (audit collection overlaps with this phase)
    Diagnosing,
    /// Joining the commit audit
    Auditing,
    /// Producing a remediation plan
    Deciding,
    /// Executing the plan against infrastructure
    Remediating,
    /// Checking post-remediation health
    Verifying,
    /// Terminal
    Done,
}

/// Validates a phase transition against the allowed table.
pub fn validate_transition(from: RunPhase, to: RunPhase) -> Result<(), PhaseError> {
    if allowed(from, to) {
        Ok(())
    } else {
        Err(PhaseError::IllegalTransition { from, to })
    }
}

pub fn allowed_transitions(from: RunPhase) -> Vec<RunPhase> {
    use RunPhase::*;
    match from {
        Diagnosing => vec![Auditing],
        Auditing => vec![Deciding],
        Deciding => vec![Remediating],
        Remediating => vec![Verifying],
        Verifying => vec![Done, Deciding, Diagnosing],
        Done => vec![],
    }
}

fn allowed(from: RunPhase, to: RunPhase) -> bool {
    allowed_transitions(from).into_iter().any(|p| p == to)
}

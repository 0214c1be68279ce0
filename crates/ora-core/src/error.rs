//! Error types for ORA Core
//!
//! Two families cross module boundaries:
//! - `CollaboratorError`: the only fault an external collaborator may raise
//!   across the seam; stages absorb it into degraded values
//! - `PhaseError`: illegal orchestrator phase transitions

use crate::phase::RunPhase;
use std::time::Duration;

/// Fault reported by an external collaborator
///
/// A stage that receives one must convert it into its documented degraded
/// value; it never crosses a stage boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CollaboratorError {
    /// Transport-level failure (connect, TLS, protocol)
    #[error("transport error: {0}")]
    Transport(String),

    /// The queried resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Credentials missing or rejected
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The call exceeded its deadline
    #[error("timed out after {0:?}")]
    Timeout(Duration),
}

/// Orchestrator phase transition errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PhaseError {
    /// The transition is not in the allowed table
    #[error("illegal phase transition: {from:?} -> {to:?}")]
    IllegalTransition {
        /// Phase the run was in
        from: RunPhase,
        /// Phase the run tried to enter
        to: RunPhase,
    },
}

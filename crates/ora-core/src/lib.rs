//! ORA Core
//!
//! The remediation decision-and-execution state machine: given an alert for
//! an unhealthy service, collect diagnostic and audit context, decide on a
//! graded remediation action, execute it behind feature-flag policy, and
//! verify the result. External systems sit behind the `collab` traits; every
//! stage absorbs collaborator faults into documented degraded values.

pub mod audit;
pub mod classifier;
pub mod collab;
pub mod decision;
pub mod diagnostics;
pub mod error;
pub mod executor;
pub mod flags;
pub mod orchestrator;
pub mod phase;
pub mod types;
pub mod verifier;

pub use error::*;
pub use flags::FeatureFlags;
pub use phase::*;
pub use types::*;

pub use audit::AuditCollector;
pub use classifier::{Classifier, KeywordClassifier};
pub use decision::{DecisionEngine, CONFIDENCE_FLOOR, RETRY_LIMIT};
pub use diagnostics::DiagnosticCollector;
pub use executor::{DeployTarget, RemediationExecutor};
pub use orchestrator::{Orchestrator, OrchestratorConfig, RetryPolicy};
pub use verifier::{AssumeRecovered, OutcomeVerifier, Verdict};

//! Feature flags gating autonomous actions
//!
//! Each action class other than escalation is individually
//! enablement-controlled. The flags are an immutable snapshot taken at
//! process start and passed into the executor per run; nothing reads the
//! environment mid-run.

use crate::types::RemediationAction;
use serde::{Deserialize, Serialize};

const ENABLE_RESTART: &str = "ORA_ENABLE_RESTART";
const ENABLE_SCALE_UP: &str = "ORA_ENABLE_SCALE_UP";
const ENABLE_REVERT: &str = "ORA_ENABLE_REVERT";

/// Enablement switches for autonomous remediation actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    restart_service: bool,
    scale_up: bool,
    revert_commit: bool,
}

impl FeatureFlags {
    /// Snapshot the flags from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Snapshot the flags from an arbitrary lookup function
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let parse = |key: &str, default: bool| {
            lookup(key)
                .map(|v| v.eq_ignore_ascii_case("true"))
                .unwrap_or(default)
        };
        Self {
            restart_service: parse(ENABLE_RESTART, true),
            scale_up: parse(ENABLE_SCALE_UP, true),
            // Reverts touch source control, so they ship disabled
            revert_commit: parse(ENABLE_REVERT, false),
        }
    }

    /// Flags with every action enabled
    #[inline]
    #[must_use]
    pub fn allow_all() -> Self {
        Self {
            restart_service: true,
            scale_up: true,
            revert_commit: true,
        }
    }

    /// With restart enabled/disabled
    #[inline]
    #[must_use]
    pub fn with_restart_service(mut self, enabled: bool) -> Self {
        self.restart_service = enabled;
        self
    }

    /// With scale-up enabled/disabled
    #[inline]
    #[must_use]
    pub fn with_scale_up(mut self, enabled: bool) -> Self {
        self.scale_up = enabled;
        self
    }

    /// With revert enabled/disabled
    #[inline]
    #[must_use]
    pub fn with_revert_commit(mut self, enabled: bool) -> Self {
        self.revert_commit = enabled;
        self
    }

    /// Whether `action` may run autonomously
    ///
    /// Escalation is always allowed.
    #[inline]
    #[must_use]
    pub fn allows(&self, action: RemediationAction) -> bool {
        match action {
            RemediationAction::RestartService => self.restart_service,
            RemediationAction::ScaleUp => self.scale_up,
            RemediationAction::RevertCommit => self.revert_commit,
            RemediationAction::Escalate => true,
        }
    }
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            restart_service: true,
            scale_up: true,
            revert_commit: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        let map: HashMap<&str, &str> = pairs.iter().copied().collect();
        move |key| map.get(key).map(|v| v.to_string())
    }

    #[test]
    fn defaults_keep_revert_disabled() {
        let flags = FeatureFlags::from_lookup(|_| None);
        assert!(flags.allows(RemediationAction::RestartService));
        assert!(flags.allows(RemediationAction::ScaleUp));
        assert!(!flags.allows(RemediationAction::RevertCommit));
    }

    #[test]
    fn escalate_is_always_allowed() {
        let flags = FeatureFlags::default()
            .with_restart_service(false)
            .with_scale_up(false)
            .with_revert_commit(false);
        assert!(flags.allows(RemediationAction::Escalate));
    }

    #[test]
    fn lookup_values_are_case_insensitive_true() {
        let flags = FeatureFlags::from_lookup(lookup_from(&[
            ("ORA_ENABLE_RESTART", "False"),
            ("ORA_ENABLE_REVERT", "TRUE"),
        ]));
        assert!(!flags.allows(RemediationAction::RestartService));
        assert!(flags.allows(RemediationAction::RevertCommit));
        // untouched key keeps its default
        assert!(flags.allows(RemediationAction::ScaleUp));
    }

    #[test]
    fn garbage_values_read_as_disabled() {
        let flags = FeatureFlags::from_lookup(lookup_from(&[("ORA_ENABLE_SCALE_UP", "yes")]));
        assert!(!flags.allows(RemediationAction::ScaleUp));
    }
}

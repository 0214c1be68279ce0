//! Diagnostic collection
//!
//! Fetches recent error logs for the affected service and condenses them
//! into a textual analysis. Best-effort: a failing log store downgrades the
//! analysis, it never fails the run.

use crate::collab::LogSource;
use crate::types::{Collected, DiagnosticContext};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Analysis recorded when no log evidence exists
pub const NO_LOGS_ANALYSIS: &str =
    "No logs found. Possible health check failure or network issue.";

/// Analysis recorded when logs exist but carry no error markers
pub const NO_EXPLICIT_ERRORS_ANALYSIS: &str = "Logs found but no explicit errors detected.";

const DEFAULT_LOG_GROUP_PREFIX: &str = "/ecs";
const DEFAULT_FILTER: &str = "ERROR";
const DEFAULT_LOOKBACK: Duration = Duration::from_secs(15 * 60);
const DEFAULT_LIMIT: usize = 50;

/// Sample length for the top error line in the analysis
const SAMPLE_CHARS: usize = 100;

/// Collects log evidence for one service
#[derive(Clone)]
pub struct DiagnosticCollector {
    source: Arc<dyn LogSource>,
    log_group_prefix: String,
    filter: String,
    lookback: Duration,
    limit: usize,
}

impl DiagnosticCollector {
    /// Collector with the default query window
    #[must_use]
    pub fn new(source: Arc<dyn LogSource>) -> Self {
        Self {
            source,
            log_group_prefix: DEFAULT_LOG_GROUP_PREFIX.to_string(),
            filter: DEFAULT_FILTER.to_string(),
            lookback: DEFAULT_LOOKBACK,
            limit: DEFAULT_LIMIT,
        }
    }

    /// With a log-group namespace prefix
    #[inline]
    #[must_use]
    pub fn with_log_group_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.log_group_prefix = prefix.into();
        self
    }

    /// With a different error filter
    #[inline]
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// With a different lookback window
    #[inline]
    #[must_use]
    pub fn with_lookback(mut self, lookback: Duration) -> Self {
        self.lookback = lookback;
        self
    }

    /// With a different entry limit
    #[inline]
    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    /// Collect logs and derive the analysis for `service`
    ///
    /// Never raises. A log-store fault is absorbed into an empty log list
    /// and the degradation is reported on the returned `Collected`.
    pub async fn collect(&self, service: &str) -> Collected<DiagnosticContext> {
        let log_group = format!("{}/{}", self.log_group_prefix, service);
        debug!(%log_group, "querying log store");

        let (logs, degradation) = match self
            .source
            .query(&log_group, &self.filter, self.lookback, self.limit)
            .await
        {
            Ok(lines) => (lines, None),
            Err(cause) => {
                warn!(error = %cause, %log_group, "log store unavailable, proceeding without logs");
                (Vec::new(), Some(cause))
            }
        };

        let analysis = analyze(&logs);
        let context = DiagnosticContext { logs, analysis };
        match degradation {
            Some(cause) => Collected::degraded(context, cause),
            None => Collected::fresh(context),
        }
    }
}

/// Condense raw log lines into a count-and-sample summary
fn analyze(logs: &[String]) -> String {
    if logs.is_empty() {
        return NO_LOGS_ANALYSIS.to_string();
    }

    let error_logs: Vec<&String> = logs
        .iter()
        .filter(|line| line.contains("Error") || line.contains("Exception"))
        .collect();

    match error_logs.first() {
        Some(top) => format!(
            "Found {} error logs. Top error: {}...",
            error_logs.len(),
            truncate_chars(top, SAMPLE_CHARS)
        ),
        None => NO_EXPLICIT_ERRORS_ANALYSIS.to_string(),
    }
}

/// Char-boundary-safe prefix of `s`
fn truncate_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::MockLogSource;
    use crate::error::CollaboratorError;

    fn collector(mock: MockLogSource) -> DiagnosticCollector {
        DiagnosticCollector::new(Arc::new(mock))
    }

    #[tokio::test]
    async fn failing_log_source_degrades_instead_of_raising() {
        let mut mock = MockLogSource::new();
        mock.expect_query()
            .returning(|_, _, _, _| Err(CollaboratorError::Transport("boom".to_string())));

        let collected = collector(mock).collect("checkout").await;

        assert!(collected.is_degraded());
        assert!(collected.value.logs.is_empty());
        assert_eq!(collected.value.analysis, NO_LOGS_ANALYSIS);
    }

    #[tokio::test]
    async fn empty_result_reads_as_no_logs() {
        let mut mock = MockLogSource::new();
        mock.expect_query().returning(|_, _, _, _| Ok(Vec::new()));

        let collected = collector(mock).collect("checkout").await;

        assert!(!collected.is_degraded());
        assert_eq!(collected.value.analysis, NO_LOGS_ANALYSIS);
    }

    #[tokio::test]
    async fn error_lines_are_counted_and_sampled() {
        let mut mock = MockLogSource::new();
        mock.expect_query().returning(|_, _, _, _| {
            Ok(vec![
                "INFO started".to_string(),
                "Error: Connection refused".to_string(),
                "Exception in thread main".to_string(),
            ])
        });

        let collected = collector(mock).collect("checkout").await;

        assert_eq!(
            collected.value.analysis,
            "Found 2 error logs. Top error: Error: Connection refused..."
        );
        assert_eq!(collected.value.logs.len(), 3);
    }

    #[tokio::test]
    async fn quiet_logs_read_as_no_explicit_errors() {
        let mut mock = MockLogSource::new();
        mock.expect_query()
            .returning(|_, _, _, _| Ok(vec!["INFO all good".to_string()]));

        let collected = collector(mock).collect("checkout").await;

        assert_eq!(collected.value.analysis, NO_EXPLICIT_ERRORS_ANALYSIS);
    }

    #[tokio::test]
    async fn query_uses_derived_group_and_defaults() {
        let mut mock = MockLogSource::new();
        mock.expect_query()
            .withf(|group, filter, lookback, limit| {
                group == "/ecs/checkout"
                    && filter == "ERROR"
                    && *lookback == Duration::from_secs(900)
                    && *limit == 50
            })
            .times(1)
            .returning(|_, _, _, _| Ok(Vec::new()));

        collector(mock).collect("checkout").await;
    }

    #[tokio::test]
    async fn sample_is_truncated_on_char_boundary() {
        let long = format!("Error: {}", "é".repeat(200));
        let expected_sample: String = long.chars().take(100).collect();
        let mut mock = MockLogSource::new();
        mock.expect_query()
            .returning(move |_, _, _, _| Ok(vec![long.clone()]));

        let collected = collector(mock).collect("checkout").await;

        assert_eq!(
            collected.value.analysis,
            format!("Found 1 error logs. Top error: {expected_sample}...")
        );
    }
}

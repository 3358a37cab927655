//! Run Result - the outcome of one simulator invocation

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{MetricValue, MetricsRecord, RunConfiguration};

/// Terminal status of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RunStatus {
    /// Simulator exited 0 and its stats were extracted.
    Succeeded,
    /// Simulator exited non-zero, was killed, or timed out.
    Failed,
    /// Skipped before the simulator was invoked.
    NotRun,
    /// Simulator exited 0 but its stats output could not be read.
    ExtractionFailed,
}

impl RunStatus {
    /// All statuses in report order.
    pub const ALL: [Self; 4] = [
        Self::Succeeded,
        Self::Failed,
        Self::NotRun,
        Self::ExtractionFailed,
    ];

    /// Short label used in status lines and reports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::NotRun => "not-run",
            Self::ExtractionFailed => "extraction-failed",
        }
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Run Result ties a configuration to what happened when it was run.
///
/// Created once per configuration per sweep by the executor; the metrics
/// field is filled in afterwards by the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunResult {
    configuration: RunConfiguration,
    status: RunStatus,
    output_dir: PathBuf,
    exit_code: Option<i32>,
    timed_out: bool,
    detail: Option<String>,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
    metrics: Option<MetricsRecord>,
}

impl RunResult {
    /// Create a result for a configuration that was skipped before invocation.
    ///
    /// # Arguments
    ///
    /// * `configuration` - The skipped configuration
    /// * `output_dir` - Where its output would have gone
    /// * `reason` - Why it was skipped
    #[must_use]
    pub fn not_run(
        configuration: RunConfiguration,
        output_dir: impl Into<PathBuf>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            configuration,
            status: RunStatus::NotRun,
            output_dir: output_dir.into(),
            exit_code: None,
            timed_out: false,
            detail: Some(reason.into()),
            started_at: None,
            ended_at: None,
            metrics: None,
        }
    }

    /// Create a builder for a result of an invoked run.
    #[must_use]
    pub fn builder(
        configuration: RunConfiguration,
        output_dir: impl Into<PathBuf>,
    ) -> RunResultBuilder {
        RunResultBuilder::new(configuration, output_dir)
    }

    /// Get the configuration.
    #[must_use]
    pub const fn configuration(&self) -> &RunConfiguration {
        &self.configuration
    }

    /// Get the configuration identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        self.configuration.id()
    }

    /// Get the run status.
    #[must_use]
    pub const fn status(&self) -> RunStatus {
        self.status
    }

    /// Get the run's output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Get the simulator exit code, if it exited normally.
    #[must_use]
    pub const fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }

    /// Whether the simulator was killed on timeout.
    #[must_use]
    pub const fn timed_out(&self) -> bool {
        self.timed_out
    }

    /// Get the failure or skip reason, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        self.detail.as_deref()
    }

    /// Get the start timestamp, if the simulator was launched.
    #[must_use]
    pub const fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    /// Get the end timestamp, if the simulator was launched.
    #[must_use]
    pub const fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Wall-clock seconds between launch and exit.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_secs(&self) -> Option<f64> {
        let (start, end) = (self.started_at?, self.ended_at?);
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }

    /// Get the extracted metrics. Only succeeded runs carry metrics.
    #[must_use]
    pub const fn metrics(&self) -> Option<&MetricsRecord> {
        self.metrics.as_ref()
    }

    /// Look up one metric of a succeeded run.
    #[must_use]
    pub fn metric(&self, name: &str) -> Option<MetricValue> {
        self.metrics.as_ref()?.get(name)
    }

    /// Whether the run succeeded and carries metrics.
    #[must_use]
    pub fn is_succeeded(&self) -> bool {
        self.status == RunStatus::Succeeded && self.metrics.is_some()
    }

    /// Whether the simulator process itself exited 0.
    ///
    /// True for succeeded runs and for runs whose extraction failed.
    #[must_use]
    pub const fn process_succeeded(&self) -> bool {
        matches!(
            self.status,
            RunStatus::Succeeded | RunStatus::ExtractionFailed
        )
    }

    /// Attach extracted metrics to a run whose process succeeded.
    ///
    /// Ignored for failed and not-run results.
    pub fn attach_metrics(&mut self, metrics: MetricsRecord) {
        if self.process_succeeded() {
            self.status = RunStatus::Succeeded;
            self.detail = None;
            self.metrics = Some(metrics);
        }
    }

    /// Point the result at the run directory's current location.
    pub(crate) fn relocate(&mut self, output_dir: PathBuf) {
        self.output_dir = output_dir;
    }

    /// Record that the stats output could not be read.
    ///
    /// Ignored for failed and not-run results.
    pub fn mark_extraction_failed(&mut self, reason: impl Into<String>) {
        if self.process_succeeded() {
            self.status = RunStatus::ExtractionFailed;
            self.detail = Some(reason.into());
            self.metrics = None;
        }
    }
}

/// Builder for `RunResult` of an invoked simulator.
#[derive(Debug)]
pub struct RunResultBuilder {
    configuration: RunConfiguration,
    output_dir: PathBuf,
    exit_code: Option<i32>,
    timed_out: bool,
    detail: Option<String>,
    started_at: DateTime<Utc>,
}

impl RunResultBuilder {
    /// Create a new builder, stamping the start time now.
    #[must_use]
    pub fn new(configuration: RunConfiguration, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            configuration,
            output_dir: output_dir.into(),
            exit_code: None,
            timed_out: false,
            detail: None,
            started_at: Utc::now(),
        }
    }

    /// Set a custom start timestamp.
    #[must_use]
    pub const fn started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    /// Set the process exit code.
    #[must_use]
    pub const fn exit_code(mut self, code: Option<i32>) -> Self {
        self.exit_code = code;
        self
    }

    /// Mark the run as killed on timeout.
    #[must_use]
    pub const fn timed_out(mut self, timed_out: bool) -> Self {
        self.timed_out = timed_out;
        self
    }

    /// Attach a failure detail.
    #[must_use]
    pub fn detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Build the `RunResult`, stamping the end time now.
    ///
    /// The status follows the exit code alone: `Some(0)` without a timeout
    /// succeeds, anything else fails.
    #[must_use]
    pub fn build(self) -> RunResult {
        let status = if self.exit_code == Some(0) && !self.timed_out {
            RunStatus::Succeeded
        } else {
            RunStatus::Failed
        };
        RunResult {
            configuration: self.configuration,
            status,
            output_dir: self.output_dir,
            exit_code: self.exit_code,
            timed_out: self.timed_out,
            detail: self.detail,
            started_at: Some(self.started_at),
            ended_at: Some(Utc::now()),
            metrics: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::AxisValue;

    fn config() -> RunConfiguration {
        RunConfiguration::new(vec![AxisValue::new("width", "width", "2")])
    }

    #[test]
    fn test_exit_zero_succeeds() {
        let run = RunResult::builder(config(), "/tmp/width=2")
            .exit_code(Some(0))
            .build();
        assert_eq!(run.status(), RunStatus::Succeeded);
        assert!(run.started_at().is_some());
        assert!(run.ended_at().unwrap() >= run.started_at().unwrap());
        // No metrics yet
        assert!(!run.is_succeeded());
    }

    #[test]
    fn test_nonzero_and_timeout_fail() {
        let run = RunResult::builder(config(), "out").exit_code(Some(1)).build();
        assert_eq!(run.status(), RunStatus::Failed);

        let run = RunResult::builder(config(), "out")
            .exit_code(Some(0))
            .timed_out(true)
            .build();
        assert_eq!(run.status(), RunStatus::Failed);

        let run = RunResult::builder(config(), "out").exit_code(None).build();
        assert_eq!(run.status(), RunStatus::Failed);
    }

    #[test]
    fn test_metrics_only_attach_to_successful_process() {
        let mut failed = RunResult::builder(config(), "out").exit_code(Some(1)).build();
        failed.attach_metrics(MetricsRecord::new("v"));
        assert!(failed.metrics().is_none());
        assert_eq!(failed.status(), RunStatus::Failed);

        let mut ok = RunResult::builder(config(), "out").exit_code(Some(0)).build();
        ok.mark_extraction_failed("missing stats.txt");
        assert_eq!(ok.status(), RunStatus::ExtractionFailed);
        ok.attach_metrics(MetricsRecord::new("v"));
        assert_eq!(ok.status(), RunStatus::Succeeded);
        assert!(ok.is_succeeded());
        assert!(ok.detail().is_none());
    }

    #[test]
    fn test_not_run() {
        let run = RunResult::not_run(config(), "out", "workload vanished");
        assert_eq!(run.status(), RunStatus::NotRun);
        assert_eq!(run.detail(), Some("workload vanished"));
        assert!(run.elapsed_secs().is_none());
    }

    #[test]
    fn test_status_labels() {
        let labels: Vec<&str> = RunStatus::ALL.iter().map(|s| s.label()).collect();
        assert_eq!(labels, vec!["succeeded", "failed", "not-run", "extraction-failed"]);
        assert_eq!(
            serde_json::to_string(&RunStatus::ExtractionFailed).unwrap(),
            "\"extraction-failed\""
        );
    }
}

//! Experiment Matrix - every configuration of one sweep with its result
//!
//! The matrix is the value handed from stage to stage: the executor fills
//! it, the extractor annotates it, the reporter reads it. Each sweep
//! invocation owns its own instance.

use std::collections::HashSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{RunConfiguration, RunResult, RunStatus};
use crate::{Error, Result};

/// Per-status run counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    /// Runs that succeeded with metrics
    pub succeeded: usize,
    /// Runs whose simulator failed
    pub failed: usize,
    /// Runs skipped before invocation
    pub not_run: usize,
    /// Runs whose stats could not be read
    pub extraction_failed: usize,
}

impl StatusCounts {
    /// Count for one status.
    #[must_use]
    pub const fn get(&self, status: RunStatus) -> usize {
        match status {
            RunStatus::Succeeded => self.succeeded,
            RunStatus::Failed => self.failed,
            RunStatus::NotRun => self.not_run,
            RunStatus::ExtractionFailed => self.extraction_failed,
        }
    }

    /// Total number of runs.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.succeeded + self.failed + self.not_run + self.extraction_failed
    }
}

/// Experiment Matrix holds exactly one result per configuration.
///
/// Results keep the generator's configuration order, which is also the
/// default report order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentMatrix {
    axes: Vec<String>,
    stats_file: String,
    created_at: DateTime<Utc>,
    results: Vec<RunResult>,
}

impl ExperimentMatrix {
    /// Create a matrix from results in configuration order.
    ///
    /// # Arguments
    ///
    /// * `axes` - Axis names in identifier order
    /// * `stats_file` - Stats file name inside each run directory
    /// * `results` - One result per configuration
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateConfiguration`] if two results share a
    /// configuration identifier.
    pub fn new(
        axes: Vec<String>,
        stats_file: impl Into<String>,
        results: Vec<RunResult>,
    ) -> Result<Self> {
        let mut seen = HashSet::with_capacity(results.len());
        for result in &results {
            if !seen.insert(result.id()) {
                return Err(Error::DuplicateConfiguration(result.id().to_string()));
            }
        }
        Ok(Self {
            axes,
            stats_file: stats_file.into(),
            created_at: Utc::now(),
            results,
        })
    }

    /// Get the axis names in identifier order.
    #[must_use]
    pub fn axes(&self) -> &[String] {
        &self.axes
    }

    /// Get the stats file name used inside each run directory.
    #[must_use]
    pub fn stats_file(&self) -> &str {
        &self.stats_file
    }

    /// Get the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Get all results in configuration order.
    #[must_use]
    pub fn results(&self) -> &[RunResult] {
        &self.results
    }

    pub(crate) fn results_mut(&mut self) -> &mut [RunResult] {
        &mut self.results
    }

    /// Configurations in generator order.
    pub fn configurations(&self) -> impl Iterator<Item = &RunConfiguration> {
        self.results.iter().map(RunResult::configuration)
    }

    /// Get the result for a configuration identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&RunResult> {
        self.results.iter().find(|r| r.id() == id)
    }

    /// Results that succeeded with metrics.
    pub fn succeeded(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter().filter(|r| r.is_succeeded())
    }

    /// Count results per status.
    #[must_use]
    pub fn status_counts(&self) -> StatusCounts {
        let mut counts = StatusCounts::default();
        for result in &self.results {
            match result.status() {
                RunStatus::Succeeded => counts.succeeded += 1,
                RunStatus::Failed => counts.failed += 1,
                RunStatus::NotRun => counts.not_run += 1,
                RunStatus::ExtractionFailed => counts.extraction_failed += 1,
            }
        }
        counts
    }

    /// Number of configurations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the matrix has no configurations.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Load a matrix previously written with [`ExperimentMatrix::save`].
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a matrix.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let matrix: Self = serde_json::from_str(&text)?;
        Self::new(matrix.axes, matrix.stats_file, matrix.results).map(|m| Self {
            created_at: matrix.created_at,
            ..m
        })
    }

    /// Write the matrix as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReportWrite`] if the file cannot be written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json).map_err(|source| Error::ReportWrite {
            path: path.to_path_buf(),
            source,
        })
    }
}

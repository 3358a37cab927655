//! Aggregation and reporting over an experiment matrix
//!
//! Everything here reads a finished [`ExperimentMatrix`] and never mutates
//! it. Queries ([`rank`], [`best_by`], [`speedup`]) only consider runs that
//! succeeded; the rendered reports list every configuration and mark the
//! ones that did not.
//!
//! Files written into the result root:
//!
//! - `comparison_report.txt` aligned table, best/worst summary
//! - `comparison_report.csv` one row per configuration
//! - `matrix.json` the full matrix, reloadable for offline re-analysis

mod compare;
mod export;
mod ranking;
mod table;

pub use compare::{relative_to, speedup, Speedup, Undefined};
pub use export::to_csv;
pub use ranking::{best_by, rank, worst_by, Ranked};
pub use table::{render, UNAVAILABLE};

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::experiment::ExperimentMatrix;
use crate::extract::CounterMap;
use crate::{Error, Result};

/// Text report file name.
pub const TEXT_REPORT: &str = "comparison_report.txt";
/// CSV report file name.
pub const CSV_REPORT: &str = "comparison_report.csv";
/// Serialized matrix file name.
pub const MATRIX_FILE: &str = "matrix.json";

/// Configuration every other configuration is compared against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Baseline {
    /// Baseline configuration identifier
    pub config_id: String,
    /// Metric the speedup is computed on
    pub metric: String,
}

/// What the text report shows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportOptions {
    key_metrics: Vec<String>,
    baseline: Option<Baseline>,
}

impl ReportOptions {
    /// Report every metric of the counter map, without a baseline column.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the table to these metrics, in this order.
    #[must_use]
    pub fn with_key_metrics<I, S>(mut self, metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_metrics = metrics.into_iter().map(Into::into).collect();
        self
    }

    /// Add a speedup column relative to `config_id` on `metric`.
    #[must_use]
    pub fn with_baseline(
        mut self,
        config_id: impl Into<String>,
        metric: impl Into<String>,
    ) -> Self {
        self.baseline = Some(Baseline {
            config_id: config_id.into(),
            metric: metric.into(),
        });
        self
    }

    /// Get the baseline, if any.
    #[must_use]
    pub const fn baseline(&self) -> Option<&Baseline> {
        self.baseline.as_ref()
    }

    /// Metrics shown in the table, checked against `map`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownMetric`] for a key metric `map` does not define.
    pub fn metrics(&self, map: &CounterMap) -> Result<Vec<String>> {
        if self.key_metrics.is_empty() {
            return Ok(map.metric_names().into_iter().map(String::from).collect());
        }
        if let Some(unknown) = self.key_metrics.iter().find(|m| !map.contains(m)) {
            return Err(Error::UnknownMetric(unknown.clone()));
        }
        Ok(self.key_metrics.clone())
    }
}

/// Paths of the files written by [`write_reports`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    /// Text report
    pub text: PathBuf,
    /// CSV report
    pub csv: PathBuf,
    /// Serialized matrix
    pub matrix: PathBuf,
}

/// Write the text report, the CSV report and `matrix.json` into `root`.
///
/// # Errors
///
/// Returns a query error from rendering, or [`Error::ReportWrite`] naming
/// the file that could not be written.
pub fn write_reports(
    root: impl AsRef<Path>,
    matrix: &ExperimentMatrix,
    map: &CounterMap,
    options: &ReportOptions,
) -> Result<ReportPaths> {
    let root = root.as_ref();
    let text = render(matrix, map, options)?;
    let csv = to_csv(matrix, map);

    let paths = ReportPaths {
        text: root.join(TEXT_REPORT),
        csv: root.join(CSV_REPORT),
        matrix: root.join(MATRIX_FILE),
    };
    write_file(&paths.text, &text)?;
    write_file(&paths.csv, &csv)?;
    matrix.save(&paths.matrix)?;

    info!(
        text = %paths.text.display(),
        csv = %paths.csv.display(),
        matrix = %paths.matrix.display(),
        "reports written"
    );
    Ok(paths)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::ReportWrite {
        path: path.to_path_buf(),
        source,
    })
}

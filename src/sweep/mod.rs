//! Sweep driver
//!
//! Drives the generator output through the executor and the extractor and
//! returns a complete [`ExperimentMatrix`]:
//!
//! 1. **Preflight:** simulator, configuration script, workload and result
//!    root are checked once. Any miss aborts before a single run starts.
//! 2. **Execute:** each configuration runs to a terminal state. A failing
//!    run never stops its siblings.
//! 3. **Extract:** each run whose simulator exited 0 gets its metrics, or is
//!    marked `extraction-failed` when its stats file is unreadable.
//!
//! Runs are sequential unless `jobs > 1` and the `parallel` feature is on;
//! either way results come back in generator order and extraction starts
//! only after every run is terminal.

mod executor;
mod settings;

pub use executor::RunExecutor;
pub use settings::{
    SweepSettings, SweepSettingsBuilder, Workload, DEFAULT_OUTDIR_FLAG, DEFAULT_STATS_FILE,
    STDERR_FILE, STDOUT_FILE,
};

use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

use tracing::{info, warn};

use crate::experiment::{ExperimentMatrix, RunConfiguration, RunResult, RunStatus};
use crate::extract::{extract_file, CounterMap};
use crate::{Error, Result};

/// A sweep over one configuration matrix.
#[derive(Debug, Clone)]
pub struct Sweep {
    settings: SweepSettings,
    counter_map: CounterMap,
}

impl Sweep {
    /// Create a sweep.
    #[must_use]
    pub const fn new(settings: SweepSettings, counter_map: CounterMap) -> Self {
        Self {
            settings,
            counter_map,
        }
    }

    /// Get the settings.
    #[must_use]
    pub const fn settings(&self) -> &SweepSettings {
        &self.settings
    }

    /// Get the counter map.
    #[must_use]
    pub const fn counter_map(&self) -> &CounterMap {
        &self.counter_map
    }

    /// Run every configuration and extract metrics.
    ///
    /// # Arguments
    ///
    /// * `axes` - Axis names in identifier order, recorded on the matrix
    /// * `configurations` - Generator output, in report order
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateConfiguration`] if two configurations share
    /// an identifier (they would share a run directory), or a precondition
    /// error if preflight fails. No run is started in either case. Per-run
    /// failures are recorded on the results instead.
    pub fn run(
        &self,
        axes: Vec<String>,
        configurations: &[RunConfiguration],
    ) -> Result<ExperimentMatrix> {
        let mut seen = HashSet::with_capacity(configurations.len());
        if let Some(dup) = configurations
            .iter()
            .map(RunConfiguration::id)
            .find(|id| !seen.insert(*id))
        {
            return Err(Error::DuplicateConfiguration(dup.to_string()));
        }

        let executor = RunExecutor::new(&self.settings);
        executor.preflight()?;

        info!(
            configurations = configurations.len(),
            jobs = self.settings.jobs(),
            root = %self.settings.result_root().display(),
            "starting sweep"
        );
        let started = Instant::now();

        let mut results = self.execute_all(&executor, configurations);
        extract_all(&mut results, &self.counter_map, self.settings.stats_file());

        let matrix = ExperimentMatrix::new(axes, self.settings.stats_file(), results)?;
        let counts = matrix.status_counts();
        info!(
            succeeded = counts.succeeded,
            failed = counts.failed,
            not_run = counts.not_run,
            extraction_failed = counts.extraction_failed,
            elapsed_secs = started.elapsed().as_secs_f64(),
            "sweep finished"
        );
        Ok(matrix)
    }

    #[cfg(feature = "parallel")]
    fn execute_all(
        &self,
        executor: &RunExecutor<'_>,
        configurations: &[RunConfiguration],
    ) -> Vec<RunResult> {
        use rayon::prelude::*;

        let jobs = self.settings.jobs();
        if jobs > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(jobs).build() {
                Ok(pool) => {
                    return pool.install(|| {
                        configurations
                            .par_iter()
                            .map(|config| execute_logged(executor, config))
                            .collect()
                    });
                }
                Err(e) => warn!(error = %e, "could not build run pool, running sequentially"),
            }
        }
        configurations
            .iter()
            .map(|config| execute_logged(executor, config))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn execute_all(
        &self,
        executor: &RunExecutor<'_>,
        configurations: &[RunConfiguration],
    ) -> Vec<RunResult> {
        if self.settings.jobs() > 1 {
            warn!("built without the `parallel` feature, running sequentially");
        }
        configurations
            .iter()
            .map(|config| execute_logged(executor, config))
            .collect()
    }
}

fn execute_logged(executor: &RunExecutor<'_>, config: &RunConfiguration) -> RunResult {
    let result = executor.execute(config);
    match result.status() {
        RunStatus::Succeeded => info!(
            config = config.id(),
            status = %result.status(),
            elapsed_secs = result.elapsed_secs().unwrap_or_default(),
            "run finished"
        ),
        _ => warn!(
            config = config.id(),
            status = %result.status(),
            exit_code = ?result.exit_code(),
            detail = result.detail().unwrap_or_default(),
            "run did not succeed"
        ),
    }
    result
}

/// Extract metrics for every run whose simulator exited 0.
pub fn extract_all(results: &mut [RunResult], counter_map: &CounterMap, stats_file: &str) {
    for result in results.iter_mut().filter(|r| r.process_succeeded()) {
        let path = result.output_dir().join(stats_file);
        match extract_file(counter_map, &path) {
            Ok(record) => result.attach_metrics(record),
            Err(e) => {
                warn!(config = result.id(), error = %e, "extraction failed");
                result.mark_extraction_failed(e.to_string());
            }
        }
    }
}

/// Re-extract every run of a loaded matrix with `counter_map`.
///
/// Run directories are resolved as `result_root/<configuration id>`, so a
/// result tree that was moved, or recorded with paths relative to another
/// working directory, still resolves. A run whose stats file can no longer
/// be read keeps the metrics it already has; only a run without any is
/// marked `extraction-failed`.
pub fn reextract(matrix: &mut ExperimentMatrix, counter_map: &CounterMap, result_root: &Path) {
    let stats_file = matrix.stats_file().to_string();
    for result in matrix.results_mut().iter_mut().filter(|r| r.process_succeeded()) {
        let run_dir = result_root.join(result.id());
        result.relocate(run_dir);

        let path = result.output_dir().join(&stats_file);
        match extract_file(counter_map, &path) {
            Ok(record) => result.attach_metrics(record),
            Err(e) if result.metrics().is_some() => {
                warn!(
                    config = result.id(),
                    error = %e,
                    "stats unreadable, keeping previously extracted metrics"
                );
            }
            Err(e) => {
                warn!(config = result.id(), error = %e, "extraction failed");
                result.mark_extraction_failed(e.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::AxisValue;

    #[test]
    fn test_duplicate_ids_rejected_before_any_run() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("results");
        let settings = SweepSettings::builder(
            dir.path().join("missing-simulator"),
            dir.path().join("missing-script.py"),
            Workload::new(dir.path().join("missing-workload")),
            &root,
        )
        .build();
        let config = RunConfiguration::new(vec![AxisValue::new("width", "width", "4")]);

        let err = Sweep::new(settings, CounterMap::gem5())
            .run(vec!["width".to_string()], &[config.clone(), config])
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateConfiguration(id) if id == "width=4"));
        assert!(!root.exists());
    }
}

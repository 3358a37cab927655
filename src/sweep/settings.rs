//! Sweep settings shared by every run of a sweep

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default simulator flag naming the output directory.
pub const DEFAULT_OUTDIR_FLAG: &str = "--outdir";
/// Default stats file written by the simulator.
pub const DEFAULT_STATS_FILE: &str = "stats.txt";
/// Captured standard output of each run.
pub const STDOUT_FILE: &str = "stdout.txt";
/// Captured standard error of each run.
pub const STDERR_FILE: &str = "stderr.txt";

/// The workload binary every configuration runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workload {
    path: PathBuf,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default = "default_workload_flag")]
    flag: String,
    #[serde(default = "default_workload_args_flag")]
    args_flag: String,
}

fn default_workload_flag() -> String {
    "--cmd".to_string()
}

fn default_workload_args_flag() -> String {
    "--options".to_string()
}

impl Workload {
    /// Create a workload reference passed as `--cmd=<path>`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            args: Vec::new(),
            flag: default_workload_flag(),
            args_flag: default_workload_args_flag(),
        }
    }

    /// Arguments handed to the workload, passed as `--options=<args joined by space>`.
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Use different flags for the workload path and its arguments.
    #[must_use]
    pub fn with_flags(mut self, flag: impl Into<String>, args_flag: impl Into<String>) -> Self {
        self.flag = flag.into();
        self.args_flag = args_flag.into();
        self
    }

    /// Get the workload path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the workload arguments.
    #[must_use]
    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// Simulator arguments naming this workload.
    #[must_use]
    pub fn simulator_args(&self) -> Vec<String> {
        let mut out = vec![format!("{}={}", self.flag, self.path.display())];
        if !self.args.is_empty() {
            out.push(format!("{}={}", self.args_flag, self.args.join(" ")));
        }
        out
    }
}

/// Settings shared by every run of a sweep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepSettings {
    simulator: PathBuf,
    simulator_flags: Vec<String>,
    config_script: PathBuf,
    workload: Workload,
    result_root: PathBuf,
    outdir_flag: String,
    stats_file: String,
    timeout: Option<Duration>,
    jobs: usize,
}

impl SweepSettings {
    /// Create a builder with the required fields.
    #[must_use]
    pub fn builder(
        simulator: impl Into<PathBuf>,
        config_script: impl Into<PathBuf>,
        workload: Workload,
        result_root: impl Into<PathBuf>,
    ) -> SweepSettingsBuilder {
        SweepSettingsBuilder::new(simulator, config_script, workload, result_root)
    }

    /// Get the simulator executable.
    #[must_use]
    pub fn simulator(&self) -> &Path {
        &self.simulator
    }

    /// Get the fixed simulator-level flags.
    #[must_use]
    pub fn simulator_flags(&self) -> &[String] {
        &self.simulator_flags
    }

    /// Get the simulator configuration script.
    #[must_use]
    pub fn config_script(&self) -> &Path {
        &self.config_script
    }

    /// Get the workload.
    #[must_use]
    pub const fn workload(&self) -> &Workload {
        &self.workload
    }

    /// Get the result root directory.
    #[must_use]
    pub fn result_root(&self) -> &Path {
        &self.result_root
    }

    /// Get the output-directory flag.
    #[must_use]
    pub fn outdir_flag(&self) -> &str {
        &self.outdir_flag
    }

    /// Get the stats file name.
    #[must_use]
    pub fn stats_file(&self) -> &str {
        &self.stats_file
    }

    /// Get the per-run timeout.
    #[must_use]
    pub const fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Get the number of concurrent runs.
    #[must_use]
    pub const fn jobs(&self) -> usize {
        self.jobs
    }

    /// Output directory of a configuration.
    #[must_use]
    pub fn run_dir(&self, config_id: &str) -> PathBuf {
        self.result_root.join(config_id)
    }
}

/// Builder for `SweepSettings`.
#[derive(Debug)]
pub struct SweepSettingsBuilder {
    settings: SweepSettings,
}

impl SweepSettingsBuilder {
    /// Create a new builder with required fields.
    #[must_use]
    pub fn new(
        simulator: impl Into<PathBuf>,
        config_script: impl Into<PathBuf>,
        workload: Workload,
        result_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            settings: SweepSettings {
                simulator: simulator.into(),
                simulator_flags: Vec::new(),
                config_script: config_script.into(),
                workload,
                result_root: result_root.into(),
                outdir_flag: DEFAULT_OUTDIR_FLAG.to_string(),
                stats_file: DEFAULT_STATS_FILE.to_string(),
                timeout: None,
                jobs: 1,
            },
        }
    }

    /// Set simulator-level flags placed before the configuration script.
    #[must_use]
    pub fn simulator_flags<I, S>(mut self, flags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.settings.simulator_flags = flags.into_iter().map(Into::into).collect();
        self
    }

    /// Set the output-directory flag.
    #[must_use]
    pub fn outdir_flag(mut self, flag: impl Into<String>) -> Self {
        self.settings.outdir_flag = flag.into();
        self
    }

    /// Set the stats file name.
    #[must_use]
    pub fn stats_file(mut self, name: impl Into<String>) -> Self {
        self.settings.stats_file = name.into();
        self
    }

    /// Kill a run that exceeds `timeout`; it is recorded as failed.
    #[must_use]
    pub const fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.settings.timeout = timeout;
        self
    }

    /// Number of runs in flight at once; `0` is treated as `1`.
    #[must_use]
    pub const fn jobs(mut self, jobs: usize) -> Self {
        self.settings.jobs = if jobs == 0 { 1 } else { jobs };
        self
    }

    /// Build the `SweepSettings`.
    #[must_use]
    pub fn build(self) -> SweepSettings {
        self.settings
    }
}

//! Run Executor - one synchronous simulator invocation per configuration

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::settings::{SweepSettings, STDERR_FILE, STDOUT_FILE};
use crate::experiment::{RunConfiguration, RunResult};
use crate::{Error, Result};

/// How often a run with a timeout is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Runs configurations against the simulator described by [`SweepSettings`].
///
/// Every write of a run stays inside `result_root/<configuration id>/`, so
/// executors for different configurations never touch the same path.
#[derive(Debug, Clone, Copy)]
pub struct RunExecutor<'a> {
    settings: &'a SweepSettings,
}

impl<'a> RunExecutor<'a> {
    /// Create an executor for the given settings.
    #[must_use]
    pub const fn new(settings: &'a SweepSettings) -> Self {
        Self { settings }
    }

    /// Check sweep-level prerequisites before any run starts.
    ///
    /// # Errors
    ///
    /// Returns the first unmet precondition: missing simulator, missing
    /// configuration script, missing workload, or a result root that cannot
    /// be created.
    pub fn preflight(&self) -> Result<()> {
        let s = self.settings;
        if !s.simulator().is_file() {
            return Err(Error::SimulatorNotFound(s.simulator().to_path_buf()));
        }
        if !s.config_script().is_file() {
            return Err(Error::ConfigScriptNotFound(s.config_script().to_path_buf()));
        }
        if !s.workload().path().is_file() {
            return Err(Error::WorkloadNotFound(s.workload().path().to_path_buf()));
        }
        fs::create_dir_all(s.result_root())?;
        Ok(())
    }

    /// Full simulator command line for a configuration, program first.
    ///
    /// `<simulator> <flags..> <outdir-flag>=<run dir> <script> --<param>=<value>.. <workload args..>`
    #[must_use]
    pub fn command_line(&self, config: &RunConfiguration) -> Vec<OsString> {
        let s = self.settings;
        let run_dir = s.run_dir(config.id());

        let mut outdir = OsString::from(format!("{}=", s.outdir_flag()));
        outdir.push(run_dir.as_os_str());

        let mut argv: Vec<OsString> = vec![s.simulator().as_os_str().to_owned()];
        argv.extend(s.simulator_flags().iter().map(OsString::from));
        argv.push(outdir);
        argv.push(s.config_script().as_os_str().to_owned());
        argv.extend(config.parameters().into_iter().map(OsString::from));
        argv.extend(s.workload().simulator_args().into_iter().map(OsString::from));
        argv
    }

    /// Run one configuration to a terminal state.
    ///
    /// Never fails: a non-zero exit or timeout yields a failed result, and a
    /// configuration that could not be launched yields a not-run result.
    #[must_use]
    pub fn execute(&self, config: &RunConfiguration) -> RunResult {
        let run_dir = self.settings.run_dir(config.id());

        if !self.settings.workload().path().is_file() {
            return RunResult::not_run(
                config.clone(),
                run_dir,
                format!(
                    "workload {} disappeared before launch",
                    self.settings.workload().path().display()
                ),
            );
        }

        if let Err(e) = prepare_run_dir(&run_dir) {
            return RunResult::not_run(
                config.clone(),
                run_dir,
                format!("could not prepare output directory: {e}"),
            );
        }

        let (stdout, stderr) = match (
            File::create(run_dir.join(STDOUT_FILE)),
            File::create(run_dir.join(STDERR_FILE)),
        ) {
            (Ok(out), Ok(err)) => (out, err),
            (Err(e), _) | (_, Err(e)) => {
                return RunResult::not_run(
                    config.clone(),
                    run_dir,
                    format!("could not create capture files: {e}"),
                );
            }
        };

        let argv = self.command_line(config);
        debug!(config = config.id(), command = ?argv, "launching simulator");

        let builder = RunResult::builder(config.clone(), &run_dir);
        let child = Command::new(&argv[0])
            .args(&argv[1..])
            .stdin(Stdio::null())
            .stdout(Stdio::from(stdout))
            .stderr(Stdio::from(stderr))
            .spawn();

        let child = match child {
            Ok(child) => child,
            Err(e) => {
                return RunResult::not_run(
                    config.clone(),
                    run_dir,
                    format!("failed to launch simulator: {e}"),
                );
            }
        };

        match wait(child, self.settings.timeout()) {
            Ok((status, timed_out)) => {
                let mut builder = builder.exit_code(status.code()).timed_out(timed_out);
                if timed_out {
                    builder = builder.detail("killed after exceeding the run timeout");
                } else if !status.success() {
                    builder = builder.detail(describe_exit(status));
                }
                builder.build()
            }
            Err(e) => {
                warn!(config = config.id(), error = %e, "lost track of simulator process");
                builder.detail(format!("waiting on simulator failed: {e}")).build()
            }
        }
    }
}

/// Remove whatever a previous sweep left and start from an empty directory.
fn prepare_run_dir(dir: &Path) -> std::io::Result<()> {
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)
}

/// Wait for exit, killing the child once `timeout` elapses.
fn wait(mut child: Child, timeout: Option<Duration>) -> std::io::Result<(ExitStatus, bool)> {
    let Some(limit) = timeout else {
        return child.wait().map(|status| (status, false));
    };
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok((status, false));
        }
        if Instant::now() >= deadline {
            // The child may exit between try_wait and kill
            if let Err(e) = child.kill() {
                debug!(error = %e, "kill after timeout");
            }
            return child.wait().map(|status| (status, true));
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn describe_exit(status: ExitStatus) -> String {
    status.code().map_or_else(
        || "simulator terminated by signal".to_string(),
        |code| format!("simulator exited with status {code}"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::AxisValue;
    use crate::sweep::Workload;

    fn settings(root: &Path) -> SweepSettings {
        SweepSettings::builder(
            "/opt/gem5/build/X86/gem5.opt",
            "configs/superscalar.py",
            Workload::new("workloads/matrix_multiply").with_args(["64"]),
            root,
        )
        .simulator_flags(["--quiet"])
        .build()
    }

    #[test]
    fn test_command_line_layout() {
        let settings = settings(Path::new("results"));
        let exec = RunExecutor::new(&settings);
        let config = RunConfiguration::new(vec![
            AxisValue::new("width", "issue-width", "4"),
            AxisValue::new("threads", "threads", "2"),
        ]);
        let argv: Vec<String> = exec
            .command_line(&config)
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            argv,
            vec![
                "/opt/gem5/build/X86/gem5.opt",
                "--quiet",
                "--outdir=results/width=4__threads=2",
                "configs/superscalar.py",
                "--issue-width=4",
                "--threads=2",
                "--cmd=workloads/matrix_multiply",
                "--options=64",
            ]
        );
    }

    #[test]
    fn test_preflight_names_missing_simulator() {
        let dir = tempfile::tempdir().unwrap();
        let settings = settings(dir.path());
        let err = RunExecutor::new(&settings).preflight().unwrap_err();
        assert!(matches!(err, Error::SimulatorNotFound(_)));
        assert!(err.to_string().contains("gem5.opt"));
    }

    #[test]
    fn test_prepare_run_dir_clears_stale_output() {
        let dir = tempfile::tempdir().unwrap();
        let run_dir = dir.path().join("width=1");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(run_dir.join("stats.txt"), "stale").unwrap();
        prepare_run_dir(&run_dir).unwrap();
        assert!(run_dir.is_dir());
        assert!(!run_dir.join("stats.txt").exists());
    }
}

//! simsweep command-line interface.
//!
//! Three subcommands share one definition format:
//! 1. **sweep:** run every configuration, extract metrics, write reports.
//! 2. **plan:** list configurations and their command lines without running.
//! 3. **report:** rebuild reports from a saved `matrix.json`, re-extracting
//!    with the current counter map from the run directories next to it.
//!
//! The process exits non-zero only for sweep-level failures (an unmet
//! precondition or a report that could not be written). Individual runs
//! that fail are recorded in the report instead.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use simsweep::config::{parse_axis_arg, parse_constrained_arg, AxisDefinition, SweepDefinition};
use simsweep::experiment::ExperimentMatrix;
use simsweep::extract::CounterMap;
use simsweep::report::{self, Baseline, ReportOptions};
use simsweep::sweep::{self, RunExecutor, Sweep, Workload};

#[derive(Parser, Debug)]
#[command(
    name = "simsweep",
    author,
    version,
    about = "Parameter sweeps and metric reports for cycle-accurate simulators",
    long_about = "Run a simulator over a matrix of configurations, extract metrics from each run's stats dump, and compare the results.\n\nExamples:\n  simsweep sweep -d sweeps/issue_width.json\n  simsweep sweep --simulator build/X86/gem5.opt --config-script configs/o3.py \\\n      --workload bin/qsort --result-root results/width --axis width:issue-width=1,2,4,8\n  simsweep plan -d sweeps/latency.json --constrained 'oplat=1,2,3,4,5,6;issuelat=6,5,4,3,2,1;sum=7'\n  simsweep report results/width/matrix.json --key-metric sim_seconds --baseline width=1"
)]
struct Cli {
    /// Log debug detail (each simulator command line, defaulted metrics).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run every configuration, then write comparison reports into the result root.
    Sweep {
        #[command(flatten)]
        definition: DefinitionArgs,
    },

    /// List configurations and the simulator command of each, without running anything.
    Plan {
        #[command(flatten)]
        definition: DefinitionArgs,
    },

    /// Rebuild reports from a saved matrix.json.
    Report {
        /// Path to matrix.json written by a previous sweep.
        matrix: PathBuf,

        /// Directory for the rebuilt reports (default: the matrix's directory).
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Counter map JSON (default: built-in gem5 vocabulary).
        #[arg(long)]
        counter_map: Option<PathBuf>,

        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Report view flags shared by `sweep` and `report`.
#[derive(Args, Debug)]
struct ViewArgs {
    /// Metric to show in the text report (repeatable; default: all).
    #[arg(long = "key-metric")]
    key_metrics: Vec<String>,

    /// Configuration identifier every other configuration is compared against.
    #[arg(long)]
    baseline: Option<String>,

    /// Metric the baseline speedup is computed on.
    #[arg(long, default_value = "sim_seconds")]
    baseline_metric: String,
}

/// Sweep definition flags; each overrides the definition file.
#[derive(Args, Debug)]
struct DefinitionArgs {
    /// Sweep definition JSON file.
    #[arg(short, long)]
    definition: Option<PathBuf>,

    /// Simulator executable.
    #[arg(long)]
    simulator: Option<PathBuf>,

    /// Simulator-level flag placed before the configuration script (repeatable).
    #[arg(long = "simulator-flag", allow_hyphen_values = true)]
    simulator_flags: Vec<String>,

    /// Simulator configuration script.
    #[arg(long)]
    config_script: Option<PathBuf>,

    /// Workload binary.
    #[arg(long)]
    workload: Option<PathBuf>,

    /// Argument passed to the workload (repeatable).
    #[arg(long = "workload-arg", allow_hyphen_values = true)]
    workload_args: Vec<String>,

    /// Directory receiving one subdirectory per configuration plus the reports.
    #[arg(long)]
    result_root: Option<PathBuf>,

    /// Simulator flag naming the output directory.
    #[arg(long)]
    outdir_flag: Option<String>,

    /// Stats file the simulator writes into the output directory.
    #[arg(long)]
    stats_file: Option<String>,

    /// Kill a run after this many seconds.
    #[arg(long)]
    timeout_secs: Option<u64>,

    /// Runs in flight at once.
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Counter map JSON (default: built-in gem5 vocabulary).
    #[arg(long)]
    counter_map: Option<PathBuf>,

    /// Axis as name=v1,v2,... or name:param=v1,v2,... (repeatable; replaces file axes).
    #[arg(long = "axis")]
    axes: Vec<String>,

    /// Constrained family as a=1,2;b=3,4;sum=5 (repeatable; replaces file axes).
    #[arg(long = "constrained")]
    constrained: Vec<String>,

    #[command(flatten)]
    view: ViewArgs,
}

impl DefinitionArgs {
    /// Load the definition file, if any, and apply flag overrides.
    fn resolve(self) -> Result<SweepDefinition> {
        let mut def = match &self.definition {
            Some(path) => SweepDefinition::load(path)?,
            None => SweepDefinition::default(),
        };

        if let Some(v) = self.simulator {
            def.simulator = Some(v);
        }
        if !self.simulator_flags.is_empty() {
            def.simulator_flags = self.simulator_flags;
        }
        if let Some(v) = self.config_script {
            def.config_script = Some(v);
        }
        if let Some(path) = self.workload {
            def.workload = Some(Workload::new(path).with_args(self.workload_args));
        } else if !self.workload_args.is_empty() {
            match def.workload.take() {
                Some(w) => def.workload = Some(w.with_args(self.workload_args)),
                None => bail!("--workload-arg given without a workload"),
            }
        }
        if let Some(v) = self.result_root {
            def.result_root = Some(v);
        }
        if let Some(v) = self.outdir_flag {
            def.outdir_flag = Some(v);
        }
        if let Some(v) = self.stats_file {
            def.stats_file = Some(v);
        }
        if let Some(v) = self.timeout_secs {
            def.timeout_secs = Some(v);
        }
        if let Some(v) = self.jobs {
            def.jobs = Some(v);
        }
        if let Some(v) = self.counter_map {
            def.counter_map = Some(v);
        }

        if !self.axes.is_empty() || !self.constrained.is_empty() {
            let mut axes = Vec::with_capacity(self.axes.len() + self.constrained.len());
            for arg in &self.axes {
                axes.push(AxisDefinition::Free(parse_axis_arg(arg)?));
            }
            for arg in &self.constrained {
                axes.push(parse_constrained_arg(arg)?);
            }
            def.axes = axes;
        }

        if !self.view.key_metrics.is_empty() {
            def.key_metrics = self.view.key_metrics;
        }
        if let Some(config_id) = self.view.baseline {
            def.baseline = Some(Baseline {
                config_id,
                metric: self.view.baseline_metric,
            });
        }
        Ok(def)
    }
}

impl ViewArgs {
    fn options(&self) -> ReportOptions {
        let options = ReportOptions::new().with_key_metrics(self.key_metrics.iter().cloned());
        match &self.baseline {
            Some(id) => options.with_baseline(id.clone(), self.baseline_metric.clone()),
            None => options,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Sweep { definition } => cmd_sweep(definition.resolve()?),
        Commands::Plan { definition } => cmd_plan(&definition.resolve()?),
        Commands::Report {
            matrix,
            out,
            counter_map,
            view,
        } => cmd_report(&matrix, out, counter_map, &view),
    }
}

/// Runs the sweep and writes the reports into the result root.
fn cmd_sweep(def: SweepDefinition) -> Result<()> {
    let generator = def.generator();
    let configs = generator.generate()?;
    let settings = def.settings()?;
    let map = def.counter_map()?;
    let options = def.report_options();

    // Fail on a bad report request now rather than after every run finished
    options.metrics(&map)?;
    if let Some(baseline) = options.baseline() {
        if !map.contains(&baseline.metric) {
            bail!("baseline metric '{}' is not in counter map {}", baseline.metric, map.version());
        }
        if !configs.iter().any(|c| c.id() == baseline.config_id) {
            bail!(
                "baseline '{}' is not one of the {} configurations",
                baseline.config_id,
                configs.len()
            );
        }
    }

    let root = settings.result_root().to_path_buf();
    let sweep = Sweep::new(settings, map);
    let matrix = sweep.run(generator.axis_names(), &configs)?;

    let paths = report::write_reports(&root, &matrix, sweep.counter_map(), &options)
        .with_context(|| format!("writing reports into {}", root.display()))?;
    print_report(&paths.text)?;

    if matrix.succeeded().next().is_none() {
        warn!("no configuration succeeded; see stderr.txt in each run directory");
    }
    Ok(())
}

/// Prints each configuration and its simulator command.
fn cmd_plan(def: &SweepDefinition) -> Result<()> {
    let configs = def.generator().generate()?;
    let settings = def.settings().ok();

    println!("{} configurations", configs.len());
    for config in &configs {
        match &settings {
            Some(settings) => {
                let argv: Vec<String> = RunExecutor::new(settings)
                    .command_line(config)
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect();
                println!("{}\n    {}", config.id(), argv.join(" "));
            }
            None => println!("{}\n    {}", config.id(), config.parameters().join(" ")),
        }
    }
    Ok(())
}

/// Re-extracts a saved matrix and rewrites its reports.
fn cmd_report(
    matrix_path: &Path,
    out: Option<PathBuf>,
    counter_map: Option<PathBuf>,
    view: &ViewArgs,
) -> Result<()> {
    let mut matrix = ExperimentMatrix::load(matrix_path)
        .with_context(|| format!("loading {}", matrix_path.display()))?;
    let map = match counter_map {
        Some(path) => CounterMap::from_json_file(&path)
            .with_context(|| format!("loading counter map {}", path.display()))?,
        None => CounterMap::gem5(),
    };
    // Run directories sit next to matrix.json, wherever the tree lives now
    let result_root = matrix_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    sweep::reextract(&mut matrix, &map, &result_root);

    let root = out.unwrap_or(result_root);
    let paths = report::write_reports(&root, &matrix, &map, &view.options())
        .with_context(|| format!("writing reports into {}", root.display()))?;
    print_report(&paths.text)
}

fn print_report(path: &Path) -> Result<()> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading back {}", path.display()))?;
    print!("{text}");
    Ok(())
}

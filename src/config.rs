//! Sweep Definition - the file-provided description of a sweep
//!
//! A definition is a JSON document. Every field is optional in the file so
//! that command-line flags can fill in or override any of them; the
//! required ones are checked when settings are built.
//!
//! ```json
//! {
//!   "simulator": "/opt/gem5/build/X86/gem5.opt",
//!   "config_script": "configs/superscalar.py",
//!   "workload": { "path": "workloads/matrix_multiply", "args": ["64"] },
//!   "result_root": "results/issue_width",
//!   "timeout_secs": 3600,
//!   "jobs": 4,
//!   "key_metrics": ["sim_seconds", "ipc", "dcache_hit_rate"],
//!   "baseline": { "config_id": "width=1", "metric": "sim_seconds" },
//!   "axes": [
//!     { "name": "width", "param": "issue-width", "values": ["1", "2", "4", "8"] },
//!     { "constrained": {
//!         "axes": [
//!           { "name": "oplat", "values": ["1", "2", "3", "4", "5", "6"] },
//!           { "name": "issuelat", "values": ["6", "5", "4", "3", "2", "1"] }
//!         ],
//!         "sum_equals": 7 } }
//!   ]
//! }
//! ```
//!
//! Relative paths are taken as given, i.e. relative to the working
//! directory of the process.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::experiment::{Axis, AxisFamily, Constraint, MatrixGenerator};
use crate::extract::CounterMap;
use crate::report::{Baseline, ReportOptions};
use crate::sweep::{SweepSettings, Workload};
use crate::{Error, Result};

/// One entry of the `axes` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AxisDefinition {
    /// Independent axis
    Free(Axis),
    /// Axes filtered jointly by a sum constraint
    Constrained {
        /// The family
        constrained: ConstrainedDefinition,
    },
}

/// A constrained family as written in a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstrainedDefinition {
    /// Member axes
    pub axes: Vec<Axis>,
    /// Required sum of each tuple's values
    pub sum_equals: f64,
}

impl From<AxisDefinition> for AxisFamily {
    fn from(def: AxisDefinition) -> Self {
        match def {
            AxisDefinition::Free(axis) => Self::Free(axis),
            AxisDefinition::Constrained { constrained } => Self::constrained(
                constrained.axes,
                Constraint::SumEquals(constrained.sum_equals),
            ),
        }
    }
}

/// A sweep definition loaded from JSON and/or assembled from CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepDefinition {
    /// Simulator executable
    pub simulator: Option<PathBuf>,
    /// Fixed simulator-level flags placed before the configuration script
    pub simulator_flags: Vec<String>,
    /// Simulator configuration script
    pub config_script: Option<PathBuf>,
    /// Flag naming the per-run output directory
    pub outdir_flag: Option<String>,
    /// Stats file name the simulator writes into the output directory
    pub stats_file: Option<String>,
    /// Workload every configuration runs
    pub workload: Option<Workload>,
    /// Directory holding one subdirectory per configuration
    pub result_root: Option<PathBuf>,
    /// Per-run timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Concurrent runs
    pub jobs: Option<usize>,
    /// Counter map JSON replacing the built-in gem5 vocabulary
    pub counter_map: Option<PathBuf>,
    /// Metrics shown in the text report
    pub key_metrics: Vec<String>,
    /// Baseline for the speedup column
    pub baseline: Option<Baseline>,
    /// Axis families in identifier order
    pub axes: Vec<AxisDefinition>,
}

impl SweepDefinition {
    /// Load a definition from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] naming the file if it cannot be
    /// read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::InvalidDefinition(format!("cannot read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text)
            .map_err(|e| Error::InvalidDefinition(format!("{}: {e}", path.display())))
    }

    /// Matrix generator over the declared axes.
    #[must_use]
    pub fn generator(&self) -> MatrixGenerator {
        MatrixGenerator::from_families(self.axes.iter().cloned().map(AxisFamily::from).collect())
    }

    /// Sweep settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] naming the first required field
    /// that is missing.
    pub fn settings(&self) -> Result<SweepSettings> {
        let simulator = required(self.simulator.as_ref(), "simulator")?;
        let config_script = required(self.config_script.as_ref(), "config_script")?;
        let workload = required(self.workload.as_ref(), "workload")?;
        let result_root = required(self.result_root.as_ref(), "result_root")?;

        let mut builder = SweepSettings::builder(
            simulator.clone(),
            config_script.clone(),
            workload.clone(),
            result_root.clone(),
        )
        .simulator_flags(self.simulator_flags.iter().cloned())
        .timeout(self.timeout_secs.map(Duration::from_secs))
        .jobs(self.jobs.unwrap_or(1));
        if let Some(flag) = &self.outdir_flag {
            builder = builder.outdir_flag(flag.clone());
        }
        if let Some(name) = &self.stats_file {
            builder = builder.stats_file(name.clone());
        }
        Ok(builder.build())
    }

    /// Counter map named by the definition, or the built-in gem5 map.
    ///
    /// # Errors
    ///
    /// Returns an error if the counter map file cannot be loaded.
    pub fn counter_map(&self) -> Result<CounterMap> {
        self.counter_map
            .as_ref()
            .map_or_else(|| Ok(CounterMap::gem5()), CounterMap::from_json_file)
    }

    /// Text report options.
    #[must_use]
    pub fn report_options(&self) -> ReportOptions {
        let options = ReportOptions::new().with_key_metrics(self.key_metrics.iter().cloned());
        match &self.baseline {
            Some(b) => options.with_baseline(b.config_id.clone(), b.metric.clone()),
            None => options,
        }
    }
}

fn required<'a, T>(value: Option<&'a T>, field: &str) -> Result<&'a T> {
    value.ok_or_else(|| Error::InvalidDefinition(format!("missing required field '{field}'")))
}

/// Parse an inline axis: `name=v1,v2,...` or `name:param=v1,v2,...`.
///
/// # Errors
///
/// Returns [`Error::InvalidAxis`] if there is no `=`, and the axis'
/// own validation error otherwise.
pub fn parse_axis_arg(arg: &str) -> Result<Axis> {
    let (head, values) = arg.split_once('=').ok_or_else(|| Error::InvalidAxis {
        axis: arg.to_string(),
        reason: "expected name=value1,value2,...".to_string(),
    })?;
    let values: Vec<&str> = values
        .split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .collect();
    let axis = match head.split_once(':') {
        Some((name, param)) => Axis::new(name.trim(), values).with_param(param.trim()),
        None => Axis::new(head.trim(), values),
    };
    axis.validate()?;
    Ok(axis)
}

/// Parse an inline constrained family: `a=1,2,3;b=4,5,6;sum=7`.
///
/// # Errors
///
/// Returns [`Error::InvalidAxis`] if a member is malformed or `sum=` is
/// missing or not a number.
pub fn parse_constrained_arg(arg: &str) -> Result<AxisDefinition> {
    let mut axes = Vec::new();
    let mut total = None;
    for part in arg.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        match part.strip_prefix("sum=") {
            Some(sum) => {
                let value = sum.trim().parse::<f64>().map_err(|_| Error::InvalidAxis {
                    axis: arg.to_string(),
                    reason: format!("'{sum}' is not a number"),
                })?;
                total = Some(value);
            }
            None => axes.push(parse_axis_arg(part)?),
        }
    }
    let total = total.ok_or_else(|| Error::InvalidAxis {
        axis: arg.to_string(),
        reason: "constrained family needs a 'sum=<total>' term".to_string(),
    })?;
    Ok(AxisDefinition::Constrained {
        constrained: ConstrainedDefinition {
            axes,
            sum_equals: total,
        },
    })
}

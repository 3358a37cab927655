//! # simsweep: Parameter Sweeps for Cycle-Accurate Simulators
//!
//! simsweep drives an external simulator (gem5-style) across a matrix of
//! microarchitectural configurations and turns its loosely formatted
//! `stats.txt` dumps into ranked, comparable reports.
//!
//! Data flows strictly forward:
//!
//! 1. **Generate** ([`experiment::MatrixGenerator`]): Cartesian product of
//!    axes, plus constrained families filtered by a predicate.
//! 2. **Execute** ([`sweep::Sweep`]): one isolated output directory and one
//!    synchronous simulator process per configuration. A failing run never
//!    stops the sweep.
//! 3. **Extract** ([`extract`]): tolerant line scanning against a versioned
//!    counter map, with documented defaults and derived metrics.
//! 4. **Report** ([`report`]): text table, CSV and JSON, best/worst ranking
//!    and speedup against a baseline.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use simsweep::experiment::{Axis, MatrixGenerator};
//! use simsweep::extract::CounterMap;
//! use simsweep::report::{best_by, write_reports, ReportOptions};
//! use simsweep::sweep::{Sweep, SweepSettings, Workload};
//!
//! let generator = MatrixGenerator::new()
//!     .axis(Axis::new("width", ["1", "2", "4", "8"]).with_param("issue-width"));
//! let configs = generator.generate()?;
//!
//! let settings = SweepSettings::builder(
//!     "/opt/gem5/build/X86/gem5.opt",
//!     "configs/superscalar.py",
//!     Workload::new("workloads/matrix_multiply"),
//!     "results/issue_width",
//! )
//! .build();
//!
//! let sweep = Sweep::new(settings, CounterMap::gem5());
//! let matrix = sweep.run(generator.axis_names(), &configs)?;
//!
//! let best = best_by(&matrix, sweep.counter_map(), "sim_seconds")?;
//! println!("fastest: {} ({} s)", best.config_id, best.value);
//!
//! write_reports("results/issue_width", &matrix, sweep.counter_map(), &ReportOptions::new())?;
//! # Ok::<(), simsweep::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

pub mod config;
pub mod error;
pub mod experiment;
pub mod extract;
pub mod report;
pub mod sweep;

pub use error::{Error, Result};

//! Experiment data model
//!
//! This module provides the data structures of one sweep: the axes that
//! span the configuration matrix, the configurations themselves, the
//! generator that expands one into the other, and the per-run results and
//! metric records collected into an [`ExperimentMatrix`].
//!
//! ## Schema Overview
//!
//! ```text
//! AxisFamily (N) ──> MatrixGenerator ──> RunConfiguration (M = ∏ values)
//!                                              │
//! ExperimentMatrix (1) ──< RunResult (M) ──────┘
//!                              └── MetricsRecord (0..1) [succeeded only]
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use simsweep::experiment::{Axis, MatrixGenerator};
//!
//! let configs = MatrixGenerator::new()
//!     .axis(Axis::new("predictor", ["none", "tournament"]))
//!     .generate()?;
//!
//! assert_eq!(configs.len(), 2);
//! assert_eq!(configs[1].id(), "predictor=tournament");
//! # Ok::<(), simsweep::Error>(())
//! ```

mod axis;
mod configuration;
mod generator;
mod matrix;
mod metric_record;
mod run_record;

pub use axis::{Axis, AxisFamily, Constraint};
pub use configuration::{AxisValue, RunConfiguration, ID_SEPARATOR};
pub use generator::MatrixGenerator;
pub use matrix::{ExperimentMatrix, StatusCounts};
pub use metric_record::{MetricEntry, MetricSource, MetricValue, MetricsRecord};
pub use run_record::{RunResult, RunResultBuilder, RunStatus};

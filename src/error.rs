//! Error types for simsweep
//!
//! Errors local to one configuration never surface here: they are recorded on
//! that configuration's [`RunResult`](crate::experiment::RunResult). What is
//! left are sweep-level preconditions, unreadable stats, and query/report
//! failures, each naming the thing that was missing.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// simsweep error types
#[derive(Error, Debug)]
pub enum Error {
    /// Axis definition is malformed (bad name, duplicate name, empty value)
    #[error("Invalid axis '{axis}': {reason}")]
    InvalidAxis {
        /// Axis name as given
        axis: String,
        /// What is wrong with it
        reason: String,
    },

    /// Axis has no values
    #[error("Axis '{0}' has no values\nEvery axis needs at least one value to sweep")]
    EmptyAxis(String),

    /// Constrained axis family where no tuple satisfies the predicate
    #[error("Constrained axes [{axes}] yield no valid combinations under '{constraint}'")]
    EmptyConstrainedFamily {
        /// Comma-separated axis names of the family
        axes: String,
        /// Human-readable predicate
        constraint: String,
    },

    /// Two configurations share an identifier after sanitisation
    #[error("Duplicate configuration identifier '{0}'\nAxis values collide once made filesystem-safe")]
    DuplicateConfiguration(String),

    /// No axes at all
    #[error("Sweep has no axes to expand")]
    NoAxes,

    /// Simulator executable missing
    #[error("Simulator not found: {0}\nNo runs were started")]
    SimulatorNotFound(PathBuf),

    /// Simulator configuration script missing
    #[error("Simulator configuration script not found: {0}\nNo runs were started")]
    ConfigScriptNotFound(PathBuf),

    /// Workload binary missing
    #[error("Workload not found: {0}\nNo runs were started")]
    WorkloadNotFound(PathBuf),

    /// Sweep definition or counter map could not be understood
    #[error("Invalid sweep definition: {0}")]
    InvalidDefinition(String),

    /// Stats output of a run could not be read
    #[error("Stats output unreadable at {path}: {source}")]
    StatsUnreadable {
        /// Stats file path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// Ranking requested over a matrix with no succeeded runs
    #[error("No valid results to rank by '{metric}'\nEvery configuration failed, was skipped, or could not be extracted")]
    NoValidResults {
        /// Metric that was queried
        metric: String,
    },

    /// Metric not part of the counter map
    #[error("Unknown metric '{0}'")]
    UnknownMetric(String),

    /// Configuration identifier not part of the matrix
    #[error("Unknown configuration '{0}'")]
    UnknownConfiguration(String),

    /// Report file could not be written
    #[error("Failed to write report {path}: {source}")]
    ReportWrite {
        /// Report path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Whether this error is a sweep-level precondition failure.
    ///
    /// Precondition failures abort before any run starts.
    #[must_use]
    pub const fn is_precondition(&self) -> bool {
        matches!(
            self,
            Self::InvalidAxis { .. }
                | Self::EmptyAxis(_)
                | Self::EmptyConstrainedFamily { .. }
                | Self::DuplicateConfiguration(_)
                | Self::NoAxes
                | Self::SimulatorNotFound(_)
                | Self::ConfigScriptNotFound(_)
                | Self::WorkloadNotFound(_)
                | Self::InvalidDefinition(_)
        )
    }
}

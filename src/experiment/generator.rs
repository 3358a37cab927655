//! Configuration Matrix Generator
//!
//! Expands axis families into the ordered product of run configurations.
//! Families iterate in declaration order with later families varying
//! fastest, so the output order is reproducible and doubles as the default
//! report order.

use std::collections::HashSet;

use super::{Axis, AxisFamily, AxisValue, Constraint, RunConfiguration};
use crate::{Error, Result};

/// Builder that expands axis families into run configurations.
///
/// ## Example
///
/// ```rust
/// use simsweep::experiment::{Axis, Constraint, MatrixGenerator};
///
/// let configs = MatrixGenerator::new()
///     .axis(Axis::new("predictor", ["none", "tournament"]))
///     .constrained(
///         vec![Axis::new("oplat", ["2", "3"]), Axis::new("issuelat", ["4", "5"])],
///         Constraint::SumEquals(7.0),
///     )
///     .generate()?;
///
/// assert_eq!(configs.len(), 4);
/// assert_eq!(configs[0].id(), "predictor=none__oplat=2__issuelat=5");
/// # Ok::<(), simsweep::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct MatrixGenerator {
    families: Vec<AxisFamily>,
}

impl MatrixGenerator {
    /// Create a generator with no axes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a generator from existing families.
    #[must_use]
    pub fn from_families(families: Vec<AxisFamily>) -> Self {
        Self { families }
    }

    /// Append a free axis.
    #[must_use]
    pub fn axis(mut self, axis: Axis) -> Self {
        self.families.push(AxisFamily::Free(axis));
        self
    }

    /// Append a constrained family.
    #[must_use]
    pub fn constrained(mut self, axes: Vec<Axis>, constraint: Constraint) -> Self {
        self.families.push(AxisFamily::constrained(axes, constraint));
        self
    }

    /// Get the families in declaration order.
    #[must_use]
    pub fn families(&self) -> &[AxisFamily] {
        &self.families
    }

    /// Axis names in identifier order.
    #[must_use]
    pub fn axis_names(&self) -> Vec<String> {
        self.families
            .iter()
            .flat_map(AxisFamily::axes)
            .map(|a| a.name().to_string())
            .collect()
    }

    /// Expand the families into configurations.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if there are no axes, an axis is empty
    /// or malformed, an axis name repeats, a constrained family has no valid
    /// tuple, or two configurations end up with the same identifier.
    pub fn generate(&self) -> Result<Vec<RunConfiguration>> {
        if self.families.is_empty() {
            return Err(Error::NoAxes);
        }

        let mut names = HashSet::new();
        for axis in self.families.iter().flat_map(AxisFamily::axes) {
            if !names.insert(axis.name()) {
                return Err(Error::InvalidAxis {
                    axis: axis.name().to_string(),
                    reason: "axis name declared more than once".to_string(),
                });
            }
        }

        let mut rows: Vec<Vec<AxisValue>> = vec![Vec::new()];
        for family in &self.families {
            let tuples = family.tuples()?;
            let mut next = Vec::with_capacity(rows.len() * tuples.len());
            for prefix in &rows {
                for tuple in &tuples {
                    let mut row = prefix.clone();
                    row.extend(
                        family
                            .axes()
                            .iter()
                            .zip(tuple)
                            .map(|(axis, value)| AxisValue::new(axis.name(), axis.param(), *value)),
                    );
                    next.push(row);
                }
            }
            rows = next;
        }

        let configs: Vec<RunConfiguration> = rows.into_iter().map(RunConfiguration::new).collect();

        let mut seen = HashSet::with_capacity(configs.len());
        for config in &configs {
            if !seen.insert(config.id()) {
                return Err(Error::DuplicateConfiguration(config.id().to_string()));
            }
        }

        Ok(configs)
    }
}

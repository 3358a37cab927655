//! Configuration axes - the independently varying simulator parameters

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Tolerance for `SumEquals` comparisons on parsed axis values.
const SUM_TOLERANCE: f64 = 1e-9;

/// One configuration axis: a named parameter and the ordered values to sweep.
///
/// The axis name doubles as the simulator parameter (`--<name>=<value>`)
/// unless an explicit `param` is given.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Axis {
    name: String,
    values: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    param: Option<String>,
}

impl Axis {
    /// Create a new axis.
    ///
    /// # Arguments
    ///
    /// * `name` - Axis name, used in configuration identifiers
    /// * `values` - Ordered values to sweep
    #[must_use]
    pub fn new<I, V>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
            param: None,
        }
    }

    /// Pass this axis to the simulator under a different parameter name.
    #[must_use]
    pub fn with_param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    /// Get the axis name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the axis values in sweep order.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Get the simulator parameter name for this axis.
    #[must_use]
    pub fn param(&self) -> &str {
        self.param.as_deref().unwrap_or(&self.name)
    }

    /// Check the axis is usable in a matrix.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyAxis`] when there are no values, and
    /// [`Error::InvalidAxis`] for a malformed name, parameter, or empty value.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() || !self.name.chars().all(is_name_char) {
            return Err(Error::InvalidAxis {
                axis: self.name.clone(),
                reason: "names may only contain ASCII letters, digits, '_' and '-'".to_string(),
            });
        }
        if let Some(param) = &self.param {
            if param.is_empty() || param.starts_with('-') || param.contains('=') {
                return Err(Error::InvalidAxis {
                    axis: self.name.clone(),
                    reason: format!(
                        "parameter name '{param}' must be bare (no leading '-' or '=')"
                    ),
                });
            }
        }
        if self.values.is_empty() {
            return Err(Error::EmptyAxis(self.name.clone()));
        }
        if self.values.iter().any(|v| v.trim().is_empty()) {
            return Err(Error::InvalidAxis {
                axis: self.name.clone(),
                reason: "values must not be blank".to_string(),
            });
        }
        Ok(())
    }
}

const fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '-'
}

/// Predicate over the values of a constrained axis family.
///
/// Values arrive in the family's axis order.
#[derive(Clone)]
pub enum Constraint {
    /// All values parse as numbers and add up to `total`.
    SumEquals(f64),
    /// Arbitrary predicate with a label for error messages.
    Custom {
        /// Human-readable description
        label: String,
        /// The predicate itself
        predicate: Arc<dyn Fn(&[&str]) -> bool + Send + Sync>,
    },
}

impl Constraint {
    /// Build a custom constraint from a closure.
    pub fn custom<F>(label: impl Into<String>, predicate: F) -> Self
    where
        F: Fn(&[&str]) -> bool + Send + Sync + 'static,
    {
        Self::Custom {
            label: label.into(),
            predicate: Arc::new(predicate),
        }
    }

    /// Whether a tuple of values satisfies this constraint.
    #[must_use]
    pub fn accepts(&self, values: &[&str]) -> bool {
        match self {
            Self::SumEquals(total) => {
                let mut sum = 0.0;
                for v in values {
                    match v.trim().parse::<f64>() {
                        Ok(x) if x.is_finite() => sum += x,
                        _ => return false,
                    }
                }
                (sum - total).abs() < SUM_TOLERANCE
            }
            Self::Custom { predicate, .. } => predicate(values),
        }
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SumEquals(total) => f.debug_tuple("SumEquals").field(total).finish(),
            Self::Custom { label, .. } => f.debug_struct("Custom").field("label", label).finish(),
        }
    }
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SumEquals(total) => write!(f, "sum == {total}"),
            Self::Custom { label, .. } => f.write_str(label),
        }
    }
}

/// One slot in the configuration product.
///
/// A free axis contributes each of its values; a constrained family
/// contributes only the tuples of its axes that satisfy the constraint.
#[derive(Debug, Clone)]
pub enum AxisFamily {
    /// Independent axis
    Free(Axis),
    /// Axes enumerated jointly and filtered by a predicate
    Constrained {
        /// Member axes, in identifier order
        axes: Vec<Axis>,
        /// Filter over value tuples
        constraint: Constraint,
    },
}

impl AxisFamily {
    /// Create a constrained family.
    #[must_use]
    pub fn constrained(axes: Vec<Axis>, constraint: Constraint) -> Self {
        Self::Constrained { axes, constraint }
    }

    /// Member axes of this slot.
    #[must_use]
    pub fn axes(&self) -> &[Axis] {
        match self {
            Self::Free(axis) => std::slice::from_ref(axis),
            Self::Constrained { axes, .. } => axes,
        }
    }

    /// Enumerate the value tuples of this slot, later axes varying fastest.
    ///
    /// # Errors
    ///
    /// Returns an error if a member axis is invalid, a constrained family has
    /// fewer than two axes, or no tuple satisfies the constraint.
    pub fn tuples(&self) -> Result<Vec<Vec<&str>>> {
        for axis in self.axes() {
            axis.validate()?;
        }
        match self {
            Self::Free(axis) => Ok(axis.values().iter().map(|v| vec![v.as_str()]).collect()),
            Self::Constrained { axes, constraint } => {
                if axes.len() < 2 {
                    return Err(Error::InvalidAxis {
                        axis: axes.first().map(|a| a.name().to_string()).unwrap_or_default(),
                        reason: "a constrained family needs at least two axes".to_string(),
                    });
                }
                let tuples: Vec<Vec<&str>> = cartesian(axes.iter().map(Axis::values))
                    .into_iter()
                    .filter(|tuple| constraint.accepts(tuple))
                    .collect();
                if tuples.is_empty() {
                    return Err(Error::EmptyConstrainedFamily {
                        axes: axes.iter().map(Axis::name).collect::<Vec<_>>().join(", "),
                        constraint: constraint.to_string(),
                    });
                }
                Ok(tuples)
            }
        }
    }
}

impl From<Axis> for AxisFamily {
    fn from(axis: Axis) -> Self {
        Self::Free(axis)
    }
}

/// Cartesian product of value lists, the last list varying fastest.
fn cartesian<'a, I>(lists: I) -> Vec<Vec<&'a str>>
where
    I: IntoIterator<Item = &'a [String]>,
{
    let mut acc: Vec<Vec<&str>> = vec![Vec::new()];
    for list in lists {
        acc = acc
            .iter()
            .flat_map(|prefix| {
                list.iter().map(move |v| {
                    let mut next = prefix.clone();
                    next.push(v.as_str());
                    next
                })
            })
            .collect();
    }
    acc
}

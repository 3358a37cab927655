//! Run Configuration - one point in the configuration matrix

use serde::{Deserialize, Serialize};

/// Separator between `name=value` pairs in a configuration identifier.
pub const ID_SEPARATOR: &str = "__";

/// One axis value bound inside a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AxisValue {
    axis: String,
    param: String,
    value: String,
}

impl AxisValue {
    /// Bind `value` to `axis`, passed to the simulator as `--<param>=<value>`.
    #[must_use]
    pub fn new(
        axis: impl Into<String>,
        param: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            axis: axis.into(),
            param: param.into(),
            value: value.into(),
        }
    }

    /// Get the axis name.
    #[must_use]
    pub fn axis(&self) -> &str {
        &self.axis
    }

    /// Get the simulator parameter name.
    #[must_use]
    pub fn param(&self) -> &str {
        &self.param
    }

    /// Get the bound value.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Run Configuration is an immutable tuple of axis values.
///
/// ## Identifier Format
///
/// The identifier joins `axis=value` pairs with `__`, in axis declaration
/// order. Value characters outside `[A-Za-z0-9._=-]` become `-`, so the
/// identifier is safe to use as a directory name.
///
/// Examples:
/// - `predictor=tournament`
/// - `width=4__threads=2`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunConfiguration {
    id: String,
    values: Vec<AxisValue>,
}

impl RunConfiguration {
    /// Create a configuration from its axis values.
    #[must_use]
    pub fn new(values: Vec<AxisValue>) -> Self {
        let id = values
            .iter()
            .map(|v| format!("{}={}", v.axis, sanitize(&v.value)))
            .collect::<Vec<_>>()
            .join(ID_SEPARATOR);
        Self { id, values }
    }

    /// Get the stable identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the axis values in declaration order.
    #[must_use]
    pub fn values(&self) -> &[AxisValue] {
        &self.values
    }

    /// Get the value bound to an axis, if the axis is part of this configuration.
    #[must_use]
    pub fn value(&self, axis: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|v| v.axis == axis)
            .map(AxisValue::value)
    }

    /// Simulator parameters for this configuration, `--<param>=<value>` each.
    #[must_use]
    pub fn parameters(&self) -> Vec<String> {
        self.values
            .iter()
            .map(|v| format!("--{}={}", v.param, v.value))
            .collect()
    }
}

fn sanitize(value: &str) -> String {
    value
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '=') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

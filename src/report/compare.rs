//! Relative comparison between configurations

use std::fmt;

use serde::Serialize;

use crate::experiment::ExperimentMatrix;
use crate::extract::{CounterMap, Preference};
use crate::{Error, Result};

/// Why a speedup could not be computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "config_id", rename_all = "snake_case")]
pub enum Undefined {
    /// The baseline configuration has no successful record
    BaselineUnavailable(String),
    /// The compared configuration has no successful record
    ComparisonUnavailable(String),
    /// The divisor of the ratio is zero
    ZeroDenominator(String),
}

impl fmt::Display for Undefined {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BaselineUnavailable(id) => write!(f, "baseline '{id}' has no successful result"),
            Self::ComparisonUnavailable(id) => write!(f, "'{id}' has no successful result"),
            Self::ZeroDenominator(id) => write!(f, "metric is zero for '{id}'"),
        }
    }
}

/// Result of a relative comparison.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Speedup {
    /// Ratio where `> 1.0` means the compared configuration is better
    Defined(f64),
    /// No ratio, with the reason
    Undefined(Undefined),
}

impl Speedup {
    /// The ratio, if defined.
    #[must_use]
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Defined(v) => Some(*v),
            Self::Undefined(_) => None,
        }
    }
}

impl fmt::Display for Speedup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defined(v) => write!(f, "{v:.2}x"),
            Self::Undefined(_) => f.write_str("n/a"),
        }
    }
}

/// Speedup of `comparison_id` over `baseline_id` on `metric`.
///
/// For lower-is-better metrics (simulated time, cycles) this is
/// `baseline / comparison`; for higher-is-better metrics (IPC, hit rates)
/// it is `comparison / baseline`. Either way, `2.0` means the compared
/// configuration is twice as good.
///
/// # Errors
///
/// Returns [`Error::UnknownMetric`] or [`Error::UnknownConfiguration`] when
/// the query names something that does not exist. A configuration that
/// exists but did not succeed gives [`Speedup::Undefined`] instead.
pub fn speedup(
    matrix: &ExperimentMatrix,
    map: &CounterMap,
    metric: &str,
    baseline_id: &str,
    comparison_id: &str,
) -> Result<Speedup> {
    let preference = map
        .preference(metric)
        .ok_or_else(|| Error::UnknownMetric(metric.to_string()))?;

    let lookup = |id: &str| -> Result<Option<f64>> {
        let result = matrix
            .get(id)
            .ok_or_else(|| Error::UnknownConfiguration(id.to_string()))?;
        Ok(if result.is_succeeded() {
            result.metric(metric).map(|v| v.as_f64())
        } else {
            None
        })
    };

    let Some(baseline) = lookup(baseline_id)? else {
        return Ok(Speedup::Undefined(Undefined::BaselineUnavailable(
            baseline_id.to_string(),
        )));
    };
    let Some(comparison) = lookup(comparison_id)? else {
        return Ok(Speedup::Undefined(Undefined::ComparisonUnavailable(
            comparison_id.to_string(),
        )));
    };

    let (numerator, denominator, denominator_id) = match preference {
        Preference::Lower => (baseline, comparison, comparison_id),
        Preference::Higher => (comparison, baseline, baseline_id),
    };
    if denominator == 0.0 {
        return Ok(Speedup::Undefined(Undefined::ZeroDenominator(
            denominator_id.to_string(),
        )));
    }
    Ok(Speedup::Defined(numerator / denominator))
}

/// Speedup of every configuration over one baseline, in matrix order.
///
/// # Errors
///
/// Returns an error if the metric or the baseline configuration is unknown.
pub fn relative_to(
    matrix: &ExperimentMatrix,
    map: &CounterMap,
    metric: &str,
    baseline_id: &str,
) -> Result<Vec<(String, Speedup)>> {
    if matrix.get(baseline_id).is_none() {
        return Err(Error::UnknownConfiguration(baseline_id.to_string()));
    }
    matrix
        .configurations()
        .map(|config| {
            speedup(matrix, map, metric, baseline_id, config.id())
                .map(|s| (config.id().to_string(), s))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::experiment::ExperimentMatrix;
    use crate::report::fixtures::{issue_width_sweep, succeeded};

    #[test]
    fn test_speedup_of_wider_issue() {
        let s = speedup(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            "sim_seconds",
            "width=1",
            "width=8",
        )
        .unwrap();
        assert_eq!(s, Speedup::Defined(8.0));
        assert_eq!(s.to_string(), "8.00x");
    }

    #[test]
    fn test_speedup_direction_for_higher_is_better() {
        let s = speedup(&issue_width_sweep(), &CounterMap::gem5(), "ipc", "width=1", "width=2")
            .unwrap();
        assert_eq!(s.value(), Some(2.0));
    }

    #[test]
    fn test_speedup_undefined_for_failed_side() {
        let map = CounterMap::gem5();
        let matrix = issue_width_sweep();
        let s = speedup(&matrix, &map, "sim_seconds", "width=1", "width=4").unwrap();
        assert_eq!(
            s,
            Speedup::Undefined(Undefined::ComparisonUnavailable("width=4".to_string()))
        );
        let s = speedup(&matrix, &map, "sim_seconds", "width=4", "width=1").unwrap();
        assert_eq!(
            s,
            Speedup::Undefined(Undefined::BaselineUnavailable("width=4".to_string()))
        );
        assert_eq!(s.to_string(), "n/a");
    }

    #[test]
    fn test_speedup_zero_denominator() {
        let matrix = ExperimentMatrix::new(
            vec!["width".to_string()],
            "stats.txt",
            vec![succeeded("1", 0.5, 1.0), succeeded("2", 0.0, 1.0)],
        )
        .unwrap();
        let s = speedup(&matrix, &CounterMap::gem5(), "sim_seconds", "width=1", "width=2").unwrap();
        assert!(matches!(s, Speedup::Undefined(Undefined::ZeroDenominator(_))));
    }

    #[test]
    fn test_unknown_configuration_is_an_error() {
        let err = speedup(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            "sim_seconds",
            "width=1",
            "width=16",
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnknownConfiguration(id) if id == "width=16"));
    }

    #[test]
    fn test_relative_to_keeps_matrix_order() {
        let series =
            relative_to(&issue_width_sweep(), &CounterMap::gem5(), "sim_seconds", "width=1")
                .unwrap();
        let ids: Vec<&str> = series.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["width=1", "width=2", "width=4", "width=8"]);
        assert_eq!(series[0].1.value(), Some(1.0));
        assert_eq!(series[1].1.value(), Some(2.0));
        assert_eq!(series[2].1.value(), None);
    }
}

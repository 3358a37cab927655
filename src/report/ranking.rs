//! Ranking queries over succeeded runs

use std::cmp::Ordering;

use serde::Serialize;

use crate::experiment::ExperimentMatrix;
use crate::extract::{CounterMap, Preference};
use crate::{Error, Result};

/// One configuration's place in a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    /// Configuration identifier
    pub config_id: String,
    /// Metric value of that configuration
    pub value: f64,
}

/// Rank every succeeded run by `metric`, best first.
///
/// "Best" follows the metric's [`Preference`] in the counter map. Ties fall
/// back to configuration identifier order, so the ranking is stable.
///
/// # Errors
///
/// Returns [`Error::UnknownMetric`] if the counter map does not define
/// `metric`, and [`Error::NoValidResults`] if no run succeeded.
pub fn rank(matrix: &ExperimentMatrix, map: &CounterMap, metric: &str) -> Result<Vec<Ranked>> {
    let preference = map
        .preference(metric)
        .ok_or_else(|| Error::UnknownMetric(metric.to_string()))?;

    let mut ranked: Vec<Ranked> = matrix
        .succeeded()
        .filter_map(|r| {
            r.metric(metric).map(|v| Ranked {
                config_id: r.id().to_string(),
                value: v.as_f64(),
            })
        })
        .collect();

    if ranked.is_empty() {
        return Err(Error::NoValidResults {
            metric: metric.to_string(),
        });
    }

    ranked.sort_by(|a, b| {
        by_preference(a.value, b.value, preference).then_with(|| a.config_id.cmp(&b.config_id))
    });
    Ok(ranked)
}

/// Best configuration by `metric` among succeeded runs.
///
/// # Errors
///
/// See [`rank`].
pub fn best_by(matrix: &ExperimentMatrix, map: &CounterMap, metric: &str) -> Result<Ranked> {
    pick(matrix, map, metric, false)
}

/// Worst configuration by `metric` among succeeded runs.
///
/// Ties still resolve to the lexically first identifier.
///
/// # Errors
///
/// See [`rank`].
pub fn worst_by(matrix: &ExperimentMatrix, map: &CounterMap, metric: &str) -> Result<Ranked> {
    pick(matrix, map, metric, true)
}

fn pick(matrix: &ExperimentMatrix, map: &CounterMap, metric: &str, worst: bool) -> Result<Ranked> {
    let ranked = rank(matrix, map, metric)?;
    let chosen = if worst {
        let last = ranked.last().map(|r| r.value);
        ranked.into_iter().find(|r| Some(r.value) == last)
    } else {
        ranked.into_iter().next()
    };
    chosen.ok_or_else(|| Error::NoValidResults {
        metric: metric.to_string(),
    })
}

fn by_preference(a: f64, b: f64, preference: Preference) -> Ordering {
    match preference {
        Preference::Higher => b.total_cmp(&a),
        Preference::Lower => a.total_cmp(&b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{failed, issue_width_sweep, succeeded};

    #[test]
    fn test_rank_lower_is_better() {
        let ranked = rank(&issue_width_sweep(), &CounterMap::gem5(), "sim_seconds").unwrap();
        let ids: Vec<&str> = ranked.iter().map(|r| r.config_id.as_str()).collect();
        assert_eq!(ids, vec!["width=8", "width=2", "width=1"]);
    }

    #[test]
    fn test_rank_higher_is_better() {
        let best = best_by(&issue_width_sweep(), &CounterMap::gem5(), "ipc").unwrap();
        assert_eq!(best.config_id, "width=8");
        let worst = worst_by(&issue_width_sweep(), &CounterMap::gem5(), "ipc").unwrap();
        assert_eq!(worst.config_id, "width=1");
    }

    #[test]
    fn test_failed_runs_are_not_ranked() {
        let ranked = rank(&issue_width_sweep(), &CounterMap::gem5(), "ipc").unwrap();
        assert!(ranked.iter().all(|r| r.config_id != "width=4"));
    }

    #[test]
    fn test_ties_break_on_identifier() {
        let matrix = ExperimentMatrix::new(
            vec!["width".to_string()],
            "stats.txt",
            vec![
                succeeded("4", 0.2, 1.0),
                succeeded("2", 0.2, 1.0),
                succeeded("1", 0.9, 0.3),
            ],
        )
        .unwrap();
        let map = CounterMap::gem5();
        assert_eq!(best_by(&matrix, &map, "sim_seconds").unwrap().config_id, "width=2");
        assert_eq!(worst_by(&matrix, &map, "ipc").unwrap().config_id, "width=1");
        assert_eq!(best_by(&matrix, &map, "ipc").unwrap().config_id, "width=2");
    }

    #[test]
    fn test_no_succeeded_runs_is_an_error() {
        let matrix =
            ExperimentMatrix::new(vec!["width".to_string()], "stats.txt", vec![failed("1")])
                .unwrap();
        let err = best_by(&matrix, &CounterMap::gem5(), "ipc").unwrap_err();
        assert!(matches!(err, Error::NoValidResults { ref metric } if metric == "ipc"));
    }

    #[test]
    fn test_unknown_metric() {
        let err = rank(&issue_width_sweep(), &CounterMap::gem5(), "watts").unwrap_err();
        assert!(matches!(err, Error::UnknownMetric(_)));
    }
}

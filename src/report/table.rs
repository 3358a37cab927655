//! Tabular text view of an experiment matrix

use crate::experiment::{ExperimentMatrix, MetricValue, RunResult, RunStatus};
use crate::extract::CounterMap;
use crate::{Error, Result};

use super::compare::relative_to;
use super::ranking::{best_by, worst_by};
use super::ReportOptions;

/// Cell shown for a metric that is unavailable for a run.
pub const UNAVAILABLE: &str = "n/a";

/// Decimal places for decimal metrics in the text view.
const DECIMAL_PLACES: usize = 6;

/// Render the comparison report as plain text.
///
/// Rows follow the matrix (generator) order. Every configuration appears;
/// runs that did not succeed show [`UNAVAILABLE`] in each metric cell and
/// name their outcome in the status column.
///
/// # Errors
///
/// Returns [`Error::UnknownMetric`] if a requested metric is not in the
/// counter map, and [`Error::UnknownConfiguration`] if the baseline is not
/// part of the matrix.
pub fn render(
    matrix: &ExperimentMatrix,
    map: &CounterMap,
    options: &ReportOptions,
) -> Result<String> {
    let metrics = options.metrics(map)?;

    let baseline = match options.baseline() {
        Some(baseline) => {
            if !map.contains(&baseline.metric) {
                return Err(Error::UnknownMetric(baseline.metric.clone()));
            }
            Some(relative_to(matrix, map, &baseline.metric, &baseline.config_id)?)
        }
        None => None,
    };

    let mut header: Vec<String> = vec!["config_id".to_string(), "status".to_string()];
    header.extend(metrics.iter().map(ToString::to_string));
    if let Some(baseline) = options.baseline() {
        header.push(format!("speedup[{}]", baseline.metric));
    }

    let mut rows: Vec<Vec<String>> = Vec::with_capacity(matrix.len());
    for (i, result) in matrix.results().iter().enumerate() {
        let mut row = vec![result.id().to_string(), result.status().to_string()];
        row.extend(metrics.iter().map(|m| cell(result, m)));
        if let Some(series) = &baseline {
            row.push(series.get(i).map_or_else(
                || UNAVAILABLE.to_string(),
                |(_, speedup)| speedup.to_string(),
            ));
        }
        rows.push(row);
    }

    let mut out: Vec<String> = Vec::new();
    out.push("Simulation sweep comparison report".to_string());
    out.push(format!("counter map: {}", map.version()));
    out.push(format!("stats file: {}", matrix.stats_file()));
    out.push(format!(
        "generated: {}",
        matrix.created_at().format("%Y-%m-%d %H:%M:%S UTC")
    ));
    let counts = matrix.status_counts();
    let summary: Vec<String> = RunStatus::ALL
        .iter()
        .map(|s| format!("{} {}", counts.get(*s), s))
        .collect();
    out.push(format!(
        "configurations: {} ({})",
        counts.total(),
        summary.join(", ")
    ));
    if let Some(baseline) = options.baseline() {
        out.push(format!(
            "baseline: {} on {}",
            baseline.config_id, baseline.metric
        ));
    }
    out.push(String::new());
    out.extend(layout(&header, &rows));

    out.push(String::new());
    out.push("Best / worst (succeeded runs only)".to_string());
    let width = metrics.iter().map(String::len).max().unwrap_or(0);
    for metric in &metrics {
        let line = match (best_by(matrix, map, metric), worst_by(matrix, map, metric)) {
            (Ok(best), Ok(worst)) => format!(
                "  {metric:<width$}  best {} ({})  worst {} ({})",
                best.config_id,
                format_f64(best.value),
                worst.config_id,
                format_f64(worst.value)
            ),
            (Err(Error::NoValidResults { .. }), _) | (_, Err(Error::NoValidResults { .. })) => {
                format!("  {metric:<width$}  {UNAVAILABLE} (no succeeded runs)")
            }
            (Err(e), _) | (_, Err(e)) => return Err(e),
        };
        out.push(line);
    }

    let mut text = out.join("\n");
    text.push('\n');
    Ok(text)
}

fn cell(result: &RunResult, metric: &str) -> String {
    if !result.is_succeeded() {
        return UNAVAILABLE.to_string();
    }
    result
        .metric(metric)
        .map_or_else(|| UNAVAILABLE.to_string(), format_value)
}

fn format_value(value: MetricValue) -> String {
    format!("{value:.prec$}", prec = DECIMAL_PLACES)
}

fn format_f64(value: f64) -> String {
    format!("{value:.prec$}", prec = DECIMAL_PLACES)
}

/// Align columns: the first two left-aligned, metric columns right-aligned.
fn layout(header: &[String], rows: &[Vec<String>]) -> Vec<String> {
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (w, c) in widths.iter_mut().zip(row) {
            *w = (*w).max(c.len());
        }
    }

    let line = |cells: &[String]| -> String {
        cells
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(i, (c, &w))| {
                if i < 2 {
                    format!("{c:<w$}")
                } else {
                    format!("{c:>w$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(header));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    out.extend(rows.iter().map(|r| line(r)));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::fixtures::{failed, issue_width_sweep};

    fn row<'a>(text: &'a str, id: &str) -> &'a str {
        text.lines().find(|l| l.starts_with(id)).unwrap()
    }

    #[test]
    fn test_failed_run_is_marked_not_zeroed() {
        let text = render(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            &ReportOptions::new().with_key_metrics(["sim_seconds", "ipc"]),
        )
        .unwrap();
        let line = row(&text, "width=4");
        assert!(line.contains("failed"));
        assert_eq!(line.matches(UNAVAILABLE).count(), 2);
        assert!(!line.contains("0.000000"));
    }

    #[test]
    fn test_rows_follow_generator_order() {
        let text = render(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            &ReportOptions::new().with_key_metrics(["sim_seconds"]),
        )
        .unwrap();
        let ids: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with("width="))
            .filter_map(|l| l.split_whitespace().next())
            .collect();
        assert_eq!(ids, vec!["width=1", "width=2", "width=4", "width=8"]);
    }

    #[test]
    fn test_header_counts_and_best_worst() {
        let text = render(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            &ReportOptions::new().with_key_metrics(["sim_seconds"]),
        )
        .unwrap();
        assert!(text.contains("counter map: gem5-v1"));
        assert!(text.contains(
            "configurations: 4 (3 succeeded, 1 failed, 0 not-run, 0 extraction-failed)"
        ));
        assert!(text.contains("best width=8 (0.100000)  worst width=1 (0.800000)"));
    }

    #[test]
    fn test_baseline_column() {
        let text = render(
            &issue_width_sweep(),
            &CounterMap::gem5(),
            &ReportOptions::new()
                .with_key_metrics(["sim_seconds"])
                .with_baseline("width=1", "sim_seconds"),
        )
        .unwrap();
        assert!(text.contains("speedup[sim_seconds]"));
        assert!(row(&text, "width=8").ends_with("8.00x"));
        assert!(row(&text, "width=4").ends_with(UNAVAILABLE));
    }

    #[test]
    fn test_all_failed_still_renders() {
        let matrix = ExperimentMatrix::new(
            vec!["width".to_string()],
            "stats.txt",
            vec![failed("1"), failed("2")],
        )
        .unwrap();
        let text = render(
            &matrix,
            &CounterMap::gem5(),
            &ReportOptions::new().with_key_metrics(["ipc"]),
        )
        .unwrap();
        assert!(text.contains("no succeeded runs"));
        assert!(row(&text, "width=2").contains("failed"));
    }
}

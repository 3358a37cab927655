//! Metrics Extractor
//!
//! Turns a run's stats text into a [`MetricsRecord`] holding every metric of
//! a [`CounterMap`]:
//!
//! - each primary metric takes the first numeric occurrence of its first
//!   matching counter alias, or its default when nothing matches;
//! - each derived metric is computed from the primaries right away and
//!   stored alongside them. A derived value counts as measured when the
//!   inputs it rests on were found in the text, which lets `FirstMeasured`
//!   formulas fall back past defaulted candidates.
//!
//! A missing metric is never an error. Only an unreadable stats file is,
//! and the sweep records that as `extraction-failed` rather than handing
//! out an all-default record.
//!
//! ## Example
//!
//! ```rust
//! use simsweep::extract::{extract_text, CounterMap};
//!
//! let text = "system.cpu.branchPred.condPredicted 1000\nsystem.cpu.branchPred.condIncorrect 250\n";
//! let record = extract_text(&CounterMap::gem5(), text);
//! assert_eq!(record.value("branch_miss_rate"), Some(0.25));
//! assert_eq!(record.value("branch_hit_rate"), Some(0.75));
//! ```

mod counter_map;
mod scanner;

pub use counter_map::{CounterMap, DerivedFormula, DerivedSpec, MetricKind, MetricSpec, Preference};
pub use scanner::{StatLine, StatsText};

use std::collections::HashSet;
use std::path::Path;

use tracing::debug;

use crate::experiment::{MetricEntry, MetricSource, MetricValue, MetricsRecord};
use crate::{Error, Result};

/// Extract every metric of `map` from stats text.
#[must_use]
pub fn extract_text(map: &CounterMap, text: &str) -> MetricsRecord {
    let stats = StatsText::parse(text);
    let mut record = MetricsRecord::new(map.version());

    for spec in map.metrics() {
        let matched = spec
            .counters()
            .iter()
            .find_map(|counter| stats.first(counter).map(|line| (counter, line)));

        let entry = match matched.and_then(|(counter, line)| {
            parse_value(line.value, spec.kind()).map(|value| (counter, value))
        }) {
            Some((counter, value)) => {
                MetricEntry::new(spec.name(), value, MetricSource::Counter(counter.clone()))
            }
            None => MetricEntry::new(
                spec.name(),
                MetricValue::Decimal(spec.default_value()),
                MetricSource::Defaulted,
            ),
        };
        record.insert(entry);
    }

    // Names backed by the stats text rather than defaults
    let mut measured: HashSet<String> = record
        .entries()
        .iter()
        .filter(|e| matches!(e.source(), MetricSource::Counter(_)))
        .map(|e| e.name().to_string())
        .collect();

    for spec in map.derived() {
        let formula = spec.formula();
        let value = formula.evaluate(
            |name| record.value(name).unwrap_or(0.0),
            |name| measured.contains(name),
        );
        if formula.is_measured(|name| measured.contains(name)) {
            measured.insert(spec.name().to_string());
        }
        record.insert(MetricEntry::new(
            spec.name(),
            MetricValue::Decimal(value),
            MetricSource::Derived,
        ));
    }

    let defaulted: Vec<&str> = record.defaulted().collect();
    if !defaulted.is_empty() {
        debug!(
            version = map.version(),
            defaulted = ?defaulted,
            "metrics not found in stats text"
        );
    }

    record
}

/// Read a stats file and extract every metric of `map`.
///
/// # Errors
///
/// Returns [`Error::StatsUnreadable`] if the file cannot be read.
pub fn extract_file(map: &CounterMap, path: impl AsRef<Path>) -> Result<MetricsRecord> {
    let path = path.as_ref();
    let bytes = std::fs::read(path).map_err(|source| Error::StatsUnreadable {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(extract_text(map, &String::from_utf8_lossy(&bytes)))
}

fn parse_value(token: &str, kind: MetricKind) -> Option<MetricValue> {
    match kind {
        MetricKind::Integral => token
            .parse::<u64>()
            .map(MetricValue::Integer)
            .ok()
            .or_else(|| token.parse::<f64>().ok().map(MetricValue::Decimal)),
        MetricKind::Decimal => token.parse::<f64>().ok().map(MetricValue::Decimal),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text_defaults_everything() {
        let map = CounterMap::gem5();
        let record = extract_text(&map, "");
        assert_eq!(record.len(), map.metric_names().len());
        assert_eq!(record.defaulted().count(), map.metrics().len());
        assert_eq!(record.value("sim_seconds"), Some(0.0));
        // Derived from defaults, not defaulted themselves
        assert_eq!(record.value("icache_hit_rate"), Some(1.0));
        assert_eq!(record.value("cpi"), Some(0.0));
    }

    #[test]
    fn test_integral_counts_stay_integers() {
        let map = CounterMap::gem5();
        let record = extract_text(
            &map,
            "sim_insts 123456789012345678\nsystem.cpu.numCycles 2.5e3\n",
        );
        assert_eq!(
            record.get("sim_insts"),
            Some(MetricValue::Integer(123_456_789_012_345_678))
        );
        assert_eq!(record.get("num_cycles"), Some(MetricValue::Decimal(2500.0)));
    }

    #[test]
    fn test_alias_priority() {
        let map = CounterMap::gem5();
        let text = "system.cpu.numInsts 10\nsimInsts 20\n";
        let record = extract_text(&map, text);
        assert_eq!(record.get("sim_insts"), Some(MetricValue::Integer(20)));
        assert_eq!(
            record.entry("sim_insts").map(MetricEntry::source),
            Some(&MetricSource::Counter("simInsts".to_string()))
        );
    }

    #[test]
    fn test_cpi_derived_from_cycles_and_insts() {
        let map = CounterMap::gem5();
        let record = extract_text(&map, "sim_insts 1000\nsystem.cpu.numCycles 2500\n");
        assert_eq!(record.value("cpi"), Some(2.5));
    }

    #[test]
    fn test_extract_file_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = extract_file(&CounterMap::gem5(), dir.path().join("stats.txt")).unwrap_err();
        assert!(matches!(err, Error::StatsUnreadable { .. }));
    }
}

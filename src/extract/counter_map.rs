//! Counter map - the versioned vocabulary from simulator counters to metrics

use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// How a primary metric's text is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Whole-number counter, kept as `u64` when the text allows
    Integral,
    /// Decimal value
    Decimal,
}

/// Which direction is better when ranking by a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preference {
    /// Larger values rank first (IPC, hit rates)
    Higher,
    /// Smaller values rank first (simulated time, miss rates)
    Lower,
}

/// A primary metric read from the stats text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
    name: String,
    counters: Vec<String>,
    kind: MetricKind,
    #[serde(default)]
    default: f64,
    preference: Preference,
}

impl MetricSpec {
    /// Create a primary metric.
    ///
    /// # Arguments
    ///
    /// * `name` - Metric name used in records and reports
    /// * `counters` - Counter aliases, tried in order; the first that matches wins
    /// * `kind` - Integral or decimal parsing
    /// * `preference` - Ranking direction
    #[must_use]
    pub fn new<I, S>(
        name: impl Into<String>,
        counters: I,
        kind: MetricKind,
        preference: Preference,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            counters: counters.into_iter().map(Into::into).collect(),
            kind,
            default: 0.0,
            preference,
        }
    }

    /// Use a default other than `0.0` when no counter matches.
    #[must_use]
    pub const fn with_default(mut self, default: f64) -> Self {
        self.default = default;
        self
    }

    /// Get the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the counter aliases in priority order.
    #[must_use]
    pub fn counters(&self) -> &[String] {
        &self.counters
    }

    /// Get the parsing kind.
    #[must_use]
    pub const fn kind(&self) -> MetricKind {
        self.kind
    }

    /// Get the default value.
    #[must_use]
    pub const fn default_value(&self) -> f64 {
        self.default
    }

    /// Get the ranking direction.
    #[must_use]
    pub const fn preference(&self) -> Preference {
        self.preference
    }
}

/// Formula of a derived metric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DerivedFormula {
    /// `1 - of`, left unclamped
    Complement {
        /// Source metric
        of: String,
    },
    /// `numerator / denominator`, `0.0` when the denominator is zero
    Ratio {
        /// Dividend metric
        numerator: String,
        /// Divisor metric
        denominator: String,
    },
    /// Value of the first input that was measured, else the first input's
    /// (default) value
    FirstMeasured {
        /// Candidates in priority order
        of: Vec<String>,
    },
}

impl DerivedFormula {
    /// Metric names this formula reads.
    #[must_use]
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            Self::Complement { of } => vec![of.as_str()],
            Self::Ratio {
                numerator,
                denominator,
            } => vec![numerator.as_str(), denominator.as_str()],
            Self::FirstMeasured { of } => of.iter().map(String::as_str).collect(),
        }
    }

    /// Whether the result rests on measured inputs rather than defaults.
    ///
    /// `Complement` and `Ratio` need every input measured; `FirstMeasured`
    /// needs any one.
    #[must_use]
    pub fn is_measured(&self, measured: impl Fn(&str) -> bool) -> bool {
        match self {
            Self::FirstMeasured { of } => of.iter().any(|name| measured(name.as_str())),
            _ => self.inputs().into_iter().all(measured),
        }
    }

    /// Evaluate the formula on already-known input values.
    ///
    /// `measured` tells whether an input was read from the stats text (or
    /// derived from values that were); only `FirstMeasured` consults it.
    #[must_use]
    pub fn evaluate(
        &self,
        lookup: impl Fn(&str) -> f64,
        measured: impl Fn(&str) -> bool,
    ) -> f64 {
        match self {
            Self::Complement { of } => 1.0 - lookup(of),
            Self::Ratio {
                numerator,
                denominator,
            } => {
                let d = lookup(denominator);
                if d == 0.0 {
                    0.0
                } else {
                    lookup(numerator) / d
                }
            }
            Self::FirstMeasured { of } => of
                .iter()
                .find(|name| measured(name.as_str()))
                .or_else(|| of.first())
                .map_or(0.0, |name| lookup(name.as_str())),
        }
    }
}

/// A metric computed from other metrics at extraction time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedSpec {
    name: String,
    formula: DerivedFormula,
    preference: Preference,
}

impl DerivedSpec {
    /// `name = 1 - of`
    #[must_use]
    pub fn complement(
        name: impl Into<String>,
        of: impl Into<String>,
        preference: Preference,
    ) -> Self {
        Self {
            name: name.into(),
            formula: DerivedFormula::Complement { of: of.into() },
            preference,
        }
    }

    /// `name = numerator / denominator`
    #[must_use]
    pub fn ratio(
        name: impl Into<String>,
        numerator: impl Into<String>,
        denominator: impl Into<String>,
        preference: Preference,
    ) -> Self {
        Self {
            name: name.into(),
            formula: DerivedFormula::Ratio {
                numerator: numerator.into(),
                denominator: denominator.into(),
            },
            preference,
        }
    }

    /// `name = ` the first of `of` that was measured
    #[must_use]
    pub fn first_measured<I, S>(name: impl Into<String>, of: I, preference: Preference) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            formula: DerivedFormula::FirstMeasured {
                of: of.into_iter().map(Into::into).collect(),
            },
            preference,
        }
    }

    /// Get the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the formula.
    #[must_use]
    pub const fn formula(&self) -> &DerivedFormula {
        &self.formula
    }

    /// Get the ranking direction.
    #[must_use]
    pub const fn preference(&self) -> Preference {
        self.preference
    }
}

/// Counter map: the documented mapping from simulator counters to metrics.
///
/// The map carries a `version` so reports can state which vocabulary
/// produced them; the counter vocabulary can change without touching the
/// sweep logic.
///
/// ## JSON Shape
///
/// ```json
/// {
///   "version": "gem5-v1",
///   "metrics": [
///     {"name": "ipc", "counters": ["cpu.ipc"], "kind": "decimal", "preference": "higher"}
///   ],
///   "derived": [
///     {"name": "cpi", "formula": {"op": "ratio", "numerator": "num_cycles", "denominator": "sim_insts"}, "preference": "lower"}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CounterMap {
    version: String,
    metrics: Vec<MetricSpec>,
    #[serde(default)]
    derived: Vec<DerivedSpec>,
}

impl CounterMap {
    /// Create a counter map.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDefinition`] if metric names repeat, a metric
    /// has no counters, or a derived metric reads a metric defined after it.
    pub fn new(
        version: impl Into<String>,
        metrics: Vec<MetricSpec>,
        derived: Vec<DerivedSpec>,
    ) -> Result<Self> {
        let map = Self {
            version: version.into(),
            metrics,
            derived,
        };
        map.validate()?;
        Ok(map)
    }

    /// The built-in vocabulary for gem5 `stats.txt` output.
    ///
    /// Counter aliases cover both the pre-v21 (`sim_seconds`,
    /// `overall_miss_rate`) and current (`simSeconds`, `overallMissRate`)
    /// gem5 naming. Per-CPU counters also match numbered cores
    /// (`system.cpu0.ipc`); with several cores the first one listed wins.
    #[must_use]
    pub fn gem5() -> Self {
        use MetricKind::{Decimal, Integral};
        use Preference::{Higher, Lower};

        let metrics = vec![
            MetricSpec::new("sim_seconds", ["sim_seconds", "simSeconds"], Decimal, Lower),
            MetricSpec::new("sim_ticks", ["sim_ticks", "simTicks"], Integral, Lower),
            MetricSpec::new(
                "sim_insts",
                [
                    "sim_insts",
                    "simInsts",
                    "cpu.numInsts",
                    "cpu.committedInsts",
                    "cpu.commitStats.committedInsts",
                ],
                Integral,
                Higher,
            ),
            MetricSpec::new("num_cycles", ["cpu.numCycles"], Integral, Lower),
            MetricSpec::new("ipc", ["cpu.ipc"], Decimal, Higher),
            MetricSpec::new(
                "icache_miss_rate",
                ["cpu.icache.overallMissRate::total", "cpu.icache.overall_miss_rate::total"],
                Decimal,
                Lower,
            ),
            MetricSpec::new(
                "dcache_miss_rate",
                ["cpu.dcache.overallMissRate::total", "cpu.dcache.overall_miss_rate::total"],
                Decimal,
                Lower,
            ),
            MetricSpec::new(
                "l2cache_miss_rate",
                ["l2cache.overallMissRate::total", "l2cache.overall_miss_rate::total"],
                Decimal,
                Lower,
            ),
            MetricSpec::new(
                "icache_misses",
                ["cpu.icache.overallMisses::total", "cpu.icache.overall_misses::total"],
                Integral,
                Lower,
            ),
            MetricSpec::new(
                "dcache_misses",
                ["cpu.dcache.overallMisses::total", "cpu.dcache.overall_misses::total"],
                Integral,
                Lower,
            ),
            MetricSpec::new(
                "l2cache_misses",
                ["l2cache.overallMisses::total", "l2cache.overall_misses::total"],
                Integral,
                Lower,
            ),
            MetricSpec::new(
                "branch_lookups",
                ["branchPred.condPredicted", "branchPred.lookups"],
                Integral,
                Higher,
            ),
            MetricSpec::new(
                "branch_mispredicted",
                ["branchPred.condIncorrect"],
                Integral,
                Lower,
            ),
            MetricSpec::new(
                "branch_reported_miss_rate",
                ["branch.missRate", "branchPred.missRate"],
                Decimal,
                Lower,
            ),
        ];

        let derived = vec![
            DerivedSpec::complement("icache_hit_rate", "icache_miss_rate", Higher),
            DerivedSpec::complement("dcache_hit_rate", "dcache_miss_rate", Higher),
            DerivedSpec::complement("l2cache_hit_rate", "l2cache_miss_rate", Higher),
            DerivedSpec::ratio(
                "branch_mispredict_rate",
                "branch_mispredicted",
                "branch_lookups",
                Lower,
            ),
            // gem5 rarely prints a miss rate; the predictor counters are the usual source
            DerivedSpec::first_measured(
                "branch_miss_rate",
                ["branch_reported_miss_rate", "branch_mispredict_rate"],
                Lower,
            ),
            DerivedSpec::complement("branch_hit_rate", "branch_miss_rate", Higher),
            DerivedSpec::ratio("cpi", "num_cycles", "sim_insts", Lower),
        ];

        Self {
            version: "gem5-v1".to_string(),
            metrics,
            derived,
        }
    }

    /// Load a counter map from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let map: Self = serde_json::from_str(&text)?;
        map.validate()?;
        Ok(map)
    }

    fn validate(&self) -> Result<()> {
        if self.version.trim().is_empty() {
            return Err(Error::InvalidDefinition("counter map needs a version".to_string()));
        }
        let mut known: HashSet<&str> = HashSet::new();
        for spec in &self.metrics {
            if spec.counters.is_empty() {
                return Err(Error::InvalidDefinition(format!(
                    "metric '{}' has no counters",
                    spec.name
                )));
            }
            if !known.insert(&spec.name) {
                return Err(Error::InvalidDefinition(format!(
                    "metric '{}' defined more than once",
                    spec.name
                )));
            }
        }
        for spec in &self.derived {
            if spec.formula.inputs().is_empty() {
                return Err(Error::InvalidDefinition(format!(
                    "derived metric '{}' reads no metrics",
                    spec.name
                )));
            }
            if let Some(missing) = spec.formula.inputs().into_iter().find(|i| !known.contains(i)) {
                return Err(Error::InvalidDefinition(format!(
                    "derived metric '{}' reads '{missing}', which is not defined before it",
                    spec.name
                )));
            }
            if !known.insert(&spec.name) {
                return Err(Error::InvalidDefinition(format!(
                    "metric '{}' defined more than once",
                    spec.name
                )));
            }
        }
        Ok(())
    }

    /// Get the vocabulary version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the primary metrics in map order.
    #[must_use]
    pub fn metrics(&self) -> &[MetricSpec] {
        &self.metrics
    }

    /// Get the derived metrics in evaluation order.
    #[must_use]
    pub fn derived(&self) -> &[DerivedSpec] {
        &self.derived
    }

    /// Every metric name, primaries first.
    #[must_use]
    pub fn metric_names(&self) -> Vec<&str> {
        self.metrics
            .iter()
            .map(MetricSpec::name)
            .chain(self.derived.iter().map(DerivedSpec::name))
            .collect()
    }

    /// Whether the map defines `name`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.preference(name).is_some()
    }

    /// Ranking direction of a metric, if the map defines it.
    #[must_use]
    pub fn preference(&self, name: &str) -> Option<Preference> {
        self.metrics
            .iter()
            .find(|m| m.name == name)
            .map(MetricSpec::preference)
            .or_else(|| {
                self.derived
                    .iter()
                    .find(|d| d.name == name)
                    .map(DerivedSpec::preference)
            })
    }
}

impl Default for CounterMap {
    fn default() -> Self {
        Self::gem5()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gem5_map_is_valid() {
        let map = CounterMap::gem5();
        assert!(map.validate().is_ok());
        assert_eq!(map.version(), "gem5-v1");
        assert!(map.contains("branch_hit_rate"));
        assert_eq!(map.preference("sim_seconds"), Some(Preference::Lower));
        assert_eq!(map.preference("ipc"), Some(Preference::Higher));
        assert_eq!(map.preference("bogus"), None);
    }

    #[test]
    fn test_metric_names_primaries_first() {
        let map = CounterMap::gem5();
        let names = map.metric_names();
        assert_eq!(names.first(), Some(&"sim_seconds"));
        assert_eq!(names.last(), Some(&"cpi"));
        assert_eq!(names.len(), map.metrics().len() + map.derived().len());
    }

    #[test]
    fn test_derived_must_follow_inputs() {
        let err = CounterMap::new(
            "v",
            vec![MetricSpec::new("a", ["x"], MetricKind::Decimal, Preference::Lower)],
            vec![DerivedSpec::complement("b", "missing", Preference::Higher)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn test_duplicate_metric_rejected() {
        let err = CounterMap::new(
            "v",
            vec![
                MetricSpec::new("a", ["x"], MetricKind::Decimal, Preference::Lower),
                MetricSpec::new("a", ["y"], MetricKind::Decimal, Preference::Lower),
            ],
            vec![],
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidDefinition(_)));
    }

    #[test]
    fn test_ratio_zero_denominator() {
        let f = DerivedFormula::Ratio {
            numerator: "a".into(),
            denominator: "b".into(),
        };
        assert_eq!(f.evaluate(|n| if n == "a" { 5.0 } else { 0.0 }, |_| true), 0.0);
        assert_eq!(f.evaluate(|n| if n == "a" { 6.0 } else { 3.0 }, |_| true), 2.0);
    }

    #[test]
    fn test_first_measured_skips_defaults() {
        let f = DerivedFormula::FirstMeasured {
            of: vec!["reported".into(), "computed".into()],
        };
        let lookup = |n: &str| if n == "reported" { 0.0 } else { 0.25 };
        assert_eq!(f.evaluate(lookup, |n| n == "computed"), 0.25);
        assert_eq!(f.evaluate(lookup, |_| true), 0.0);
        // nothing measured: the first candidate's default stands
        assert_eq!(f.evaluate(lookup, |_| false), 0.0);
        assert!(!f.is_measured(|_| false));
        assert!(f.is_measured(|n| n == "computed"));
    }

    #[test]
    fn test_derived_without_inputs_rejected() {
        let err = CounterMap::new(
            "v",
            vec![MetricSpec::new("a", ["x"], MetricKind::Decimal, Preference::Lower)],
            vec![DerivedSpec::first_measured("b", Vec::<String>::new(), Preference::Lower)],
        )
        .unwrap_err();
        assert!(err.to_string().contains("reads no metrics"));
    }

    #[test]
    fn test_json_round_trip_keeps_vocabulary() {
        let map = CounterMap::gem5();
        let json = serde_json::to_string(&map).unwrap();
        let back: CounterMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);
    }
}

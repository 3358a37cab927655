//! Metric Record - typed metrics extracted from one run's stats text

use std::fmt;

use serde::{Deserialize, Serialize};

/// A metric value.
///
/// Conceptually integral counters (instruction counts, cycles) stay integers
/// so large counts are reported without float rounding.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    /// Integral counter
    Integer(u64),
    /// Decimal value
    Decimal(f64),
}

impl MetricValue {
    /// Get the value as `f64` for arithmetic and ranking.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Integer(v) => v as f64,
            Self::Decimal(v) => v,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Decimal(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}"),
                None => write!(f, "{v}"),
            },
        }
    }
}

/// Where a metric value came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "counter", rename_all = "snake_case")]
pub enum MetricSource {
    /// Matched against this counter name in the stats text
    Counter(String),
    /// No counter matched; the documented default was used
    Defaulted,
    /// Computed from other metrics in the same record
    Derived,
}

/// One named metric inside a [`MetricsRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricEntry {
    name: String,
    value: MetricValue,
    source: MetricSource,
}

impl MetricEntry {
    /// Create a new metric entry.
    #[must_use]
    pub fn new(name: impl Into<String>, value: MetricValue, source: MetricSource) -> Self {
        Self {
            name: name.into(),
            value,
            source,
        }
    }

    /// Get the metric name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the metric value.
    #[must_use]
    pub const fn value(&self) -> MetricValue {
        self.value
    }

    /// Get where the value came from.
    #[must_use]
    pub const fn source(&self) -> &MetricSource {
        &self.source
    }
}

/// Metrics Record holds every metric of the counter map for one run.
///
/// Primary metrics come first in counter-map order, followed by derived
/// metrics. A record produced by the extractor always contains the full
/// metric set; metrics the stats text did not mention carry their default
/// and are tagged [`MetricSource::Defaulted`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    counter_map_version: String,
    entries: Vec<MetricEntry>,
}

impl MetricsRecord {
    /// Create an empty record tagged with the counter-map version that will fill it.
    #[must_use]
    pub fn new(counter_map_version: impl Into<String>) -> Self {
        Self {
            counter_map_version: counter_map_version.into(),
            entries: Vec::new(),
        }
    }

    /// Append a metric. A metric already present is replaced in place.
    pub fn insert(&mut self, entry: MetricEntry) {
        if let Some(existing) = self.entries.iter_mut().find(|e| e.name == entry.name) {
            *existing = entry;
        } else {
            self.entries.push(entry);
        }
    }

    /// Get the counter-map version that produced this record.
    #[must_use]
    pub fn counter_map_version(&self) -> &str {
        &self.counter_map_version
    }

    /// Get all entries in record order.
    #[must_use]
    pub fn entries(&self) -> &[MetricEntry] {
        &self.entries
    }

    /// Look up a metric value by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.entry(name).map(MetricEntry::value)
    }

    /// Look up a metric entry by name.
    #[must_use]
    pub fn entry(&self, name: &str) -> Option<&MetricEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Look up a metric as `f64`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<f64> {
        self.get(name).map(MetricValue::as_f64)
    }

    /// Names of metrics that fell back to their default.
    pub fn defaulted(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|e| e.source == MetricSource::Defaulted)
            .map(MetricEntry::name)
    }

    /// Number of metrics in the record.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the record holds no metrics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

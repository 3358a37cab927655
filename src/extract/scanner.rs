//! Line scanner for `<dotted.counter.name>  <value>  [extra columns]` text

/// One counter line: the key and its raw value token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatLine<'a> {
    /// Counter key (first whitespace-separated token)
    pub key: &'a str,
    /// First numeric token after the key
    pub value: &'a str,
}

/// Numeric counter lines of a stats text, in file order.
///
/// Blank lines, `#` comments, dump delimiters (`---------- Begin ...`) and
/// lines with no finite number between the key and the `#` description are
/// skipped. Columns after the value (percentages, descriptions) are ignored.
#[derive(Debug, Clone)]
pub struct StatsText<'a> {
    lines: Vec<StatLine<'a>>,
}

impl<'a> StatsText<'a> {
    /// Scan stats text into counter lines.
    #[must_use]
    pub fn parse(text: &'a str) -> Self {
        let lines = text
            .lines()
            .filter_map(|line| {
                let trimmed = line.trim_start();
                if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with("---") {
                    return None;
                }
                let mut tokens = trimmed.split_whitespace();
                let key = tokens.next()?;
                let value = tokens
                    .take_while(|t| !t.starts_with('#'))
                    .find(|t| is_numeric(t))?;
                Some(StatLine { key, value })
            })
            .collect();
        Self { lines }
    }

    /// Number of numeric counter lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether no numeric counter line was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// First line whose key matches `counter`.
    ///
    /// A key matches when its trailing dot-separated segments equal the
    /// counter's, so `cpu.ipc` finds `system.cpu.ipc` but not
    /// `system.cpu.ipcx`. Every segment but the last may carry an instance
    /// index: `cpu.ipc` also finds `system.cpu0.ipc`, and
    /// `cpu.commitStats.committedInsts` finds
    /// `system.cpu.commitStats0.committedInsts`.
    #[must_use]
    pub fn first(&self, counter: &str) -> Option<StatLine<'a>> {
        self.lines
            .iter()
            .find(|line| key_matches(line.key, counter))
            .copied()
    }
}

fn key_matches(key: &str, counter: &str) -> bool {
    let mut key_segments = key.rsplit('.');
    counter.rsplit('.').enumerate().all(|(i, want)| {
        key_segments
            .next()
            .is_some_and(|have| have == want || (i > 0 && is_indexed(have, want)))
    })
}

/// `cpu3` is instance 3 of `cpu`.
fn is_indexed(segment: &str, name: &str) -> bool {
    segment
        .strip_prefix(name)
        .is_some_and(|index| !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()))
}

/// Digits, sign, decimal point or exponent only; rejects `nan` and `inf`.
fn is_numeric(token: &str) -> bool {
    token
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.'))
        && token.parse::<f64>().is_ok_and(f64::is_finite)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "
---------- Begin Simulation Statistics ----------
sim_seconds                                  0.000123                       # Number of seconds simulated (Second)
system.cpu.ipc                               0.512                          # IPC: instructions per cycle ((Count/Cycle))
system.cpu.icache.overallMissRate::total     nan                            # miss rate for overall accesses
system.cpu.op_class::IntAlu                  4212       71.20%     71.20%   # Class of executed instruction
# comment line 1.0
host_seconds                                 1.5
---------- End Simulation Statistics   ----------
system.cpu.ipc                               0.9
";

    #[test]
    fn test_skips_comments_delimiters_and_nan() {
        let stats = StatsText::parse(SAMPLE);
        assert_eq!(stats.len(), 5);
        assert!(stats.first("cpu.icache.overallMissRate::total").is_none());
    }

    #[test]
    fn test_first_occurrence_wins() {
        let stats = StatsText::parse(SAMPLE);
        assert_eq!(stats.first("cpu.ipc").map(|l| l.value), Some("0.512"));
    }

    #[test]
    fn test_suffix_match_respects_dots() {
        let stats = StatsText::parse(SAMPLE);
        assert_eq!(stats.first("sim_seconds").map(|l| l.value), Some("0.000123"));
        // `host_seconds` must not satisfy `seconds`
        assert!(stats.first("seconds").is_none());
        assert!(stats.first("class::IntAlu").is_none());
        assert_eq!(
            stats.first("cpu.op_class::IntAlu").map(|l| l.value),
            Some("4212")
        );
    }

    #[test]
    fn test_value_after_separator_column() {
        let stats = StatsText::parse("system.cpu.numCycles = 1234\nsystem.cpu.idle n/a # 7\n");
        assert_eq!(stats.first("cpu.numCycles").map(|l| l.value), Some("1234"));
        assert!(stats.first("cpu.idle").is_none());
    }

    #[test]
    fn test_indexed_instances_match() {
        let stats = StatsText::parse(
            "system.cpu0.ipc 1.5\nsystem.cpu1.ipc 0.5\nsystem.cpu.commitStats0.committedInsts 777\n",
        );
        assert_eq!(stats.first("cpu.ipc").map(|l| l.value), Some("1.5"));
        assert_eq!(
            stats.first("cpu.commitStats.committedInsts").map(|l| l.value),
            Some("777")
        );
        // the last segment never takes an index
        assert!(StatsText::parse("system.cpu.ipc0 2.0\n").first("cpu.ipc").is_none());
        assert!(StatsText::parse("system.cpux.ipc 2.0\n").first("cpu.ipc").is_none());
    }

    #[test]
    fn test_numeric_tokens() {
        assert!(is_numeric("42"));
        assert!(is_numeric("-0.5"));
        assert!(is_numeric("1.5e-3"));
        assert!(is_numeric(".25"));
        assert!(!is_numeric("nan"));
        assert!(!is_numeric("inf"));
        assert!(!is_numeric("-inf"));
        assert!(!is_numeric("71.20%"));
        assert!(!is_numeric("x1"));
    }
}

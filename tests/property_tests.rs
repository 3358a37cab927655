//! Property-based tests for matrix generation and metric derivation
//!
//! - Test generator invariants (count, uniqueness, determinism)
//! - Test derived-metric formulas against the stats text
//! - Run with ProptestConfig::with_cases(100)

use std::collections::HashSet;

use proptest::prelude::*;
use simsweep::experiment::{Axis, Constraint, MatrixGenerator};
use simsweep::extract::{extract_text, CounterMap};

// ============================================================================
// Property Test Generators (Strategies)
// ============================================================================

/// Up to four axes, each with 1..=4 distinct values.
fn arb_axes() -> impl Strategy<Value = Vec<Axis>> {
    proptest::collection::vec(
        proptest::collection::btree_set("[a-z0-9]{1,6}", 1..=4),
        1..=4,
    )
    .prop_map(|sets| {
        sets.into_iter()
            .enumerate()
            .map(|(i, values)| Axis::new(format!("axis{i}"), values))
            .collect()
    })
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: configuration count is the product of axis lengths
    #[test]
    fn prop_count_is_product_of_axis_lengths(axes in arb_axes()) {
        let expected: usize = axes.iter().map(|a| a.values().len()).product();
        let generator = axes.into_iter().fold(MatrixGenerator::new(), MatrixGenerator::axis);
        let configs = generator.generate().unwrap();
        prop_assert_eq!(configs.len(), expected);
    }

    /// Property: identifiers are unique within a matrix
    #[test]
    fn prop_identifiers_are_unique(axes in arb_axes()) {
        let generator = axes.into_iter().fold(MatrixGenerator::new(), MatrixGenerator::axis);
        let configs = generator.generate().unwrap();
        let ids: HashSet<&str> = configs.iter().map(|c| c.id()).collect();
        prop_assert_eq!(ids.len(), configs.len());
    }

    /// Property: generation is deterministic
    #[test]
    fn prop_generation_is_deterministic(axes in arb_axes()) {
        let generator = axes.into_iter().fold(MatrixGenerator::new(), MatrixGenerator::axis);
        prop_assert_eq!(generator.generate().unwrap(), generator.generate().unwrap());
    }

    /// Property: the first configuration takes every axis' first value
    #[test]
    fn prop_first_configuration_is_first_values(axes in arb_axes()) {
        let firsts: Vec<String> = axes.iter().map(|a| a.values()[0].clone()).collect();
        let generator = axes.into_iter().fold(MatrixGenerator::new(), MatrixGenerator::axis);
        let configs = generator.generate().unwrap();
        let values: Vec<String> = configs[0]
            .values()
            .iter()
            .map(|v| v.value().to_string())
            .collect();
        prop_assert_eq!(values, firsts);
    }

    /// Property: a sum-constrained family keeps exactly the tuples with that sum
    #[test]
    fn prop_constrained_tuples_satisfy_sum(
        a in proptest::collection::btree_set(0u32..10, 1..6),
        b in proptest::collection::btree_set(0u32..10, 1..6),
        total in 0u32..20,
    ) {
        let expected = a
            .iter()
            .flat_map(|x| b.iter().map(move |y| x + y))
            .filter(|sum| *sum == total)
            .count();
        let result = MatrixGenerator::new()
            .constrained(
                vec![
                    Axis::new("a", a.iter().map(ToString::to_string)),
                    Axis::new("b", b.iter().map(ToString::to_string)),
                ],
                Constraint::SumEquals(f64::from(total)),
            )
            .generate();

        if expected == 0 {
            prop_assert!(result.is_err());
        } else {
            let configs = result.unwrap();
            prop_assert_eq!(configs.len(), expected);
            for config in &configs {
                let x: u32 = config.value("a").unwrap().parse().unwrap();
                let y: u32 = config.value("b").unwrap().parse().unwrap();
                prop_assert_eq!(x + y, total);
            }
        }
    }

    /// Property: hit rate is exactly one minus the miss rate in the text
    #[test]
    fn prop_hit_rate_is_complement_of_miss_rate(miss in 0.0f64..=1.0) {
        let text = format!("system.cpu.dcache.overall_miss_rate::total {miss}\n");
        let record = extract_text(&CounterMap::gem5(), &text);
        prop_assert_eq!(record.value("dcache_miss_rate"), Some(miss));
        prop_assert_eq!(record.value("dcache_hit_rate"), Some(1.0 - miss));
    }

    /// Property: integral counters survive without precision loss
    #[test]
    fn prop_integral_counters_are_exact(insts in any::<u64>()) {
        let text = format!("sim_insts {insts}\n");
        let record = extract_text(&CounterMap::gem5(), &text);
        prop_assert_eq!(
            record.get("sim_insts"),
            Some(simsweep::experiment::MetricValue::Integer(insts))
        );
    }

    /// Property: extraction never panics and always yields the full vocabulary
    #[test]
    fn prop_extraction_total_on_arbitrary_text(text in "\\PC{0,400}") {
        let map = CounterMap::gem5();
        let record = extract_text(&map, &text);
        prop_assert_eq!(record.len(), map.metric_names().len());
    }
}

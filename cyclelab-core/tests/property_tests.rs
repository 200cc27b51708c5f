//! Property tests for analyzer invariants.
//!
//! Uses proptest to verify:
//! 1. Partition — every normalized day lands in exactly one phase group
//! 2. Fertile window — its days are input days inside the window bounds
//! 3. Averages — always finite, whatever the temperatures
//! 4. Override precedence — a valid override is returned unchanged
//! 5. Short input — fewer than the minimum samples is always unknown
//! 6. Determinism — same input, same result, independent of input order;
//!    analyzing twice is idempotent

use std::collections::BTreeSet;

use proptest::prelude::*;

use cyclelab_core::{
    detect_ovulation_day, AnalyzerConfig, CycleAnalyzer, CycleSample, DetectionMethod,
    NoopObserver, OvulationDay,
};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_temperature() -> impl Strategy<Value = f64> {
    prop_oneof![
        9 => (96.5..99.5_f64).prop_map(|t| (t * 100.0).round() / 100.0),
        1 => Just(f64::NAN),
    ]
}

/// Samples with arbitrary (possibly repeated, unordered) days.
fn arb_samples(max_len: usize) -> impl Strategy<Value = Vec<CycleSample>> {
    prop::collection::vec((1..45u32, arb_temperature()), 1..max_len).prop_map(|pairs| {
        pairs
            .into_iter()
            .map(|(day, t)| CycleSample::new(day, t))
            .collect()
    })
}

/// A contiguous cycle starting on day 1.
fn arb_contiguous(max_len: usize) -> impl Strategy<Value = Vec<CycleSample>> {
    prop::collection::vec(arb_temperature(), 1..max_len).prop_map(|temps| {
        temps
            .into_iter()
            .enumerate()
            .map(|(i, t)| CycleSample::new(i as u32 + 1, t))
            .collect()
    })
}

fn distinct_days(samples: &[CycleSample]) -> BTreeSet<u32> {
    samples.iter().map(|s| s.day).collect()
}

// ── 1. Partition ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn every_day_in_exactly_one_group(samples in arb_samples(60), ov in prop::option::of(0..50u32)) {
        let result = CycleAnalyzer::default().analyze(&samples, ov).unwrap();

        let follicular: BTreeSet<u32> = result.follicular.days.iter().copied().collect();
        let luteal: BTreeSet<u32> = result.luteal.days.iter().copied().collect();

        prop_assert!(follicular.is_disjoint(&luteal));
        let union: BTreeSet<u32> = follicular.union(&luteal).copied().collect();
        prop_assert_eq!(union, distinct_days(&samples));
        prop_assert!(follicular.iter().all(|&d| d < result.split.day));
        prop_assert!(luteal.iter().all(|&d| d >= result.split.day));
    }
}

// ── 2. Fertile window ────────────────────────────────────────────────

proptest! {
    #[test]
    fn fertile_window_is_bounded_subset(samples in arb_samples(60), ov in prop::option::of(1..50u32)) {
        let result = CycleAnalyzer::default().analyze(&samples, ov).unwrap();
        let days = distinct_days(&samples);
        let split = result.split.day;

        for &d in &result.fertile_window.days {
            prop_assert!(days.contains(&d));
            prop_assert!(d >= split.saturating_sub(5) && d <= split + 1);
        }
        prop_assert_eq!(result.fertile_window.days.len(), result.fertile_window.temps.len());
    }
}

// ── 3. Averages ──────────────────────────────────────────────────────

proptest! {
    #[test]
    fn averages_are_always_finite(samples in arb_samples(60)) {
        let result = CycleAnalyzer::default().analyze(&samples, None).unwrap();
        prop_assert!(result.follicular.average.is_finite());
        prop_assert!(result.luteal.average.is_finite());
    }
}

// ── 4. Override precedence ───────────────────────────────────────────

proptest! {
    #[test]
    fn valid_override_is_returned_unchanged(samples in arb_contiguous(40), day in 1..60u32) {
        prop_assume!(samples.len() >= 8);
        let ov = detect_ovulation_day(&samples, Some(day), &AnalyzerConfig::default(), &NoopObserver);
        prop_assert_eq!(ov, OvulationDay::Known { day, method: DetectionMethod::Override });
    }
}

// ── 5. Short input ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn short_input_is_unknown(samples in arb_contiguous(8), ov in prop::option::of(0..30u32)) {
        let ov = detect_ovulation_day(&samples, ov, &AnalyzerConfig::default(), &NoopObserver);
        prop_assert_eq!(ov, OvulationDay::Unknown);
    }
}

// ── 6. Determinism ───────────────────────────────────────────────────

proptest! {
    #[test]
    fn order_of_distinct_days_does_not_matter(samples in arb_contiguous(40)) {
        let analyzer = CycleAnalyzer::default();
        let forward = analyzer.analyze(&samples, None).unwrap();

        let mut reversed = samples.clone();
        reversed.reverse();
        let backward = analyzer.analyze(&reversed, None).unwrap();

        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn repeated_analysis_is_identical(samples in arb_samples(60), ov in prop::option::of(0..50u32)) {
        let analyzer = CycleAnalyzer::default();
        let first = analyzer.analyze(&samples, ov).unwrap();
        let second = analyzer.analyze(&samples, ov).unwrap();
        prop_assert_eq!(first, second);
    }

    #[test]
    fn detected_day_is_within_observed_days(samples in arb_contiguous(40)) {
        let ov = detect_ovulation_day(&samples, None, &AnalyzerConfig::default(), &NoopObserver);
        if let OvulationDay::Known { day, .. } = ov {
            prop_assert!(day >= 1 && day as usize <= samples.len());
        }
    }
}

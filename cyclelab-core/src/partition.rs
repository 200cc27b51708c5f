//! Phase partitioning.
//!
//! Given an ovulation day (or the lack of one), assigns every cycle day to the
//! follicular or luteal group and collects the fertile window around the
//! split.

use crate::config::{AnalyzerConfig, SplitConfig};
use crate::domain::{
    CyclePhaseResult, CycleSample, FertileWindow, NormalizedCycle, OvulationDay, PhaseGroup,
    PhaseSplit,
};
use crate::observer::{report_normalization, AnalysisEvent, AnalysisObserver};
use crate::stats::div_round;

/// Split day used when the ovulation day is unknown.
///
/// Long cycles put the split `luteal_length` days before the end (but never
/// before `min_split_day`); shorter ones split at the midpoint, half rounding
/// up. With no samples at all the default split applies.
pub fn estimated_split_day(last_day: Option<u32>, config: &SplitConfig) -> u32 {
    match last_day {
        None => config.default_split_day,
        Some(last) if last > config.long_cycle_day => last
            .saturating_sub(config.luteal_length)
            .max(config.min_split_day),
        Some(last) => div_round(last, 2),
    }
}

/// Partition raw samples around `ovulation`.
///
/// Samples are normalized the same way detection normalizes them, so the
/// two steps always agree on the set of days.
pub fn partition_phases(
    samples: &[CycleSample],
    ovulation: &OvulationDay,
    config: &AnalyzerConfig,
    observer: &dyn AnalysisObserver,
) -> CyclePhaseResult {
    let cycle = NormalizedCycle::from_samples(samples);
    report_normalization(&cycle, observer);
    partition_cycle(&cycle, ovulation, config, observer)
}

pub(crate) fn partition_cycle(
    cycle: &NormalizedCycle,
    ovulation: &OvulationDay,
    config: &AnalyzerConfig,
    observer: &dyn AnalysisObserver,
) -> CyclePhaseResult {
    let split = match ovulation.day() {
        Some(day) => PhaseSplit {
            day,
            estimated: false,
        },
        None => {
            let last_day = cycle.last_day();
            let split_day = estimated_split_day(last_day, &config.split);
            observer.on_event(&AnalysisEvent::SplitEstimated {
                last_day,
                split_day,
            });
            PhaseSplit {
                day: split_day,
                estimated: true,
            }
        }
    };

    let fertile_start = split.day.saturating_sub(config.fertile.days_before);
    let fertile_end = split.day.saturating_add(config.fertile.days_after);

    let fallback = &config.fallback;
    let mut follicular = PhaseGroup::empty(fallback.follicular_average);
    let mut luteal = PhaseGroup::empty(fallback.luteal_average);
    let mut fertile_window = FertileWindow::default();

    for sample in cycle.samples() {
        let temp = sample.reading();
        if sample.day < split.day {
            follicular.push(sample.day, temp);
        } else {
            luteal.push(sample.day, temp);
        }
        if (fertile_start..=fertile_end).contains(&sample.day) {
            fertile_window.days.push(sample.day);
            fertile_window.temps.push(temp);
        }
    }

    follicular.finalize(fallback.follicular_average);
    luteal.finalize(fallback.luteal_average);

    observer.on_event(&AnalysisEvent::PhasesPartitioned {
        split_day: split.day,
        follicular: follicular.len(),
        luteal: luteal.len(),
        fertile: fertile_window.days.len(),
    });

    CyclePhaseResult {
        ovulation_day: *ovulation,
        split,
        follicular,
        luteal,
        fertile_window,
    }
}

//! Triphasic shift — three consecutive days above the pre-rise baseline.
//!
//! For each candidate index `i`, the baseline is the mean of up to
//! `baseline_days` usable temperatures strictly before `i`. The rule fires when
//! samples `i .. i + rise_days` are all usable and at least `rise_threshold`
//! above that baseline, and the day at `i` lies in the detection window.
//! Ovulation is reported as the day *before* the rise (index `i - 1`).

use std::ops::RangeInclusive;

use crate::config::AnalyzerConfig;
use crate::domain::{CycleSample, DetectionMethod, NormalizedCycle};
use crate::observer::{AnalysisEvent, AnalysisObserver};
use crate::stats::finite_mean;

use super::{scan_indices, OvulationDetector};

#[derive(Debug, Clone)]
pub struct TriphasicShift {
    pub baseline_days: usize,
    pub rise_days: usize,
    pub rise_threshold: f64,
    pub window: RangeInclusive<u32>,
}

impl TriphasicShift {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            baseline_days: config.triphasic.baseline_days,
            rise_days: config.triphasic.rise_days,
            rise_threshold: config.triphasic.rise_threshold,
            window: config.detection_window(),
        }
    }

    fn is_sustained(&self, samples: &[CycleSample], start: usize, floor: f64) -> bool {
        (start..start + self.rise_days).all(|j| {
            samples
                .get(j)
                .and_then(CycleSample::reading)
                .is_some_and(|t| t >= floor)
        })
    }
}

impl OvulationDetector for TriphasicShift {
    fn name(&self) -> &str {
        "triphasic_shift"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::TriphasicShift
    }

    fn detect(&self, cycle: &NormalizedCycle, observer: &dyn AnalysisObserver) -> Option<u32> {
        let samples = cycle.samples();

        for i in scan_indices(samples.len()) {
            let lo = i.saturating_sub(self.baseline_days);
            let Some(baseline) = finite_mean(samples[lo..i].iter().filter_map(CycleSample::reading))
            else {
                continue;
            };

            if !self.is_sustained(samples, i, baseline + self.rise_threshold) {
                continue;
            }
            if !self.window.contains(&samples[i].day) {
                continue;
            }

            let ovulation_day = samples[i - 1].day;
            observer.on_event(&AnalysisEvent::ShiftDetected {
                method: DetectionMethod::TriphasicShift,
                rise_day: samples[i].day,
                ovulation_day,
                baseline,
                observed: samples[i].temperature,
            });
            return Some(ovulation_day);
        }

        None
    }
}

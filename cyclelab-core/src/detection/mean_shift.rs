//! Mean shift — jump between the three-day means on either side of a day.
//!
//! Fires at the first candidate `i` where the mean of up to `window_days`
//! usable temperatures starting at `i`, minus the mean of up to `window_days`
//! before `i`, reaches `threshold`, with the day at `i` in the detection
//! window. Unlike the triphasic rule, the reported day is the day at `i`
//! itself, not `i - 1`.

use std::ops::RangeInclusive;

use crate::config::AnalyzerConfig;
use crate::domain::{CycleSample, DetectionMethod, NormalizedCycle};
use crate::observer::{AnalysisEvent, AnalysisObserver};
use crate::stats::finite_mean;

use super::{scan_indices, OvulationDetector};

#[derive(Debug, Clone)]
pub struct MeanShift {
    pub window_days: usize,
    pub threshold: f64,
    pub window: RangeInclusive<u32>,
}

impl MeanShift {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            window_days: config.mean_shift.window_days,
            threshold: config.mean_shift.threshold,
            window: config.detection_window(),
        }
    }
}

impl OvulationDetector for MeanShift {
    fn name(&self) -> &str {
        "mean_shift"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::MeanShift
    }

    fn detect(&self, cycle: &NormalizedCycle, observer: &dyn AnalysisObserver) -> Option<u32> {
        let samples = cycle.samples();
        let n = samples.len();

        for i in scan_indices(n) {
            let before = &samples[i.saturating_sub(self.window_days)..i];
            let after = &samples[i..(i + self.window_days).min(n)];

            let (Some(before_avg), Some(after_avg)) = (
                finite_mean(before.iter().filter_map(CycleSample::reading)),
                finite_mean(after.iter().filter_map(CycleSample::reading)),
            ) else {
                continue;
            };

            if after_avg - before_avg >= self.threshold && self.window.contains(&samples[i].day) {
                let day = samples[i].day;
                observer.on_event(&AnalysisEvent::ShiftDetected {
                    method: DetectionMethod::MeanShift,
                    rise_day: day,
                    ovulation_day: day,
                    baseline: before_avg,
                    observed: after_avg,
                });
                return Some(day);
            }
        }

        None
    }
}

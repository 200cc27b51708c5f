//! Proportional estimate — calendar fallback when no temperature shift shows.
//!
//! Once the cycle has reached `min_last_day`, ovulation is placed at the
//! midpoint of a typical cycle (day 14 of 28). If the last observed day is
//! already past that midpoint, ovulation is assumed to have happened
//! `days_before_last` days before the last observation. The estimate never
//! exceeds the last observed day.

use crate::config::AnalyzerConfig;
use crate::domain::{DetectionMethod, NormalizedCycle};
use crate::observer::{AnalysisEvent, AnalysisObserver};
use crate::stats::div_round;

use super::OvulationDetector;

#[derive(Debug, Clone)]
pub struct ProportionalEstimate {
    pub min_last_day: u32,
    pub typical_cycle_length: u32,
    pub days_before_last: u32,
}

impl ProportionalEstimate {
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            min_last_day: config.estimate.min_last_day,
            typical_cycle_length: config.estimate.typical_cycle_length,
            days_before_last: config.estimate.days_before_last,
        }
    }

    /// Estimated ovulation day for a cycle observed up to `last_day`.
    pub fn estimate(&self, last_day: u32) -> Option<u32> {
        if last_day < self.min_last_day {
            return None;
        }
        let midpoint = div_round(self.typical_cycle_length, 2);
        let estimate = if last_day > midpoint {
            last_day.saturating_sub(self.days_before_last)
        } else {
            midpoint
        };
        Some(estimate.min(last_day))
    }
}

impl OvulationDetector for ProportionalEstimate {
    fn name(&self) -> &str {
        "proportional_estimate"
    }

    fn method(&self) -> DetectionMethod {
        DetectionMethod::ProportionalEstimate
    }

    fn detect(&self, cycle: &NormalizedCycle, observer: &dyn AnalysisObserver) -> Option<u32> {
        let last_day = cycle.last_day()?;
        let day = self.estimate(last_day)?;
        observer.on_event(&AnalysisEvent::OvulationEstimated { last_day, day });
        Some(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn estimator() -> ProportionalEstimate {
        ProportionalEstimate::from_config(&AnalyzerConfig::default())
    }

    #[test]
    fn too_early_in_cycle() {
        assert_eq!(estimator().estimate(9), None);
        assert_eq!(estimator().estimate(1), None);
    }

    #[test]
    fn clamped_to_last_day_before_midpoint() {
        assert_eq!(estimator().estimate(10), Some(10));
        assert_eq!(estimator().estimate(12), Some(12));
        assert_eq!(estimator().estimate(14), Some(14));
    }

    #[test]
    fn past_midpoint_counts_back_from_last_day() {
        assert_eq!(estimator().estimate(15), Some(12));
        assert_eq!(estimator().estimate(28), Some(25));
        assert_eq!(estimator().estimate(35), Some(32));
    }

    #[test]
    fn odd_typical_length_rounds_half_up() {
        let est = ProportionalEstimate {
            min_last_day: 10,
            typical_cycle_length: 27,
            days_before_last: 3,
        };
        assert_eq!(est.estimate(14), Some(14));
        assert_eq!(est.estimate(15), Some(12));
    }

    #[test]
    fn huge_typical_length_does_not_overflow() {
        let est = ProportionalEstimate {
            min_last_day: 10,
            typical_cycle_length: u32::MAX,
            days_before_last: 3,
        };
        assert_eq!(est.estimate(12), Some(12));
        assert_eq!(est.estimate(u32::MAX), Some(u32::MAX - 3));
    }
}

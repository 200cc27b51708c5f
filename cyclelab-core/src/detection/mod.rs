//! Ovulation day detection.
//!
//! Detection runs in strict precedence order and the first step that produces
//! a day wins:
//!
//! 1. Too few samples -> unknown
//! 2. External override
//! 3. [`TriphasicShift`] — sustained rise over the six-day baseline
//! 4. [`MeanShift`] — jump between consecutive three-day means
//! 5. [`ProportionalEstimate`] — calendar estimate from the last observed day
//!
//! Steps 3-5 are [`OvulationDetector`] trait objects held by a
//! [`DetectorChain`], so the precedence lives in one place.

pub mod estimate;
pub mod mean_shift;
pub mod triphasic;

pub use estimate::ProportionalEstimate;
pub use mean_shift::MeanShift;
pub use triphasic::TriphasicShift;

use std::ops::Range;

use crate::config::AnalyzerConfig;
use crate::domain::{CycleSample, DetectionMethod, NormalizedCycle, OvulationDay};
use crate::observer::{report_normalization, AnalysisEvent, AnalysisObserver};

/// Candidates need at least this many samples before them.
const SCAN_START: usize = 2;
/// Candidates stop this many samples before the end.
const SCAN_TAIL: usize = 2;

/// Candidate indices for the sliding-window scans.
///
/// Both temperature scans look at `i` in `2..=len-3`.
pub(crate) fn scan_indices(len: usize) -> Range<usize> {
    SCAN_START..len.saturating_sub(SCAN_TAIL)
}

/// A single ovulation heuristic.
///
/// Detectors receive the normalized cycle (ascending, one sample per day) and
/// return the ovulation day if their rule fires. They never see the override
/// and never need to check the minimum sample count; the chain handles both.
pub trait OvulationDetector: Send + Sync {
    /// Human-readable name (e.g., "triphasic_shift").
    fn name(&self) -> &str;

    /// Method reported when this detector fires.
    fn method(&self) -> DetectionMethod;

    fn detect(&self, cycle: &NormalizedCycle, observer: &dyn AnalysisObserver) -> Option<u32>;
}

/// Ordered list of detectors behind the sample-count gate and the override.
pub struct DetectorChain {
    min_samples: usize,
    detectors: Vec<Box<dyn OvulationDetector>>,
}

impl DetectorChain {
    /// The standard chain: triphasic, mean shift, proportional estimate.
    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self {
            min_samples: config.min_samples,
            detectors: vec![
                Box::new(TriphasicShift::from_config(config)),
                Box::new(MeanShift::from_config(config)),
                Box::new(ProportionalEstimate::from_config(config)),
            ],
        }
    }

    /// Build a chain from arbitrary detectors, tried in the given order.
    pub fn new(min_samples: usize, detectors: Vec<Box<dyn OvulationDetector>>) -> Self {
        Self {
            min_samples,
            detectors,
        }
    }

    /// Names of the detectors in precedence order.
    pub fn detector_names(&self) -> Vec<&str> {
        self.detectors.iter().map(|d| d.name()).collect()
    }

    pub fn detect(
        &self,
        cycle: &NormalizedCycle,
        override_day: Option<u32>,
        observer: &dyn AnalysisObserver,
    ) -> OvulationDay {
        if cycle.len() < self.min_samples {
            observer.on_event(&AnalysisEvent::InsufficientData {
                samples: cycle.len(),
                required: self.min_samples,
            });
            return OvulationDay::Unknown;
        }

        match override_day {
            Some(day) if day >= 1 => {
                observer.on_event(&AnalysisEvent::OverrideApplied { day });
                return OvulationDay::Known {
                    day,
                    method: DetectionMethod::Override,
                };
            }
            Some(day) => observer.on_event(&AnalysisEvent::OverrideIgnored { day }),
            None => {}
        }

        for detector in &self.detectors {
            if let Some(day) = detector.detect(cycle, observer) {
                return OvulationDay::Known {
                    day,
                    method: detector.method(),
                };
            }
        }

        observer.on_event(&AnalysisEvent::OvulationUnknown {
            last_day: cycle.last_day(),
        });
        OvulationDay::Unknown
    }
}

impl std::fmt::Debug for DetectorChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectorChain")
            .field("min_samples", &self.min_samples)
            .field("detectors", &self.detector_names())
            .finish()
    }
}

/// Detect the ovulation day of one cycle.
///
/// Samples may arrive in any order; they are sorted by day first. Returns
/// [`OvulationDay::Unknown`] when there are fewer than `config.min_samples`
/// samples or when no step applies.
pub fn detect_ovulation_day(
    samples: &[CycleSample],
    override_day: Option<u32>,
    config: &AnalyzerConfig,
    observer: &dyn AnalysisObserver,
) -> OvulationDay {
    let cycle = NormalizedCycle::from_samples(samples);
    report_normalization(&cycle, observer);
    DetectorChain::from_config(config).detect(&cycle, override_day, observer)
}

#[cfg(test)]
pub(crate) fn cycle_from_temps(temps: &[f64]) -> NormalizedCycle {
    let samples: Vec<CycleSample> = temps
        .iter()
        .enumerate()
        .map(|(i, &t)| CycleSample::new(i as u32 + 1, t))
        .collect();
    NormalizedCycle::from_samples(&samples)
}

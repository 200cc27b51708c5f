//! Analysis output — ovulation estimate and phase-tagged day groups.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::stats::finite_mean;

/// How an ovulation day was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetectionMethod {
    /// Supplied by the caller, no heuristic ran.
    Override,
    /// Three consecutive days above the six-day baseline.
    TriphasicShift,
    /// Three-day mean jumped against the preceding three days.
    MeanShift,
    /// Calendar estimate from the last observed day.
    ProportionalEstimate,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Override => "override",
            Self::TriphasicShift => "triphasic_shift",
            Self::MeanShift => "mean_shift",
            Self::ProportionalEstimate => "proportional_estimate",
        }
    }

    /// True for the two temperature-based methods.
    pub fn is_thermal(&self) -> bool {
        matches!(self, Self::TriphasicShift | Self::MeanShift)
    }
}

impl fmt::Display for DetectionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ovulation day estimate, or explicitly unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum OvulationDay {
    Known { day: u32, method: DetectionMethod },
    Unknown,
}

impl OvulationDay {
    pub fn day(&self) -> Option<u32> {
        match self {
            Self::Known { day, .. } => Some(*day),
            Self::Unknown => None,
        }
    }

    pub fn method(&self) -> Option<DetectionMethod> {
        match self {
            Self::Known { method, .. } => Some(*method),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

/// Days of one phase with their aligned temperatures.
///
/// `temps[i]` belongs to `days[i]`; malformed temperatures are `None`.
/// `average` is always a finite number: the mean of the usable temperatures,
/// or the configured fallback when there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseGroup {
    pub days: Vec<u32>,
    pub temps: Vec<Option<f64>>,
    pub average: f64,
}

impl PhaseGroup {
    pub(crate) fn empty(fallback_average: f64) -> Self {
        Self {
            days: Vec::new(),
            temps: Vec::new(),
            average: fallback_average,
        }
    }

    pub(crate) fn push(&mut self, day: u32, temperature: Option<f64>) {
        self.days.push(day);
        self.temps.push(temperature);
    }

    pub(crate) fn finalize(&mut self, fallback_average: f64) {
        self.average = self.measured_average().unwrap_or(fallback_average);
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Mean of the usable temperatures, without the fallback.
    pub fn measured_average(&self) -> Option<f64> {
        finite_mean(self.temps.iter().flatten().copied())
    }

    /// Number of days spanned, first to last (0 when empty).
    pub fn span_days(&self) -> u32 {
        match (self.days.first(), self.days.last()) {
            (Some(first), Some(last)) => last - first + 1,
            _ => 0,
        }
    }
}

/// Days around ovulation with elevated conception probability.
///
/// A secondary view: its days also appear in the follicular or luteal group.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FertileWindow {
    pub days: Vec<u32>,
    pub temps: Vec<Option<f64>>,
}

impl FertileWindow {
    pub fn start(&self) -> Option<u32> {
        self.days.first().copied()
    }

    pub fn end(&self) -> Option<u32> {
        self.days.last().copied()
    }

    pub fn contains(&self, day: u32) -> bool {
        self.days.binary_search(&day).is_ok()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

/// Boundary day between the follicular and luteal groups.
///
/// `estimated` is set when no ovulation day was available and the split was
/// derived from the cycle length instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseSplit {
    pub day: u32,
    pub estimated: bool,
}

/// Result of one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CyclePhaseResult {
    pub ovulation_day: OvulationDay,
    pub split: PhaseSplit,
    pub follicular: PhaseGroup,
    pub luteal: PhaseGroup,
    pub fertile_window: FertileWindow,
}

impl CyclePhaseResult {
    /// Luteal minus follicular mean, when both phases have usable data.
    pub fn temperature_shift(&self) -> Option<f64> {
        let follicular = self.follicular.measured_average()?;
        let luteal = self.luteal.measured_average()?;
        Some(luteal - follicular)
    }

    /// Total number of days across both phases.
    pub fn day_count(&self) -> usize {
        self.follicular.len() + self.luteal.len()
    }
}

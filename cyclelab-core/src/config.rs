//! Analyzer configuration.
//!
//! Every threshold the detectors and the partitioner use lives here. The
//! defaults reproduce the reference behavior (°F thresholds, 8-sample minimum,
//! detection window on cycle days 8-20). All tables deserialize with
//! `#[serde(default)]`, so a TOML file only needs the keys it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Invalid analyzer configuration.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Top-level analyzer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Fewer normalized samples than this and detection reports unknown.
    pub min_samples: usize,
    /// First cycle day on which a temperature rise may start.
    pub detection_min_day: u32,
    /// Last cycle day on which a temperature rise may start.
    pub detection_max_day: u32,
    pub triphasic: TriphasicConfig,
    pub mean_shift: MeanShiftConfig,
    pub estimate: EstimateConfig,
    pub split: SplitConfig,
    pub fertile: FertileConfig,
    pub fallback: FallbackConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            min_samples: 8,
            detection_min_day: 8,
            detection_max_day: 20,
            triphasic: TriphasicConfig::default(),
            mean_shift: MeanShiftConfig::default(),
            estimate: EstimateConfig::default(),
            split: SplitConfig::default(),
            fertile: FertileConfig::default(),
            fallback: FallbackConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.detection_min_day > self.detection_max_day {
            return Err(ConfigError::invalid(
                "detection_min_day",
                format!(
                    "{} is after detection_max_day {}",
                    self.detection_min_day, self.detection_max_day
                ),
            ));
        }
        if self.triphasic.baseline_days == 0 {
            return Err(ConfigError::invalid("triphasic.baseline_days", "must be >= 1"));
        }
        if self.triphasic.rise_days == 0 {
            return Err(ConfigError::invalid("triphasic.rise_days", "must be >= 1"));
        }
        check_finite("triphasic.rise_threshold", self.triphasic.rise_threshold)?;
        if self.mean_shift.window_days == 0 {
            return Err(ConfigError::invalid("mean_shift.window_days", "must be >= 1"));
        }
        check_finite("mean_shift.threshold", self.mean_shift.threshold)?;
        if self.estimate.typical_cycle_length == 0 {
            return Err(ConfigError::invalid(
                "estimate.typical_cycle_length",
                "must be >= 1",
            ));
        }
        check_finite("fallback.follicular_average", self.fallback.follicular_average)?;
        check_finite("fallback.luteal_average", self.fallback.luteal_average)?;
        Ok(())
    }

    /// Inclusive day range a rise must start in to count as ovulation.
    pub fn detection_window(&self) -> std::ops::RangeInclusive<u32> {
        self.detection_min_day..=self.detection_max_day
    }
}

fn check_finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("{value} is not finite")))
    }
}

/// Sustained-rise scan: `rise_days` consecutive samples at least
/// `rise_threshold` above the mean of the preceding `baseline_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriphasicConfig {
    pub baseline_days: usize,
    pub rise_days: usize,
    pub rise_threshold: f64,
}

impl Default for TriphasicConfig {
    fn default() -> Self {
        Self {
            baseline_days: 6,
            rise_days: 3,
            rise_threshold: 0.2,
        }
    }
}

/// Mean-shift scan: mean of the `window_days` starting at a candidate minus
/// the mean of the `window_days` before it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeanShiftConfig {
    pub window_days: usize,
    pub threshold: f64,
}

impl Default for MeanShiftConfig {
    fn default() -> Self {
        Self {
            window_days: 3,
            threshold: 0.3,
        }
    }
}

/// Calendar fallback used when no temperature shift is found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimateConfig {
    /// The estimate only applies once the cycle has reached this day.
    pub min_last_day: u32,
    pub typical_cycle_length: u32,
    /// Past mid-cycle, ovulation is placed this many days before the last day.
    pub days_before_last: u32,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        Self {
            min_last_day: 10,
            typical_cycle_length: 28,
            days_before_last: 3,
        }
    }
}

/// Split point used by the partitioner when the ovulation day is unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    /// Cycles longer than this are split `luteal_length` days before the end.
    pub long_cycle_day: u32,
    pub luteal_length: u32,
    pub min_split_day: u32,
    /// Split used when there are no samples at all.
    pub default_split_day: u32,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            long_cycle_day: 20,
            luteal_length: 14,
            min_split_day: 10,
            default_split_day: 14,
        }
    }
}

/// Fertile window `[split - days_before, split + days_after]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FertileConfig {
    pub days_before: u32,
    pub days_after: u32,
}

impl Default for FertileConfig {
    fn default() -> Self {
        Self {
            days_before: 5,
            days_after: 1,
        }
    }
}

/// Averages reported for phases without usable temperatures (°F).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackConfig {
    pub follicular_average: f64,
    pub luteal_average: f64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            follicular_average: 97.5,
            luteal_average: 98.1,
        }
    }
}

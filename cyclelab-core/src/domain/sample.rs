//! CycleSample — one observed day within a cycle.

use std::fmt;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A single basal-body-temperature observation.
///
/// `temperature` is in °F. A non-finite temperature marks the sample as
/// malformed: the day still belongs to a phase, but the value never enters an
/// average and never confirms a temperature rise.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CycleSample {
    /// 1-based cycle day.
    pub day: u32,
    #[serde(
        default = "missing_temperature",
        deserialize_with = "lenient_temperature"
    )]
    pub temperature: f64,
    #[serde(default)]
    pub is_period: bool,
}

/// Value stored for a day whose temperature is absent.
pub fn missing_temperature() -> f64 {
    f64::NAN
}

/// Deserialize a temperature without failing the whole document.
///
/// Numbers pass through. `null`, empty cells and text that does not parse as a
/// number load as NaN, i.e. a malformed sample that keeps its day.
pub fn lenient_temperature<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(TemperatureVisitor)
}

struct TemperatureVisitor;

impl<'de> Visitor<'de> for TemperatureVisitor {
    type Value = f64;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a temperature, numeric text, or null")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<f64, E> {
        Ok(v)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<f64, E> {
        Ok(v as f64)
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<f64, E> {
        let v = v.trim();
        if v.is_empty() {
            return Ok(f64::NAN);
        }
        Ok(v.parse().unwrap_or_else(|_| {
            debug!(value = v, "unparsable temperature loaded as malformed");
            f64::NAN
        }))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<f64, E> {
        debug!(value = v, "unparsable temperature loaded as malformed");
        Ok(f64::NAN)
    }

    fn visit_unit<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_none<E: de::Error>(self) -> Result<f64, E> {
        Ok(f64::NAN)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<f64, D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl CycleSample {
    pub fn new(day: u32, temperature: f64) -> Self {
        Self {
            day,
            temperature,
            is_period: false,
        }
    }

    pub fn with_period(mut self, is_period: bool) -> Self {
        self.is_period = is_period;
        self
    }

    /// The temperature if it is usable (finite), `None` otherwise.
    pub fn reading(&self) -> Option<f64> {
        self.temperature.is_finite().then_some(self.temperature)
    }

    pub fn is_malformed(&self) -> bool {
        !self.temperature.is_finite()
    }
}

/// One cycle as delivered by a data provider.
///
/// `ovulation_day` is an optional pre-computed value from a higher-confidence
/// source; when present it short-circuits the heuristics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleInput {
    pub samples: Vec<CycleSample>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ovulation_day: Option<u32>,
}

impl CycleInput {
    pub fn new(samples: Vec<CycleSample>) -> Self {
        Self {
            samples,
            ovulation_day: None,
        }
    }

    pub fn with_ovulation_day(mut self, day: u32) -> Self {
        self.ovulation_day = Some(day);
        self
    }
}

/// Samples sorted ascending by day, one sample per day.
///
/// The sliding windows of the detectors are index based, so every entry point
/// goes through this type first. Sorting is stable and duplicate days keep
/// their first occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCycle {
    samples: Vec<CycleSample>,
    reordered: bool,
    duplicate_days: Vec<u32>,
}

impl NormalizedCycle {
    pub fn from_samples(samples: &[CycleSample]) -> Self {
        let reordered = !samples.windows(2).all(|w| w[0].day <= w[1].day);

        let mut sorted = samples.to_vec();
        sorted.sort_by_key(|s| s.day);

        let mut duplicate_days = Vec::new();
        sorted.dedup_by(|later, kept| {
            if later.day == kept.day {
                duplicate_days.push(later.day);
                true
            } else {
                false
            }
        });

        Self {
            samples: sorted,
            reordered,
            duplicate_days,
        }
    }

    pub fn samples(&self) -> &[CycleSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Highest observed cycle day.
    pub fn last_day(&self) -> Option<u32> {
        self.samples.last().map(|s| s.day)
    }

    /// True if the input was not already in ascending day order.
    pub fn was_reordered(&self) -> bool {
        self.reordered
    }

    /// Days that appeared more than once in the input (one entry per dropped sample).
    pub fn duplicate_days(&self) -> &[u32] {
        &self.duplicate_days
    }

    /// Days whose temperature is not usable.
    pub fn malformed_days(&self) -> impl Iterator<Item = u32> + '_ {
        self.samples
            .iter()
            .filter(|s| s.is_malformed())
            .map(|s| s.day)
    }
}

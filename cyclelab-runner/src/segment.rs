//! Splitting a dated temperature log into cycles.
//!
//! A cycle starts on the first day of a period run: a period record whose
//! previous calendar day has no period record. A new start only counts once
//! at least `min_cycle_days` have passed since the current cycle began, so
//! spotting in mid-cycle does not open a new cycle. Records before the first
//! period start belong to no cycle and are dropped.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use cyclelab_core::CycleSample;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SegmentError {
    #[error("no readings to segment")]
    NoReadings,
    #[error("no readings on or before {0}")]
    NothingBefore(NaiveDate),
    #[error("no period start found; mark at least one period day")]
    NoPeriodStart,
}

/// One dated temperature record from a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedReading {
    pub date: NaiveDate,
    /// °F; non-finite values mark a malformed record.
    pub temperature: f64,
    #[serde(default)]
    pub is_period: bool,
}

impl DatedReading {
    pub fn new(date: NaiveDate, temperature: f64) -> Self {
        Self {
            date,
            temperature,
            is_period: false,
        }
    }

    pub fn period(mut self) -> Self {
        self.is_period = true;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Minimum days between two cycle starts.
    pub min_cycle_days: u32,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self { min_cycle_days: 10 }
    }
}

/// One cycle cut out of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cycle {
    /// 0-based position in the log.
    pub index: usize,
    pub start_date: NaiveDate,
    /// Inclusive. The day before the next start, or the as-of date.
    pub end_date: NaiveDate,
    pub length_days: u32,
    /// False for the cycle still running at the as-of date.
    pub complete: bool,
    /// Samples keyed by cycle day (1 = start date).
    pub samples: Vec<CycleSample>,
}

impl Cycle {
    /// Cycle day of `date` (1-based), if the date falls inside this cycle.
    pub fn day_of(&self, date: NaiveDate) -> Option<u32> {
        if date < self.start_date || date > self.end_date {
            return None;
        }
        u32::try_from((date - self.start_date).num_days() + 1).ok()
    }

    /// Cycle days without a record.
    pub fn missing_days(&self) -> Vec<u32> {
        let recorded: HashSet<u32> = self.samples.iter().map(|s| s.day).collect();
        (1..=self.length_days)
            .filter(|d| !recorded.contains(d))
            .collect()
    }
}

/// Result of segmenting a log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segmentation {
    pub as_of: NaiveDate,
    pub cycles: Vec<Cycle>,
    /// Records dated before the first period start.
    pub dropped_readings: usize,
    /// Records that repeated an earlier date.
    pub duplicate_dates: usize,
}

impl Segmentation {
    /// Cycle day of the as-of date in the running cycle.
    pub fn current_cycle_day(&self) -> Option<u32> {
        self.cycles.last().and_then(|c| c.day_of(self.as_of))
    }

    pub fn completed(&self) -> impl Iterator<Item = &Cycle> {
        self.cycles.iter().filter(|c| c.complete)
    }
}

/// Split `readings` into cycles.
///
/// `as_of` closes the last cycle and defaults to the latest record date.
/// Records after `as_of` are ignored.
pub fn segment_history(
    readings: &[DatedReading],
    as_of: Option<NaiveDate>,
    config: &SegmentConfig,
) -> Result<Segmentation, SegmentError> {
    let mut sorted: Vec<&DatedReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let before = sorted.len();
    sorted.dedup_by_key(|r| r.date);
    let duplicate_dates = before - sorted.len();
    if duplicate_dates > 0 {
        warn!(duplicate_dates, "duplicate log dates dropped, first record kept");
    }

    let Some(latest) = sorted.last().map(|r| r.date) else {
        return Err(SegmentError::NoReadings);
    };
    let as_of = as_of.unwrap_or(latest);
    sorted.retain(|r| r.date <= as_of);
    if sorted.is_empty() {
        return Err(SegmentError::NothingBefore(as_of));
    }

    let starts = cycle_starts(&sorted, config.min_cycle_days);
    let Some(&first_start) = starts.first() else {
        return Err(SegmentError::NoPeriodStart);
    };

    let mut cycles = Vec::with_capacity(starts.len());
    for (index, &start_date) in starts.iter().enumerate() {
        let (end_date, complete) = match starts.get(index + 1) {
            Some(&next) => (next - Duration::days(1), true),
            None => (as_of, false),
        };
        let samples: Vec<CycleSample> = sorted
            .iter()
            .filter(|r| r.date >= start_date && r.date <= end_date)
            .map(|r| {
                let day = (r.date - start_date).num_days() as u32 + 1;
                CycleSample::new(day, r.temperature).with_period(r.is_period)
            })
            .collect();
        let length_days = (end_date - start_date).num_days() as u32 + 1;
        cycles.push(Cycle {
            index,
            start_date,
            end_date,
            length_days,
            complete,
            samples,
        });
    }

    let dropped_readings = sorted.iter().filter(|r| r.date < first_start).count();
    debug!(
        cycles = cycles.len(),
        dropped_readings,
        %as_of,
        "log segmented into cycles"
    );

    Ok(Segmentation {
        as_of,
        cycles,
        dropped_readings,
        duplicate_dates,
    })
}

/// Dates that open a new cycle, ascending.
fn cycle_starts(sorted: &[&DatedReading], min_cycle_days: u32) -> Vec<NaiveDate> {
    let period_dates: HashSet<NaiveDate> = sorted
        .iter()
        .filter(|r| r.is_period)
        .map(|r| r.date)
        .collect();

    let mut starts: Vec<NaiveDate> = Vec::new();
    for reading in sorted.iter().filter(|r| r.is_period) {
        let run_start = reading
            .date
            .pred_opt()
            .map_or(true, |prev| !period_dates.contains(&prev));
        if !run_start {
            continue;
        }
        let too_close = starts
            .last()
            .is_some_and(|&current| (reading.date - current).num_days() < i64::from(min_cycle_days));
        if too_close {
            debug!(date = %reading.date, "period start too close to previous cycle, ignored");
        } else {
            starts.push(reading.date);
        }
    }
    starts
}

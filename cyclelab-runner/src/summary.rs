//! Cross-cycle statistics.
//!
//! Phase lengths are calendar lengths taken from the split day, so missing
//! records do not shorten a phase: follicular = `split - 1`, luteal =
//! `length - split + 1`. Averages only use completed cycles; the running
//! cycle has no known length yet.

use serde::{Deserialize, Serialize};

use cyclelab_core::stats::finite_mean;

use crate::batch::CycleReport;

pub const DEFAULT_CYCLE_LENGTH: f64 = 28.0;
pub const DEFAULT_PHASE_LENGTH: f64 = 14.0;

/// Per-cycle numbers shown in the history table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleStats {
    pub index: usize,
    pub length_days: u32,
    pub complete: bool,
    pub ovulation_day: Option<u32>,
    pub follicular_days: u32,
    pub luteal_days: u32,
    /// Luteal minus follicular mean temperature.
    pub temperature_shift: Option<f64>,
    pub mean_temperature: Option<f64>,
}

impl CycleStats {
    pub fn from_report(report: &CycleReport) -> Self {
        let result = &report.result;
        let split = result.split.day.min(report.length_days + 1);
        let mean_temperature = finite_mean(
            result
                .follicular
                .temps
                .iter()
                .chain(&result.luteal.temps)
                .flatten()
                .copied(),
        );
        Self {
            index: report.index,
            length_days: report.length_days,
            complete: report.complete,
            ovulation_day: result.ovulation_day.day(),
            follicular_days: split.saturating_sub(1),
            luteal_days: report.length_days + 1 - split,
            temperature_shift: result.temperature_shift(),
            mean_temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistorySummary {
    pub cycle_count: usize,
    pub completed_cycles: usize,
    /// Mean length of completed cycles (28 when there are none).
    pub average_cycle_length: f64,
    /// Mean follicular length of completed cycles with a known ovulation day.
    pub average_follicular_days: f64,
    pub average_luteal_days: f64,
    pub average_temperature_shift: Option<f64>,
    pub cycles: Vec<CycleStats>,
}

/// Summarize a batch of cycle reports.
pub fn summarize(reports: &[CycleReport]) -> HistorySummary {
    let cycles: Vec<CycleStats> = reports.iter().map(CycleStats::from_report).collect();

    let completed: Vec<&CycleStats> = cycles.iter().filter(|c| c.complete).collect();
    let with_ovulation: Vec<&CycleStats> = completed
        .iter()
        .copied()
        .filter(|c| c.ovulation_day.is_some())
        .collect();

    let average_cycle_length = finite_mean(completed.iter().map(|c| f64::from(c.length_days)))
        .unwrap_or(DEFAULT_CYCLE_LENGTH);
    let average_follicular_days =
        finite_mean(with_ovulation.iter().map(|c| f64::from(c.follicular_days)))
            .unwrap_or(DEFAULT_PHASE_LENGTH);
    let average_luteal_days = finite_mean(with_ovulation.iter().map(|c| f64::from(c.luteal_days)))
        .unwrap_or(DEFAULT_PHASE_LENGTH);
    let average_temperature_shift = finite_mean(cycles.iter().filter_map(|c| c.temperature_shift));

    HistorySummary {
        cycle_count: cycles.len(),
        completed_cycles: completed.len(),
        average_cycle_length,
        average_follicular_days,
        average_luteal_days,
        average_temperature_shift,
        cycles,
    }
}

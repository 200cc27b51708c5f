//! Parallel analysis of segmented cycles.

use chrono::NaiveDate;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

use cyclelab_core::{CycleAnalyzer, CyclePhaseResult};

use crate::config::ReportConfig;
use crate::segment::Cycle;

/// Analysis of one cycle plus its calendar context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CycleReport {
    pub index: usize,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub length_days: u32,
    pub complete: bool,
    pub sample_count: usize,
    /// Cycle days without a record.
    pub missing_days: Vec<u32>,
    /// Cycle days at or above the report threshold.
    pub elevated_days: Vec<u32>,
    pub result: CyclePhaseResult,
}

impl CycleReport {
    /// Calendar date of cycle day `day`.
    pub fn date_of(&self, day: u32) -> Option<NaiveDate> {
        let offset = u64::from(day.checked_sub(1)?);
        self.start_date.checked_add_days(chrono::Days::new(offset))
    }
}

/// Analyze every cycle in parallel, preserving input order.
///
/// Cycles the analyzer rejects (no samples) are skipped with a warning.
pub fn analyze_cycles(
    cycles: &[Cycle],
    analyzer: &CycleAnalyzer,
    report: &ReportConfig,
) -> Vec<CycleReport> {
    cycles
        .par_iter()
        .filter_map(|cycle| match analyzer.analyze(&cycle.samples, None) {
            Ok(result) => Some(build_report(cycle, result, report)),
            Err(e) => {
                warn!(cycle = cycle.index, start = %cycle.start_date, error = %e, "cycle skipped");
                None
            }
        })
        .collect()
}

fn build_report(cycle: &Cycle, result: CyclePhaseResult, report: &ReportConfig) -> CycleReport {
    let elevated_days = cycle
        .samples
        .iter()
        .filter(|s| s.reading().is_some_and(|t| t >= report.elevated_threshold))
        .map(|s| s.day)
        .collect();

    CycleReport {
        index: cycle.index,
        start_date: cycle.start_date,
        end_date: cycle.end_date,
        length_days: cycle.length_days,
        complete: cycle.complete,
        sample_count: cycle.samples.len(),
        missing_days: cycle.missing_days(),
        elevated_days,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cyclelab_core::{CycleSample, DetectionMethod};

    fn cycle(index: usize, temps: &[f64]) -> Cycle {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        Cycle {
            index,
            start_date: start,
            end_date: start + chrono::Duration::days(temps.len() as i64 - 1),
            length_days: temps.len() as u32,
            complete: true,
            samples: temps
                .iter()
                .enumerate()
                .map(|(i, &t)| CycleSample::new(i as u32 + 1, t))
                .collect(),
        }
    }

    fn biphasic(len: usize, rise_day: usize) -> Vec<f64> {
        (1..=len)
            .map(|d| if d < rise_day { 97.4 } else { 98.1 })
            .collect()
    }

    #[test]
    fn preserves_order_and_detects_each_cycle() {
        let cycles: Vec<Cycle> = (0..20)
            .map(|i| cycle(i, &biphasic(26 + i % 4, 12 + i % 5)))
            .collect();
        let reports = analyze_cycles(&cycles, &CycleAnalyzer::default(), &ReportConfig::default());

        assert_eq!(reports.len(), 20);
        for (i, report) in reports.iter().enumerate() {
            assert_eq!(report.index, i);
            let rise_day = 12 + i as u32 % 5;
            assert_eq!(report.result.ovulation_day.day(), Some(rise_day - 1));
            assert_eq!(
                report.result.ovulation_day.method(),
                Some(DetectionMethod::TriphasicShift)
            );
        }
    }

    #[test]
    fn empty_cycle_is_skipped() {
        let mut empty = cycle(1, &[97.5]);
        empty.samples.clear();
        let cycles = vec![cycle(0, &biphasic(28, 14)), empty, cycle(2, &biphasic(28, 15))];
        let reports = analyze_cycles(&cycles, &CycleAnalyzer::default(), &ReportConfig::default());
        let indices: Vec<usize> = reports.iter().map(|r| r.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn elevated_and_missing_days() {
        let mut c = cycle(0, &[97.5, 98.0, f64::NAN, 98.4]);
        c.length_days = 6;
        let reports = analyze_cycles(&[c], &CycleAnalyzer::default(), &ReportConfig::default());
        assert_eq!(reports[0].elevated_days, vec![2, 4]);
        assert_eq!(reports[0].missing_days, vec![5, 6]);
        assert_eq!(
            reports[0].date_of(4),
            NaiveDate::from_ymd_opt(2024, 1, 4)
        );
        assert_eq!(reports[0].date_of(0), None);
    }
}

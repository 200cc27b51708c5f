//! History runner — wires together segmentation, batch analysis, and summary.
//!
//! Two entry points:
//! - `run_single()`: one cycle document through the analyzer. Used by `analyze`.
//! - `run_history()`: a dated log through segmentation, batch analysis and
//!   summary. Used by `history`.

use std::sync::Arc;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use cyclelab_core::{
    AnalysisError, AnalysisObserver, ConfigError, CycleAnalyzer, CycleInput, CyclePhaseResult,
};

use crate::batch::{analyze_cycles, CycleReport};
use crate::config::LabConfig;
use crate::data_loader::compute_dataset_hash;
use crate::segment::{segment_history, DatedReading, SegmentError};
use crate::summary::{summarize, HistorySummary};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("segmentation error: {0}")]
    Segment(#[from] SegmentError),
    #[error("analysis error: {0}")]
    Analysis(#[from] AnalysisError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete result of a history run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryReport {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub as_of: NaiveDate,
    /// BLAKE3 over the input readings.
    pub dataset_hash: String,
    pub reading_count: usize,
    pub dropped_readings: usize,
    pub duplicate_dates: usize,
    pub current_cycle_day: Option<u32>,
    pub config: LabConfig,
    pub cycles: Vec<CycleReport>,
    pub summary: HistorySummary,
}

/// Analyze one cycle document.
pub fn run_single(
    input: &CycleInput,
    config: &LabConfig,
    observer: Arc<dyn AnalysisObserver>,
) -> Result<CyclePhaseResult, RunError> {
    let analyzer = CycleAnalyzer::new(config.analyzer.clone())?.with_observer(observer);
    Ok(analyzer.analyze_input(input)?)
}

/// Segment a dated log into cycles and analyze all of them.
pub fn run_history(
    readings: &[DatedReading],
    as_of: Option<NaiveDate>,
    config: &LabConfig,
    observer: Arc<dyn AnalysisObserver>,
) -> Result<HistoryReport, RunError> {
    let analyzer = CycleAnalyzer::new(config.analyzer.clone())?.with_observer(observer);
    let segmentation = segment_history(readings, as_of, &config.segmentation)?;

    let cycles = analyze_cycles(&segmentation.cycles, &analyzer, &config.report);
    let summary = summarize(&cycles);

    info!(
        cycles = cycles.len(),
        completed = summary.completed_cycles,
        average_cycle_length = summary.average_cycle_length,
        "history analyzed"
    );

    Ok(HistoryReport {
        schema_version: SCHEMA_VERSION,
        as_of: segmentation.as_of,
        dataset_hash: compute_dataset_hash(readings),
        reading_count: readings.len(),
        dropped_readings: segmentation.dropped_readings,
        duplicate_dates: segmentation.duplicate_dates,
        current_cycle_day: segmentation.current_cycle_day(),
        config: config.clone(),
        cycles,
        summary,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use cyclelab_core::{CycleSample, NoopObserver};

    fn log(start: NaiveDate, lengths: &[i64]) -> Vec<DatedReading> {
        let mut readings = Vec::new();
        let mut day0 = start;
        for &len in lengths {
            for i in 0..len {
                let temp = if i < len / 2 { 97.4 } else { 98.1 };
                let mut r = DatedReading::new(day0 + Duration::days(i), temp);
                r.is_period = i < 4;
                readings.push(r);
            }
            day0 += Duration::days(len);
        }
        readings
    }

    #[test]
    fn history_run_end_to_end() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let readings = log(start, &[28, 30, 26, 12]);
        let report =
            run_history(&readings, None, &LabConfig::default(), Arc::new(NoopObserver)).unwrap();

        assert_eq!(report.schema_version, SCHEMA_VERSION);
        assert_eq!(report.cycles.len(), 4);
        assert_eq!(report.summary.completed_cycles, 3);
        assert_eq!(report.summary.average_cycle_length, 28.0);
        assert_eq!(report.current_cycle_day, Some(12));
        assert_eq!(report.reading_count, 96);
        assert_eq!(report.dataset_hash, compute_dataset_hash(&readings));
    }

    #[test]
    fn invalid_config_is_reported() {
        let mut config = LabConfig::default();
        config.analyzer.mean_shift.window_days = 0;
        let err = run_single(
            &CycleInput::new(vec![CycleSample::new(1, 97.5)]),
            &config,
            Arc::new(NoopObserver),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn empty_document_is_no_data() {
        let err = run_single(
            &CycleInput::new(Vec::new()),
            &LabConfig::default(),
            Arc::new(NoopObserver),
        )
        .unwrap_err();
        assert!(matches!(err, RunError::Analysis(AnalysisError::NoData)));
    }

    #[test]
    fn log_without_periods_fails() {
        let readings: Vec<DatedReading> = (0..20)
            .map(|i| {
                DatedReading::new(
                    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(i),
                    97.5,
                )
            })
            .collect();
        let err = run_history(&readings, None, &LabConfig::default(), Arc::new(NoopObserver))
            .unwrap_err();
        assert!(matches!(err, RunError::Segment(SegmentError::NoPeriodStart)));
    }
}

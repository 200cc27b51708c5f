//! Load -> segment -> analyze -> export, through the filesystem.

use std::fmt::Write as _;
use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use cyclelab_core::{AnalysisEvent, CollectingObserver, DetectionMethod, NoopObserver};
use cyclelab_runner::export::{export_json, import_json, load_report, save_report};
use cyclelab_runner::{load_cycle_file, load_history_csv, run_history, run_single, LabConfig};

/// Three 28-day cycles and a running 9-day one, with a rise on day 15.
fn history_csv() -> String {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    let mut csv = String::from("date,temperature,is_period\n");
    let mut offset = 0;
    for len in [28, 28, 28, 9] {
        for day in 1..=len {
            let date = start + Duration::days(offset + day - 1);
            let temp = if day < 15 { "97.40" } else { "98.10" };
            let period = if day <= 5 { "1" } else { "" };
            writeln!(csv, "{date},{temp},{period}").unwrap();
        }
        offset += len;
    }
    csv
}

#[test]
fn history_csv_to_report_bundle() {
    let dir = tempfile::tempdir().unwrap();
    let log_path = dir.path().join("log.csv");
    std::fs::write(&log_path, history_csv()).unwrap();

    let readings = load_history_csv(&log_path).unwrap();
    assert_eq!(readings.len(), 93);

    let report =
        run_history(&readings, None, &LabConfig::default(), Arc::new(NoopObserver)).unwrap();
    assert_eq!(report.cycles.len(), 4);
    assert_eq!(report.current_cycle_day, Some(9));
    assert_eq!(report.summary.average_cycle_length, 28.0);
    for cycle in report.cycles.iter().take(3) {
        assert_eq!(cycle.result.ovulation_day.day(), Some(14));
        assert_eq!(
            cycle.result.ovulation_day.method(),
            Some(DetectionMethod::TriphasicShift)
        );
        assert_eq!(cycle.elevated_days.len(), 14);
        assert!(cycle.missing_days.is_empty());
    }
    // Running cycle: 9 samples, flat, before day 10 -> no estimate.
    assert!(!report.cycles[3].result.ovulation_day.is_known());
    assert!(report.cycles[3].result.split.estimated);

    let out = dir.path().join("out");
    let bundle = save_report(&report, &out).unwrap();
    assert!(bundle.join("report.json").exists());
    assert!(bundle.join("cycles.csv").exists());
    assert!(bundle.join("current_cycle.csv").exists());

    let cycles_csv = std::fs::read_to_string(bundle.join("cycles.csv")).unwrap();
    assert_eq!(cycles_csv.lines().count(), 5);
    let first = cycles_csv.lines().nth(1).unwrap();
    assert!(
        first.starts_with("0,2024-01-01,2024-01-28,28,true,14,triphasic_shift,14,false,13,15,"),
        "unexpected row: {first}"
    );

    let loaded = load_report(&bundle).unwrap();
    assert_eq!(loaded.dataset_hash, report.dataset_hash);
    assert_eq!(loaded.cycles.len(), report.cycles.len());
    let days = |r: &cyclelab_runner::HistoryReport| -> Vec<Option<u32>> {
        r.cycles.iter().map(|c| c.result.ovulation_day.day()).collect()
    };
    assert_eq!(days(&loaded), days(&report));
}

#[test]
fn newer_schema_version_is_rejected() {
    let readings = load_history_csv_from_str(&history_csv());
    let mut report =
        run_history(&readings, None, &LabConfig::default(), Arc::new(NoopObserver)).unwrap();
    report.schema_version = 99;
    let json = export_json(&report).unwrap();
    let err = import_json(&json).unwrap_err();
    assert!(err.to_string().contains("unsupported schema version 99"));
}

#[test]
fn cycle_json_override_flows_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycle.json");
    let samples: Vec<String> = (1..=12)
        .map(|d| format!(r#"{{"day":{d},"temperature":97.5}}"#))
        .collect();
    std::fs::write(
        &path,
        format!(r#"{{"samples":[{}],"ovulation_day":9}}"#, samples.join(",")),
    )
    .unwrap();

    let input = load_cycle_file(&path).unwrap();
    assert_eq!(input.ovulation_day, Some(9));

    let observer = Arc::new(CollectingObserver::new());
    let result = run_single(&input, &LabConfig::default(), observer.clone()).unwrap();
    assert_eq!(result.ovulation_day.method(), Some(DetectionMethod::Override));
    assert_eq!(result.fertile_window.days, vec![4, 5, 6, 7, 8, 9, 10]);
    assert!(!observer.events().is_empty());
}

#[test]
fn cycle_json_with_null_temperature_still_partitions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycle.json");
    std::fs::write(
        &path,
        r#"{"samples":[{"day":1,"temperature":97.4},{"day":2,"temperature":null},{"day":3,"temperature":"n/a"},{"day":4,"temperature":97.6}]}"#,
    )
    .unwrap();

    let input = load_cycle_file(&path).unwrap();
    assert_eq!(input.samples.len(), 4);

    let observer = Arc::new(CollectingObserver::new());
    let result = run_single(&input, &LabConfig::default(), observer.clone()).unwrap();
    // 4 samples, last day 4 -> split 2.
    assert_eq!(result.follicular.days, vec![1]);
    assert_eq!(result.luteal.days, vec![2, 3, 4]);
    assert_eq!(result.luteal.temps, vec![None, None, Some(97.6)]);
    assert!(observer
        .events()
        .contains(&AnalysisEvent::MalformedTemperature { day: 3 }));
}

#[test]
fn cycle_csv_with_gaps() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cycle.csv");
    std::fs::write(&path, "day,temperature\n1,97.4\n2,\n3,97.5\n5,97.6\n").unwrap();

    let input = load_cycle_file(&path).unwrap();
    let result = run_single(&input, &LabConfig::default(), Arc::new(NoopObserver)).unwrap();
    // 4 samples, last day 5 -> split round(5/2) = 3.
    assert_eq!(result.split.day, 3);
    assert_eq!(result.follicular.days, vec![1, 2]);
    assert_eq!(result.follicular.temps, vec![Some(97.4), None]);
    assert_eq!(result.luteal.days, vec![3, 5]);
}

fn load_history_csv_from_str(text: &str) -> Vec<cyclelab_runner::DatedReading> {
    cyclelab_runner::data_loader::parse_history_csv(text.as_bytes()).unwrap()
}

//! Report export — JSON and CSV artifacts.
//!
//! Provides two export formats for history reports:
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: one row per cycle, and one row per day for a single cycle
//!
//! Persisted reports carry a `schema_version` field. Newer versions are
//! rejected on load.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::info;

use cyclelab_core::CyclePhaseResult;

use crate::runner::{HistoryReport, SCHEMA_VERSION};
use crate::summary::CycleStats;

// ─── JSON export ────────────────────────────────────────────────────

pub fn export_json(report: &HistoryReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize HistoryReport to JSON")
}

/// Deserialize a `HistoryReport`, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<HistoryReport> {
    let report: HistoryReport =
        serde_json::from_str(json).context("failed to deserialize HistoryReport from JSON")?;
    if report.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            report.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(report)
}

// ─── CSV export ─────────────────────────────────────────────────────

fn opt(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.3}")).unwrap_or_default()
}

/// One row per cycle.
///
/// Columns: index, start_date, end_date, length_days, complete, ovulation_day,
/// method, split_day, split_estimated, follicular_days, luteal_days,
/// follicular_average, luteal_average, temperature_shift, missing_days, elevated_days
pub fn export_cycles_csv(report: &HistoryReport) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record([
        "index",
        "start_date",
        "end_date",
        "length_days",
        "complete",
        "ovulation_day",
        "method",
        "split_day",
        "split_estimated",
        "follicular_days",
        "luteal_days",
        "follicular_average",
        "luteal_average",
        "temperature_shift",
        "missing_days",
        "elevated_days",
    ])?;

    for cycle in &report.cycles {
        let stats = CycleStats::from_report(cycle);
        let result = &cycle.result;
        wtr.write_record([
            cycle.index.to_string(),
            cycle.start_date.to_string(),
            cycle.end_date.to_string(),
            cycle.length_days.to_string(),
            cycle.complete.to_string(),
            result
                .ovulation_day
                .day()
                .map(|d| d.to_string())
                .unwrap_or_default(),
            result
                .ovulation_day
                .method()
                .map(|m| m.as_str().to_string())
                .unwrap_or_default(),
            result.split.day.to_string(),
            result.split.estimated.to_string(),
            stats.follicular_days.to_string(),
            stats.luteal_days.to_string(),
            format!("{:.3}", result.follicular.average),
            format!("{:.3}", result.luteal.average),
            opt(stats.temperature_shift),
            cycle.missing_days.len().to_string(),
            cycle.elevated_days.len().to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// One row per recorded day of a single cycle, tagged with its phase.
///
/// Columns: day, temperature, phase, fertile
pub fn export_phase_days_csv(result: &CyclePhaseResult) -> Result<String> {
    let mut rows: Vec<(u32, Option<f64>, &str)> = result
        .follicular
        .days
        .iter()
        .zip(&result.follicular.temps)
        .map(|(&d, &t)| (d, t, "follicular"))
        .chain(
            result
                .luteal
                .days
                .iter()
                .zip(&result.luteal.temps)
                .map(|(&d, &t)| (d, t, "luteal")),
        )
        .collect();
    rows.sort_by_key(|r| r.0);

    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["day", "temperature", "phase", "fertile"])?;
    for (day, temp, phase) in rows {
        wtr.write_record([
            day.to_string(),
            opt(temp),
            phase.to_string(),
            result.fertile_window.contains(day).to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Report bundle ──────────────────────────────────────────────────

/// Save the full artifact set for a history run.
///
/// Creates a directory named `history_{as_of}_{hash8}/` under `output_dir`
/// containing:
/// - `report.json` — the full `HistoryReport`
/// - `cycles.csv` — one row per cycle
/// - `current_cycle.csv` — per-day phases of the last cycle
///
/// Returns the path to the created directory.
pub fn save_report(report: &HistoryReport, output_dir: &Path) -> Result<PathBuf> {
    let short_hash: String = report.dataset_hash.chars().take(8).collect();
    let run_dir = output_dir.join(format!("history_{}_{}", report.as_of, short_hash));
    std::fs::create_dir_all(&run_dir)
        .with_context(|| format!("failed to create report dir: {}", run_dir.display()))?;

    write(&run_dir.join("report.json"), &export_json(report)?)?;
    write(&run_dir.join("cycles.csv"), &export_cycles_csv(report)?)?;
    if let Some(last) = report.cycles.last() {
        write(
            &run_dir.join("current_cycle.csv"),
            &export_phase_days_csv(&last.result)?,
        )?;
    }

    info!(dir = %run_dir.display(), "report saved");
    Ok(run_dir)
}

/// Load a `HistoryReport` from a bundle directory.
pub fn load_report(dir: &Path) -> Result<HistoryReport> {
    let path = dir.join("report.json");
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

fn write(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

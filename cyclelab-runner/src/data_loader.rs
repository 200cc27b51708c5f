//! Loading cycle data from disk.
//!
//! Three input shapes are accepted:
//! 1. Single-cycle CSV with `day,temperature[,is_period]` columns
//! 2. Dated log CSV with `date,temperature[,is_period]` columns (`YYYY-MM-DD`)
//! 3. JSON provider document: `{"samples": [...], "ovulation_day": 14}`
//!
//! An empty or non-numeric temperature cell loads as a malformed sample (NaN)
//! so that the day still counts for partitioning.

use std::io::Read;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use cyclelab_core::domain::{lenient_temperature, missing_temperature};
use cyclelab_core::{CycleInput, CycleSample};

use crate::segment::DatedReading;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to open {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error("unsupported file type for {} (expected .csv or .json)", .path.display())]
    UnsupportedFormat { path: PathBuf },
}

#[derive(Debug, Deserialize)]
struct DayRow {
    day: u32,
    #[serde(
        default = "missing_temperature",
        deserialize_with = "lenient_temperature"
    )]
    temperature: f64,
    #[serde(default)]
    is_period: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DatedRow {
    date: String,
    #[serde(
        default = "missing_temperature",
        deserialize_with = "lenient_temperature"
    )]
    temperature: f64,
    #[serde(default)]
    is_period: Option<String>,
}

/// Parse a period flag cell. Empty means no period.
fn parse_flag(cell: Option<&str>, row: usize) -> Result<bool, LoadError> {
    match cell.map(str::trim).unwrap_or("") {
        "" | "0" | "false" | "no" | "n" => Ok(false),
        "1" | "true" | "yes" | "y" | "x" => Ok(true),
        other => Err(LoadError::InvalidRow {
            row,
            reason: format!("invalid is_period value '{other}'"),
        }),
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn open(path: &Path) -> Result<std::fs::File, LoadError> {
    std::fs::File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse a single-cycle CSV (`day,temperature[,is_period]`).
pub fn parse_cycle_csv<R: Read>(reader: R) -> Result<Vec<CycleSample>, LoadError> {
    let mut rdr = csv_reader(reader);
    let mut samples = Vec::new();
    for (i, row) in rdr.deserialize::<DayRow>().enumerate() {
        let row_no = i + 1;
        let row = row?;
        if row.day == 0 {
            return Err(LoadError::InvalidRow {
                row: row_no,
                reason: "cycle days start at 1".into(),
            });
        }
        let is_period = parse_flag(row.is_period.as_deref(), row_no)?;
        samples.push(
            CycleSample::new(row.day, row.temperature).with_period(is_period),
        );
    }
    Ok(samples)
}

/// Parse a dated log CSV (`date,temperature[,is_period]`).
pub fn parse_history_csv<R: Read>(reader: R) -> Result<Vec<DatedReading>, LoadError> {
    let mut rdr = csv_reader(reader);
    let mut readings = Vec::new();
    for (i, row) in rdr.deserialize::<DatedRow>().enumerate() {
        let row_no = i + 1;
        let row = row?;
        let date = NaiveDate::parse_from_str(&row.date, "%Y-%m-%d").map_err(|e| {
            LoadError::InvalidRow {
                row: row_no,
                reason: format!("invalid date '{}': {e}", row.date),
            }
        })?;
        let is_period = parse_flag(row.is_period.as_deref(), row_no)?;
        readings.push(DatedReading {
            date,
            temperature: row.temperature,
            is_period,
        });
    }
    Ok(readings)
}

pub fn load_cycle_csv(path: &Path) -> Result<Vec<CycleSample>, LoadError> {
    let samples = parse_cycle_csv(open(path)?)?;
    debug!(path = %path.display(), samples = samples.len(), "loaded cycle CSV");
    Ok(samples)
}

pub fn load_history_csv(path: &Path) -> Result<Vec<DatedReading>, LoadError> {
    let readings = parse_history_csv(open(path)?)?;
    debug!(path = %path.display(), readings = readings.len(), "loaded history CSV");
    Ok(readings)
}

pub fn load_cycle_json(path: &Path) -> Result<CycleInput, LoadError> {
    let input: CycleInput = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    debug!(
        path = %path.display(),
        samples = input.samples.len(),
        ovulation_day = ?input.ovulation_day,
        "loaded cycle JSON"
    );
    Ok(input)
}

/// Load a single cycle from `.csv` or `.json`, chosen by extension.
pub fn load_cycle_file(path: &Path) -> Result<CycleInput, LoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match ext.as_deref() {
        Some("csv") => Ok(CycleInput::new(load_cycle_csv(path)?)),
        Some("json") => load_cycle_json(path),
        _ => Err(LoadError::UnsupportedFormat {
            path: path.to_path_buf(),
        }),
    }
}

/// Dataset hash for provenance (BLAKE3 over the readings in date order).
pub fn compute_dataset_hash(readings: &[DatedReading]) -> String {
    let mut sorted: Vec<&DatedReading> = readings.iter().collect();
    sorted.sort_by_key(|r| r.date);

    let mut hasher = blake3::Hasher::new();
    for r in sorted {
        hasher.update(r.date.to_string().as_bytes());
        hasher.update(&r.temperature.to_le_bytes());
        hasher.update(&[u8::from(r.is_period)]);
    }
    hasher.finalize().to_hex().to_string()
}

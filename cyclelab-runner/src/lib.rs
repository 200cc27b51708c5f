//! CycleLab Runner — history loading, cycle segmentation, batch analysis, reports.
//!
//! This crate builds on `cyclelab-core` to provide:
//! - CSV/JSON loading for single cycles and dated temperature logs
//! - Segmentation of a dated log into cycles at period starts
//! - Parallel batch analysis of every cycle with one shared analyzer
//! - Cross-cycle summary statistics
//! - JSON/CSV export with schema versioning and a dataset hash
//! - TOML lab configuration

pub mod batch;
pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod segment;
pub mod summary;

pub use batch::{analyze_cycles, CycleReport};
pub use config::{LabConfig, LabConfigError, ReportConfig};
pub use data_loader::{
    compute_dataset_hash, load_cycle_file, load_history_csv, LoadError,
};
pub use runner::{run_history, run_single, HistoryReport, RunError, SCHEMA_VERSION};
pub use segment::{segment_history, Cycle, DatedReading, SegmentConfig, SegmentError, Segmentation};
pub use summary::{summarize, CycleStats, HistorySummary};

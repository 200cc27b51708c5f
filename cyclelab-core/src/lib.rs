//! CycleLab Core — ovulation detection and cycle phase partitioning.
//!
//! This crate is pure and synchronous:
//! - Domain types (samples, provider documents, phase groups, results)
//! - Ovulation detector chain with an external override and three fallbacks
//! - Phase partitioner with fertile window and fallback averages
//! - Analyzer configuration and an injected observer for diagnostics

pub mod analyzer;
pub mod config;
pub mod detection;
pub mod domain;
pub mod error;
pub mod observer;
pub mod partition;
pub mod stats;

pub use analyzer::CycleAnalyzer;
pub use config::{AnalyzerConfig, ConfigError};
pub use detection::{detect_ovulation_day, DetectorChain, OvulationDetector};
pub use domain::{
    CycleInput, CyclePhaseResult, CycleSample, DetectionMethod, FertileWindow, OvulationDay,
    PhaseGroup, PhaseSplit,
};
pub use error::AnalysisError;
pub use observer::{
    AnalysisEvent, AnalysisObserver, CollectingObserver, NoopObserver, TracingObserver,
};
pub use partition::{estimated_split_day, partition_phases};

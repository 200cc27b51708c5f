//! Domain types for CycleLab

pub mod phase;
pub mod sample;

pub use phase::{
    CyclePhaseResult, DetectionMethod, FertileWindow, OvulationDay, PhaseGroup, PhaseSplit,
};
pub use sample::{
    lenient_temperature, missing_temperature, CycleInput, CycleSample, NormalizedCycle,
};

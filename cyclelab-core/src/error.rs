//! Analysis errors.
//!
//! Normal data variability (short cycles, missing temperatures, empty phases)
//! never produces an error; the analyzer degrades to a best-effort result.
//! Only an input with nothing to analyze is rejected.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("no data to analyze: the cycle has no samples")]
    NoData,
}

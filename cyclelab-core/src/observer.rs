//! Analysis diagnostics — an observer the caller injects.
//!
//! The analyzer never prints or logs on its own. It describes what it did as
//! [`AnalysisEvent`]s and hands them to an [`AnalysisObserver`]. Callers pick
//! the sink: [`TracingObserver`] forwards to `tracing`, [`CollectingObserver`]
//! keeps the events in memory, [`NoopObserver`] drops them.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::domain::{DetectionMethod, NormalizedCycle};

/// One diagnostic event emitted during an analysis run.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisEvent {
    /// Input was not in ascending day order and has been sorted.
    SamplesReordered { count: usize },
    /// A second sample for the same day was dropped.
    DuplicateDay { day: u32 },
    /// Temperature is missing or non-finite; the day is kept, the value ignored.
    MalformedTemperature { day: u32 },
    /// Too few samples for any heuristic.
    InsufficientData { samples: usize, required: usize },
    OverrideApplied { day: u32 },
    /// Override of day 0 is not a cycle day.
    OverrideIgnored { day: u32 },
    /// A temperature-based detector fired. `baseline` is the pre-rise mean,
    /// `observed` the first elevated value (triphasic) or post-rise mean (mean shift).
    ShiftDetected {
        method: DetectionMethod,
        rise_day: u32,
        ovulation_day: u32,
        baseline: f64,
        observed: f64,
    },
    OvulationEstimated { last_day: u32, day: u32 },
    OvulationUnknown { last_day: Option<u32> },
    SplitEstimated { last_day: Option<u32>, split_day: u32 },
    PhasesPartitioned {
        split_day: u32,
        follicular: usize,
        luteal: usize,
        fertile: usize,
    },
}

/// Sink for analysis diagnostics.
///
/// Called inline on the analyzing thread, so implementations should be cheap.
pub trait AnalysisObserver: Send + Sync {
    fn on_event(&self, event: &AnalysisEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl AnalysisObserver for NoopObserver {
    fn on_event(&self, _event: &AnalysisEvent) {}
}

/// Forwards events to `tracing` as structured records.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl AnalysisObserver for TracingObserver {
    fn on_event(&self, event: &AnalysisEvent) {
        match *event {
            AnalysisEvent::SamplesReordered { count } => {
                debug!(count, "samples were not in day order, sorted");
            }
            AnalysisEvent::DuplicateDay { day } => {
                warn!(day, "duplicate cycle day dropped");
            }
            AnalysisEvent::MalformedTemperature { day } => {
                warn!(day, "temperature missing or not finite, excluded from averages");
            }
            AnalysisEvent::InsufficientData { samples, required } => {
                debug!(samples, required, "not enough samples to detect ovulation");
            }
            AnalysisEvent::OverrideApplied { day } => {
                debug!(day, "using externally supplied ovulation day");
            }
            AnalysisEvent::OverrideIgnored { day } => {
                warn!(day, "ignoring ovulation day override outside the cycle");
            }
            AnalysisEvent::ShiftDetected {
                method,
                rise_day,
                ovulation_day,
                baseline,
                observed,
            } => {
                info!(
                    method = method.as_str(),
                    rise_day,
                    ovulation_day,
                    baseline,
                    observed,
                    "temperature shift detected"
                );
            }
            AnalysisEvent::OvulationEstimated { last_day, day } => {
                debug!(last_day, day, "ovulation day estimated from cycle length");
            }
            AnalysisEvent::OvulationUnknown { last_day } => {
                debug!(?last_day, "ovulation day could not be determined");
            }
            AnalysisEvent::SplitEstimated {
                last_day,
                split_day,
            } => {
                debug!(?last_day, split_day, "using estimated phase split");
            }
            AnalysisEvent::PhasesPartitioned {
                split_day,
                follicular,
                luteal,
                fertile,
            } => {
                debug!(split_day, follicular, luteal, fertile, "phases partitioned");
            }
        }
    }
}

/// Records every event, in order.
#[derive(Debug, Default)]
pub struct CollectingObserver {
    events: Mutex<Vec<AnalysisEvent>>,
}

impl CollectingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<AnalysisEvent> {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clear();
    }
}

impl AnalysisObserver for CollectingObserver {
    fn on_event(&self, event: &AnalysisEvent) {
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(event.clone());
    }
}

/// Tell `observer` what normalization did to the raw samples.
pub(crate) fn report_normalization(cycle: &NormalizedCycle, observer: &dyn AnalysisObserver) {
    if cycle.was_reordered() {
        observer.on_event(&AnalysisEvent::SamplesReordered { count: cycle.len() });
    }
    for &day in cycle.duplicate_days() {
        observer.on_event(&AnalysisEvent::DuplicateDay { day });
    }
    for day in cycle.malformed_days() {
        observer.on_event(&AnalysisEvent::MalformedTemperature { day });
    }
}

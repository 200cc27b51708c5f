//! Cycle analyzer — detection plus partitioning behind one call.

use std::sync::Arc;

use crate::config::{AnalyzerConfig, ConfigError};
use crate::detection::DetectorChain;
use crate::domain::{CycleInput, CyclePhaseResult, CycleSample, NormalizedCycle};
use crate::error::AnalysisError;
use crate::observer::{report_normalization, AnalysisObserver, NoopObserver};
use crate::partition::partition_cycle;

/// Analyzes one cycle at a time.
///
/// Holds only immutable configuration and a shared observer, so one analyzer
/// can be used from many threads at once.
pub struct CycleAnalyzer {
    config: AnalyzerConfig,
    chain: DetectorChain,
    observer: Arc<dyn AnalysisObserver>,
}

impl CycleAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let chain = DetectorChain::from_config(&config);
        Ok(Self {
            config,
            chain,
            observer: Arc::new(NoopObserver),
        })
    }

    /// Replace the default no-op observer.
    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Detect ovulation and partition the cycle's days by phase.
    ///
    /// `override_day` is the externally supplied ovulation day, if any. Only an
    /// empty sample list is an error; everything else degrades to a
    /// best-effort result.
    pub fn analyze(
        &self,
        samples: &[CycleSample],
        override_day: Option<u32>,
    ) -> Result<CyclePhaseResult, AnalysisError> {
        if samples.is_empty() {
            return Err(AnalysisError::NoData);
        }

        let observer = self.observer.as_ref();
        let cycle = NormalizedCycle::from_samples(samples);
        report_normalization(&cycle, observer);

        let ovulation = self.chain.detect(&cycle, override_day, observer);
        Ok(partition_cycle(&cycle, &ovulation, &self.config, observer))
    }

    /// Analyze a provider document, using its ovulation day as the override.
    pub fn analyze_input(&self, input: &CycleInput) -> Result<CyclePhaseResult, AnalysisError> {
        self.analyze(&input.samples, input.ovulation_day)
    }
}

impl Default for CycleAnalyzer {
    fn default() -> Self {
        Self {
            config: AnalyzerConfig::default(),
            chain: DetectorChain::from_config(&AnalyzerConfig::default()),
            observer: Arc::new(NoopObserver),
        }
    }
}

impl std::fmt::Debug for CycleAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CycleAnalyzer")
            .field("config", &self.config)
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

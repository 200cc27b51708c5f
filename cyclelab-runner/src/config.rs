//! Lab configuration loaded from TOML.
//!
//! ```toml
//! [analyzer]
//! min_samples = 8
//!
//! [analyzer.triphasic]
//! rise_threshold = 0.25
//!
//! [segmentation]
//! min_cycle_days = 12
//!
//! [report]
//! elevated_threshold = 98.0
//! ```
//!
//! Every table and key is optional; missing values take their defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use cyclelab_core::{AnalyzerConfig, ConfigError};

use crate::segment::SegmentConfig;

/// Errors from loading or validating a [`LabConfig`].
#[derive(Debug, Error)]
pub enum LabConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("analyzer config: {0}")]
    Analyzer(#[from] ConfigError),
    #[error("invalid config field '{field}': {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Top-level configuration for history runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabConfig {
    pub analyzer: AnalyzerConfig,
    pub segmentation: SegmentConfig,
    pub report: ReportConfig,
}

/// Per-cycle report settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Days at or above this temperature (°F) are listed as elevated.
    pub elevated_threshold: f64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            elevated_threshold: 98.0,
        }
    }
}

impl LabConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml(text: &str) -> Result<Self, LabConfigError> {
        let config: LabConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, LabConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| LabConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text)
    }

    pub fn validate(&self) -> Result<(), LabConfigError> {
        self.analyzer.validate()?;
        if self.segmentation.min_cycle_days == 0 {
            return Err(LabConfigError::Invalid {
                field: "segmentation.min_cycle_days",
                reason: "must be >= 1".into(),
            });
        }
        if !self.report.elevated_threshold.is_finite() {
            return Err(LabConfigError::Invalid {
                field: "report.elevated_threshold",
                reason: format!("{} is not finite", self.report.elevated_threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let config = LabConfig::from_toml("").unwrap();
        assert_eq!(config, LabConfig::default());
    }

    #[test]
    fn nested_analyzer_keys_override_defaults() {
        let config = LabConfig::from_toml(
            r#"
            [analyzer]
            min_samples = 10

            [analyzer.triphasic]
            rise_threshold = 0.25

            [segmentation]
            min_cycle_days = 12
            "#,
        )
        .unwrap();
        assert_eq!(config.analyzer.min_samples, 10);
        assert_eq!(config.analyzer.triphasic.rise_threshold, 0.25);
        assert_eq!(config.analyzer.triphasic.baseline_days, 6);
        assert_eq!(config.segmentation.min_cycle_days, 12);
        assert_eq!(config.report.elevated_threshold, 98.0);
    }

    #[test]
    fn invalid_analyzer_section_is_rejected() {
        let err = LabConfig::from_toml(
            r#"
            [analyzer]
            detection_min_day = 25
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, LabConfigError::Analyzer(_)));
    }

    #[test]
    fn zero_cycle_length_is_rejected() {
        let err = LabConfig::from_toml("[segmentation]\nmin_cycle_days = 0\n").unwrap_err();
        assert!(err.to_string().contains("segmentation.min_cycle_days"));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = LabConfig::from_toml("[analyzer\nmin_samples = ").unwrap_err();
        assert!(matches!(err, LabConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LabConfig::from_file(Path::new("/nonexistent/cyclelab.toml")).unwrap_err();
        assert!(matches!(err, LabConfigError::Io { .. }));
    }
}

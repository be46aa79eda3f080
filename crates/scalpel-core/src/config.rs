//! Pipeline configuration
//!
//! Every empirical constant used by the pipeline lives here as a named,
//! overridable value. A TOML file only needs to name what it changes:
//!
//! ```toml
//! [classifier]
//! base_confidence = 0.6
//!
//! [recovery]
//! enabled = false
//! ```

use crate::error::ConfigError;
use scalpel_intent::ClassifierConfig;
use scalpel_search::{SearchConfig, TargetingConfig};
use scalpel_stream::{DependencyConfig, TruncationConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Truncation recovery settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RecoveryConfig {
    /// Whether flagged files are re-generated
    pub enabled: bool,
    /// Recovery calls in flight at once; each targets a different file
    pub concurrency: usize,
    /// Time budget per recovery call
    pub timeout_secs: u64,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            concurrency: 1,
            timeout_secs: 120,
        }
    }
}

impl RecoveryConfig {
    /// Disabled recovery
    #[inline]
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Per-call timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Oracle call budgets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Time budget for the planning call
    pub planning_timeout_secs: u64,
    /// Time budget for opening the generation stream
    pub generation_connect_timeout_secs: u64,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            planning_timeout_secs: 60,
            generation_connect_timeout_secs: 30,
        }
    }
}

/// Aggregate pipeline configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditConfig {
    /// Intent classifier weights
    pub classifier: ClassifierConfig,
    /// Search executor settings
    pub search: SearchConfig,
    /// Confidence for search-derived targets
    pub targeting: TargetingConfig,
    /// Truncation thresholds
    pub truncation: TruncationConfig,
    /// Recovery policy
    pub recovery: RecoveryConfig,
    /// Dependency extraction
    pub dependencies: DependencyConfig,
    /// Oracle call budgets
    pub oracle: OracleConfig,
}

impl EditConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse TOML
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// With classifier weights
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: ClassifierConfig) -> Self {
        self.classifier = classifier;
        self
    }

    /// With recovery policy
    #[inline]
    #[must_use]
    pub fn with_recovery(mut self, recovery: RecoveryConfig) -> Self {
        self.recovery = recovery;
        self
    }

    /// With truncation thresholds
    #[inline]
    #[must_use]
    pub fn with_truncation(mut self, truncation: TruncationConfig) -> Self {
        self.truncation = truncation;
        self
    }

    /// With oracle budgets
    #[inline]
    #[must_use]
    pub fn with_oracle(mut self, oracle: OracleConfig) -> Self {
        self.oracle = oracle;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = EditConfig::from_toml_str(
            "[classifier]\nbase_confidence = 0.6\n\n[recovery]\nenabled = false\n",
        )
        .unwrap();
        assert!((config.classifier.base_confidence - 0.6).abs() < f64::EPSILON);
        assert!((config.classifier.default_confidence - 0.3).abs() < f64::EPSILON);
        assert!(!config.recovery.enabled);
        assert_eq!(config.recovery.concurrency, 1);
        assert_eq!(config.search.context_lines, 3);
        assert_eq!(config.truncation.brace_tolerance, 3);
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[targeting]\nhigh_confidence = 0.9").unwrap();
        let config = EditConfig::load(file.path()).unwrap();
        assert!((config.targeting.high_confidence - 0.9).abs() < f64::EPSILON);
        assert!((config.targeting.default_confidence - 0.85).abs() < f64::EPSILON);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EditConfig::load("/nonexistent/scalpel.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/scalpel.toml"));
    }

    #[test]
    fn invalid_toml_is_rejected() {
        assert!(matches!(
            EditConfig::from_toml_str("[recovery]\nenabled = \"maybe\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn serialized_defaults_parse_back() {
        let text = toml::to_string(&EditConfig::default()).unwrap();
        assert_eq!(EditConfig::from_toml_str(&text).unwrap(), EditConfig::default());
    }
}

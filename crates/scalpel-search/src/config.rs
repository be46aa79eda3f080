//! Search and targeting configuration

use serde::{Deserialize, Serialize};

/// Executor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Lines of context captured before and after each match
    pub context_lines: usize,
    /// Extensions scanned when a plan carries no file-type filter
    pub default_file_types: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            context_lines: 3,
            default_file_types: ["jsx", "tsx", "js", "ts"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SearchConfig {
    /// With context window size
    #[inline]
    #[must_use]
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }
}

/// Intent confidence assigned to search-derived targets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetingConfig {
    /// Confidence when the selected evidence is high confidence
    pub high_confidence: f64,
    /// Confidence for any other selected evidence
    pub default_confidence: f64,
}

impl Default for TargetingConfig {
    fn default() -> Self {
        Self {
            high_confidence: 0.95,
            default_confidence: 0.85,
        }
    }
}

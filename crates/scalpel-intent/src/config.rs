//! Classifier confidence weights
//!
//! The values are empirical and kept overridable rather than inlined.

use serde::{Deserialize, Serialize};

/// Confidence weights for intent classification
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Confidence when no rule matches
    pub default_confidence: f64,
    /// Starting confidence for a matched rule
    pub base_confidence: f64,
    /// Bonus when a concrete target file was found
    pub target_bonus: f64,
    /// Bonus when the prompt is longer than `verbose_word_threshold` words
    pub verbose_bonus: f64,
    /// Word count above which `verbose_bonus` applies
    pub verbose_word_threshold: usize,
    /// Bonus when the winning pattern spans the whole prompt
    pub exact_match_bonus: f64,
    /// Upper bound on the final confidence
    pub max_confidence: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            default_confidence: 0.3,
            base_confidence: 0.5,
            target_bonus: 0.2,
            verbose_bonus: 0.1,
            verbose_word_threshold: 5,
            exact_match_bonus: 0.2,
            max_confidence: 1.0,
        }
    }
}

impl ClassifierConfig {
    /// Create default weights
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Combine the weights for one matched rule
    #[must_use]
    pub fn score(&self, concrete_target: bool, word_count: usize, exact: bool) -> f64 {
        let mut confidence = self.base_confidence;
        if concrete_target {
            confidence += self.target_bonus;
        }
        if word_count > self.verbose_word_threshold {
            confidence += self.verbose_bonus;
        }
        if exact {
            confidence += self.exact_match_bonus;
        }
        confidence.min(self.max_confidence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_score_without_bonuses() {
        let config = ClassifierConfig::new();
        assert!((config.score(false, 3, false) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn all_bonuses_are_capped() {
        let config = ClassifierConfig::new();
        assert!((config.score(true, 12, true) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn word_threshold_is_exclusive() {
        let config = ClassifierConfig::new();
        assert!((config.score(false, 5, false) - 0.5).abs() < f64::EPSILON);
        assert!((config.score(false, 6, false) - 0.6).abs() < 1e-9);
    }
}

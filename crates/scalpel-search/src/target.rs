//! Edit target selection
//!
//! Narrows ranked evidence to the single location the generation oracle is
//! asked to edit.

use crate::config::TargetingConfig;
use crate::executor::{MatchConfidence, SearchResult};
use once_cell::sync::Lazy;
use regex::Regex;
use scalpel_model::{is_component_source, EditAction, EditType};
use serde::{Deserialize, Serialize};

static ELEMENT_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[A-Za-z]").unwrap());

/// Selected edit location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditTarget {
    /// File to edit
    pub file_path: String,
    /// 1-based line the edit is anchored on
    pub line_number: usize,
    /// Why this location was chosen
    pub reason: String,
    /// Confidence of the underlying evidence
    pub confidence: MatchConfidence,
}

impl EditTarget {
    fn from_result(result: &SearchResult, reason: impl Into<String>) -> Self {
        Self {
            file_path: result.file_path.clone(),
            line_number: result.line_number,
            reason: reason.into(),
            confidence: result.confidence,
        }
    }

    /// Intent confidence for an edit derived from this target
    #[must_use]
    pub fn intent_confidence(&self, config: &TargetingConfig) -> f64 {
        if self.confidence == MatchConfidence::High {
            config.high_confidence
        } else {
            config.default_confidence
        }
    }
}

/// Picks one location from ranked search results
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetSelector;

impl TargetSelector {
    /// Create selector
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Select a target; `None` when there is no evidence
    ///
    /// - style edits prefer component sources over stylesheets
    /// - removals prefer lines inside rendered output
    /// - otherwise the highest-ranked result wins
    #[must_use]
    pub fn select(
        &self,
        results: &[SearchResult],
        edit_type: EditType,
        action: &EditAction,
    ) -> Option<EditTarget> {
        let best = results.first()?;

        if edit_type == EditType::UpdateStyle {
            if let Some(hit) = results.iter().find(|r| is_component_source(&r.file_path)) {
                return Some(EditTarget::from_result(hit, "style applied in component source"));
            }
        }

        if action.is_removal() {
            if let Some(hit) = results.iter().find(|r| is_rendered(&r.line_content)) {
                return Some(EditTarget::from_result(hit, "match inside rendered output"));
            }
        }

        Some(EditTarget::from_result(
            best,
            format!("highest-ranked {} confidence match", best.confidence.as_str()),
        ))
    }
}

fn is_rendered(line: &str) -> bool {
    line.contains("return") || ELEMENT_OPEN.is_match(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Matcher;
    use pretty_assertions::assert_eq;

    fn result(path: &str, line: usize, content: &str, confidence: MatchConfidence) -> SearchResult {
        SearchResult {
            file_path: path.to_string(),
            line_number: line,
            line_content: content.to_string(),
            matched: Matcher::Term("x".into()),
            context_before: Vec::new(),
            context_after: Vec::new(),
            confidence,
        }
    }

    #[test]
    fn empty_input_selects_nothing() {
        assert_eq!(TargetSelector::new().select(&[], EditType::Refactor, &EditAction::Modify), None);
    }

    #[test]
    fn style_prefers_component_source() {
        let results = vec![
            result("src/index.css", 3, ".hero { color: red }", MatchConfidence::High),
            result("src/Hero.jsx", 9, "<h1 className=\"hero\">", MatchConfidence::Medium),
        ];
        let target = TargetSelector::new()
            .select(&results, EditType::UpdateStyle, &EditAction::Modify)
            .unwrap();
        assert_eq!(target.file_path, "src/Hero.jsx");
        assert_eq!(target.line_number, 9);
    }

    #[test]
    fn style_falls_back_to_stylesheet() {
        let results = vec![result("src/index.css", 3, ".hero {}", MatchConfidence::High)];
        let target = TargetSelector::new()
            .select(&results, EditType::UpdateStyle, &EditAction::Modify)
            .unwrap();
        assert_eq!(target.file_path, "src/index.css");
    }

    #[test]
    fn removal_prefers_rendered_line() {
        let results = vec![
            result("src/Nav.jsx", 1, "import SignUp from './SignUp'", MatchConfidence::High),
            result("src/Nav.jsx", 12, "<SignUp />", MatchConfidence::High),
        ];
        let action = EditAction::from_prompt("remove the sign up button");
        let target = TargetSelector::new()
            .select(&results, EditType::UpdateComponent, &action)
            .unwrap();
        assert_eq!(target.line_number, 12);
        assert_eq!(target.reason, "match inside rendered output");
    }

    #[test]
    fn default_takes_first_result() {
        let results = vec![
            result("a.jsx", 4, "const a = 1", MatchConfidence::Medium),
            result("b.jsx", 2, "return <b />", MatchConfidence::Low),
        ];
        let target = TargetSelector::new()
            .select(&results, EditType::FixIssue, &EditAction::Modify)
            .unwrap();
        assert_eq!(target.file_path, "a.jsx");
        assert!((target.intent_confidence(&TargetingConfig::default()) - 0.85).abs() < 1e-9);
    }
}

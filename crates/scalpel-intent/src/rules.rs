//! Ordered intent rules
//!
//! Rules are evaluated in declaration order and the first match wins. A rule
//! matches when any of its patterns matches and none of its exclusions does;
//! exclusions replace look-around, which the `regex` crate does not support.

use crate::error::RuleError;
use regex::{Regex, RegexBuilder};
use scalpel_model::EditType;

/// Tagged matcher record: patterns → edit type
#[derive(Debug, Clone)]
pub struct IntentRule {
    /// Rule name, unique within a rule set
    pub name: String,
    /// Edit type produced by this rule
    pub edit_type: EditType,
    patterns: Vec<Regex>,
    exclusions: Vec<Regex>,
}

/// Successful rule match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleMatch {
    /// Index of the matching pattern within the rule
    pub pattern_index: usize,
    /// Whether the match spans the entire prompt
    pub exact: bool,
}

impl IntentRule {
    /// Build a rule; all patterns compile case-insensitively
    pub fn new(
        name: impl Into<String>,
        edit_type: EditType,
        patterns: &[&str],
    ) -> Result<Self, RuleError> {
        let name = name.into();
        if patterns.is_empty() {
            return Err(RuleError::NoPatterns(name));
        }
        let patterns = compile_all(&name, patterns)?;
        Ok(Self {
            name,
            edit_type,
            patterns,
            exclusions: Vec::new(),
        })
    }

    /// With exclusion patterns that veto a match
    pub fn with_exclusions(mut self, exclusions: &[&str]) -> Result<Self, RuleError> {
        self.exclusions = compile_all(&self.name, exclusions)?;
        Ok(self)
    }

    /// Number of patterns
    #[inline]
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Match against a lowercased, trimmed prompt
    #[must_use]
    pub fn matches(&self, prompt: &str) -> Option<RuleMatch> {
        if self.exclusions.iter().any(|ex| ex.is_match(prompt)) {
            return None;
        }

        self.patterns
            .iter()
            .enumerate()
            .find_map(|(pattern_index, pattern)| {
                pattern.find(prompt).map(|m| RuleMatch {
                    pattern_index,
                    exact: m.start() == 0 && m.end() == prompt.len(),
                })
            })
    }
}

fn compile_all(rule: &str, patterns: &[&str]) -> Result<Vec<Regex>, RuleError> {
    patterns
        .iter()
        .map(|p| {
            RegexBuilder::new(p)
                .case_insensitive(true)
                .build()
                .map_err(|source| RuleError::InvalidPattern {
                    rule: rule.to_string(),
                    source,
                })
        })
        .collect()
}

const STYLE_WORDS: &str =
    r"\b(?:colou?rs?|theme|styling|style|css|fonts?|dark\s+mode|light\s+mode|gradient)\b";

/// Built-in rule table, in priority order
///
/// Update rules precede the generic fix rule so that "fix the nav styling"
/// lands on styling rather than bug fixing.
pub fn default_rules() -> Result<Vec<IntentRule>, RuleError> {
    Ok(vec![
        IntentRule::new(
            "update-component",
            EditType::UpdateComponent,
            &[
                r"\bupdate\s+(?:the\s+)?[\w-]+\s+(?:component|section|page)\b",
                r"\b(?:change|modify|edit|tweak|rewrite)\s+(?:the\s+)?[\w-]+",
                r"\bmake\s+the\s+[\w-]+",
                r"\b(?:remove|delete|hide|get\s+rid\s+of)\b",
            ],
        )?
        .with_exclusions(&[STYLE_WORDS])?,
        IntentRule::new(
            "add-feature",
            EditType::AddFeature,
            &[
                r"\badd\s+(?:a\s+|an\s+)?new\s+[\w-]+",
                r"\b(?:create|implement|build)\s+(?:a\s+|an\s+)?(?:new\s+)?[\w-]+\s+(?:page|section|feature|component|form|modal)\b",
                r"\badd\s+(?:a\s+|an\s+)?[\w-]+(?:\s+[\w-]+)?\s+(?:to|into)\s+(?:the\s+)?[\w-]+",
                r"\badd\s+(?:a\s+|an\s+)?[\w-]+\s+(?:page|section|component|feature|form|modal)\b",
                r"\binclude\s+(?:a\s+|an\s+)?[\w-]+",
            ],
        )?
        .with_exclusions(&[r"\b(?:package|library|dependency|npm)\b"])?,
        IntentRule::new(
            "fix-issue",
            EditType::FixIssue,
            &[
                r"\bfix\s+(?:the\s+)?[\w-]+",
                r"\bresolve\s+(?:the\s+)?(?:error|issue|bug|warning)",
                r"\bdebug\s+(?:the\s+)?[\w-]+",
                r"\b[\w-]+\s+is\s+broken\b",
                r"\b[\w-]+\s+(?:is\s+)?not\s+working\b",
                r"\b(?:error|exception|crash(?:es|ing)?|bug)\b",
            ],
        )?
        .with_exclusions(&[r"\bfix\s+(?:the\s+)?[\w-]+\s+(?:styling|style|css|layout)\b"])?,
        IntentRule::new(
            "update-style",
            EditType::UpdateStyle,
            &[
                r"\b(?:change|update|make|set)\s+(?:the\s+)?.*\b(?:colou?rs?|theme|style|styling|css|fonts?|background)\b",
                r"\bmake\s+(?:it|them|all|everything)\s+[\w-]+",
                r"\bstyle\s+(?:the\s+)?[\w-]+",
                r"\bfix\s+(?:the\s+)?[\w-]+\s+(?:styling|style|css|layout)\b",
                r"\bdark\s+mode\b",
                r"\blight\s+mode\b",
            ],
        )?,
        IntentRule::new(
            "refactor",
            EditType::Refactor,
            &[
                r"\brefactor\b",
                r"\bclean\s+up\b",
                r"\breorgani[sz]e\b",
                r"\boptimi[sz]e\b",
                r"\bsplit\s+(?:the\s+)?[\w-]+\s+into\b",
            ],
        )?,
        IntentRule::new(
            "full-rebuild",
            EditType::FullRebuild,
            &[
                r"\bstart\s+over\b",
                r"\brecreate\s+everything\b",
                r"\brebuild\s+(?:the\s+)?(?:whole\s+|entire\s+)?(?:app|site|website|project)\b",
                r"\bnew\s+app\b",
                r"\bfrom\s+scratch\b",
            ],
        )?,
        IntentRule::new(
            "add-dependency",
            EditType::AddDependency,
            &[
                r"\binstall\s+[@\w./-]+",
                r"\badd\s+(?:the\s+)?[@\w./-]+\s+(?:package|library|dependency)\b",
                r"\buse\s+(?:the\s+)?[@\w./-]+\s+(?:library|package|framework)\b",
            ],
        )?,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> IntentRule {
        default_rules()
            .unwrap()
            .into_iter()
            .find(|r| r.name == name)
            .unwrap()
    }

    #[test]
    fn default_rules_compile_in_priority_order() {
        let rules = default_rules().unwrap();
        let order: Vec<_> = rules.iter().map(|r| r.edit_type).collect();
        assert_eq!(order, EditType::ALL.to_vec());
    }

    #[test]
    fn update_component_rule_in_isolation() {
        let r = rule("update-component");
        assert!(r.matches("make the header background black").is_some());
        assert!(r.matches("edit the hero copy").is_some());
        assert!(r.matches("remove the pricing section").is_some());
        assert!(r.matches("change the button color").is_none());
    }

    #[test]
    fn add_feature_rule_in_isolation() {
        let r = rule("add-feature");
        assert!(r.matches("add a new pricing page").is_some());
        assert!(r.matches("add a search bar to the header").is_some());
        assert!(r.matches("add lodash package").is_none());
    }

    #[test]
    fn fix_issue_rule_in_isolation() {
        let r = rule("fix-issue");
        assert!(r.matches("fix the login bug").is_some());
        assert!(r.matches("the contact form is not working").is_some());
        assert!(r.matches("fix the nav styling").is_none());
    }

    #[test]
    fn update_style_rule_in_isolation() {
        let r = rule("update-style");
        assert!(r.matches("change the button color to red").is_some());
        assert!(r.matches("dark mode").is_some());
        assert!(r.matches("fix the nav styling").is_some());
    }

    #[test]
    fn refactor_rebuild_dependency_rules_in_isolation() {
        assert!(rule("refactor").matches("refactor the header").is_some());
        assert!(rule("full-rebuild").matches("start over from scratch").is_some());
        assert!(rule("add-dependency").matches("install framer-motion").is_some());
    }

    #[test]
    fn exact_match_spans_whole_prompt() {
        let m = rule("update-style").matches("dark mode").unwrap();
        assert!(m.exact);
        let m = rule("update-style").matches("switch to dark mode please").unwrap();
        assert!(!m.exact);
    }

    #[test]
    fn invalid_pattern_is_reported() {
        let err = IntentRule::new("broken", EditType::Refactor, &["(unclosed"]).unwrap_err();
        assert!(matches!(err, RuleError::InvalidPattern { .. }));
        assert!(err.to_string().contains("broken"));
    }

    #[test]
    fn empty_rule_is_rejected() {
        assert!(matches!(
            IntentRule::new("empty", EditType::Refactor, &[]),
            Err(RuleError::NoPatterns(_))
        ));
    }
}

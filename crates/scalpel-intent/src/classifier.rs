//! Intent classifier
//!
//! Evaluates the ordered rule table, resolves targets and assembles the
//! resulting [`EditIntent`].

use crate::config::ClassifierConfig;
use crate::error::RuleError;
use crate::resolver::{Resolution, ResolutionSource, ResolverRegistry};
use crate::rules::{default_rules, IntentRule};
use crate::tokens::PromptAnalysis;
use scalpel_model::{EditIntent, EditType, FileManifest};
use serde::Serialize;
use tracing::debug;

/// Classification with the decision trail
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    /// Resulting intent
    pub intent: EditIntent,
    /// Name of the winning rule, `None` for the default intent
    pub rule: Option<String>,
    /// Whether the winning pattern spanned the whole prompt
    pub exact: bool,
    /// How the targets were resolved
    pub source: ResolutionSource,
}

/// Prompt → [`EditIntent`] classifier
#[derive(Debug)]
pub struct IntentClassifier {
    rules: Vec<IntentRule>,
    resolvers: ResolverRegistry,
    config: ClassifierConfig,
}

impl IntentClassifier {
    /// Create classifier with the built-in rule table
    pub fn new() -> Result<Self, RuleError> {
        Ok(Self::with_rules(default_rules()?))
    }

    /// Create classifier with a custom rule table, evaluated in order
    #[must_use]
    pub fn with_rules(rules: Vec<IntentRule>) -> Self {
        Self {
            rules,
            resolvers: ResolverRegistry::default(),
            config: ClassifierConfig::default(),
        }
    }

    /// With confidence weights
    #[inline]
    #[must_use]
    pub fn with_config(mut self, config: ClassifierConfig) -> Self {
        self.config = config;
        self
    }

    /// With a resolver registry
    #[inline]
    #[must_use]
    pub fn with_resolvers(mut self, resolvers: ResolverRegistry) -> Self {
        self.resolvers = resolvers;
        self
    }

    /// Rule table in evaluation order
    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[IntentRule] {
        &self.rules
    }

    /// Confidence weights
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Classify a prompt against a manifest snapshot
    #[must_use]
    pub fn classify(&self, prompt: &str, manifest: &FileManifest) -> EditIntent {
        self.classify_detailed(prompt, manifest).intent
    }

    /// Classify and report which rule won
    #[must_use]
    pub fn classify_detailed(&self, prompt: &str, manifest: &FileManifest) -> Classification {
        let analysis = PromptAnalysis::new(prompt);

        let winner = self
            .rules
            .iter()
            .find_map(|rule| rule.matches(&analysis.lowered).map(|m| (rule, m)));

        let Some((rule, rule_match)) = winner else {
            debug!("No rule matched, using default intent");
            let resolution = Resolution::fallback(manifest);
            let intent = EditIntent::new(
                EditType::UpdateComponent,
                resolution.targets.clone(),
                self.config.default_confidence,
                describe(EditType::UpdateComponent, &resolution.targets),
            )
            .with_default_context(manifest);
            return Classification {
                intent,
                rule: None,
                exact: false,
                source: resolution.source,
            };
        };

        let resolution = self.resolvers.resolve(rule.edit_type, &analysis, manifest);
        let confidence =
            self.config
                .score(resolution.concrete, analysis.word_count, rule_match.exact);

        debug!(
            rule = %rule.name,
            edit_type = %rule.edit_type,
            targets = ?resolution.targets,
            source = ?resolution.source,
            confidence,
            "Classified prompt"
        );

        let intent = EditIntent::new(
            rule.edit_type,
            resolution.targets.clone(),
            confidence,
            describe(rule.edit_type, &resolution.targets),
        );
        let intent = match resolution.context {
            Some(context) => intent.with_context(context),
            None => intent.with_default_context(manifest),
        };

        Classification {
            intent,
            rule: Some(rule.name.clone()),
            exact: rule_match.exact,
            source: resolution.source,
        }
    }
}

fn describe(edit_type: EditType, targets: &[String]) -> String {
    if targets.is_empty() {
        edit_type.label().to_string()
    } else {
        format!("{} in {}", edit_type.label(), targets.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scalpel_model::{FileInfo, FileKind};

    fn manifest() -> FileManifest {
        FileManifest::new()
            .with_file("src/App.jsx", FileInfo::new("<Header />", FileKind::Component))
            .with_file("src/Header.jsx", FileInfo::new("<header />", FileKind::Component))
            .with_entry_point("src/App.jsx")
    }

    #[test]
    fn default_intent_targets_entry_point() {
        let classifier = IntentClassifier::new().unwrap();
        let result = classifier.classify_detailed("hmm", &manifest());
        assert_eq!(result.rule, None);
        assert_eq!(result.intent.edit_type, EditType::UpdateComponent);
        assert_eq!(result.intent.target_files, vec!["src/App.jsx"]);
        assert!((result.intent.confidence - 0.3).abs() < 1e-9);
        assert_eq!(result.intent.suggested_context, vec!["src/Header.jsx"]);
    }

    #[test]
    fn custom_weights_apply() {
        let classifier = IntentClassifier::new().unwrap().with_config(ClassifierConfig {
            default_confidence: 0.1,
            ..ClassifierConfig::default()
        });
        let intent = classifier.classify("hmm", &manifest());
        assert!((intent.confidence - 0.1).abs() < 1e-9);
    }

    #[test]
    fn description_names_targets() {
        assert_eq!(describe(EditType::Refactor, &[]), EditType::Refactor.label());
        assert!(describe(EditType::Refactor, &["a.jsx".into()]).ends_with(" in a.jsx"));
    }
}

//! Prompt tokenization
//!
//! Strips stopwords and request verbs so the remaining tokens can be compared
//! against file and component names.

use scalpel_model::EditAction;

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "from", "into", "onto", "this", "that", "these", "those",
    "make", "change", "update", "modify", "edit", "fix", "add", "create", "remove", "delete",
    "hide", "please", "can", "you", "could", "would", "should", "want", "need", "like", "just",
    "also", "all", "some", "new", "more", "less", "its", "them", "our", "your", "their", "let",
    "get", "rid", "put", "use", "using", "instead", "there", "here", "then", "than", "too",
    "very", "really", "bit", "little", "sure", "have", "has", "are", "was", "were", "been",
    "will", "when", "what", "which", "where", "who", "how", "why", "not", "but", "any", "each",
    "every", "page", "app", "site", "website", "component", "section", "implement", "build",
    "include", "install", "refactor", "style", "styling", "debug", "resolve", "issue",
];

/// UI element words mapped to the file-name fragments they usually live in
const UI_ELEMENTS: &[(&str, &[&str])] = &[
    ("header", &["header", "navbar", "nav"]),
    ("navbar", &["navbar", "nav", "header"]),
    ("nav", &["nav", "navbar", "header"]),
    ("navigation", &["nav", "navbar", "header"]),
    ("menu", &["nav", "menu", "header"]),
    ("logo", &["header", "navbar", "logo"]),
    ("footer", &["footer"]),
    ("bottom", &["footer"]),
    ("hero", &["hero", "banner", "landing"]),
    ("banner", &["banner", "hero"]),
    ("landing", &["hero", "landing"]),
    ("cta", &["cta", "calltoaction", "hero"]),
    ("sidebar", &["sidebar", "aside"]),
    ("pricing", &["pricing", "plans"]),
    ("testimonials", &["testimonial", "review"]),
    ("reviews", &["review", "testimonial"]),
    ("features", &["feature"]),
    ("contact", &["contact"]),
    ("about", &["about"]),
    ("faq", &["faq"]),
    ("gallery", &["gallery"]),
    ("modal", &["modal", "dialog"]),
    ("form", &["form"]),
    ("card", &["card"]),
];

/// Prompt normalised for rule matching and file resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptAnalysis {
    /// Prompt as given
    pub raw: String,
    /// Lowercased, trimmed prompt
    pub lowered: String,
    /// Candidate noun-like tokens in prompt order
    pub tokens: Vec<String>,
    /// Removal detection
    pub action: EditAction,
    /// Whitespace-separated word count
    pub word_count: usize,
}

impl PromptAnalysis {
    /// Analyse a prompt
    #[must_use]
    pub fn new(prompt: &str) -> Self {
        let lowered = prompt.trim().to_lowercase();
        let word_count = lowered.split_whitespace().count();

        let mut tokens: Vec<String> = Vec::new();
        for word in lowered.split(|c: char| !(c.is_alphanumeric() || c == '-')) {
            let word = word.trim_matches('-');
            if word.len() < 3 || STOPWORDS.contains(&word) || word.chars().all(char::is_numeric)
            {
                continue;
            }
            if !tokens.iter().any(|t| t == word) {
                tokens.push(word.to_string());
            }
        }

        Self {
            raw: prompt.to_string(),
            lowered,
            tokens,
            action: EditAction::from_prompt(prompt),
            word_count,
        }
    }

    /// File-name fragments for UI element words found in the prompt, in prompt order
    #[must_use]
    pub fn ui_fragments(&self) -> Vec<&'static str> {
        let mut fragments = Vec::new();
        for word in self.lowered.split(|c: char| !c.is_alphanumeric()) {
            if let Some((_, hints)) = UI_ELEMENTS.iter().find(|(element, _)| *element == word) {
                for hint in *hints {
                    if !fragments.contains(hint) {
                        fragments.push(*hint);
                    }
                }
            }
        }
        fragments
    }
}

/// Check if a lowercase name contains a token, tolerating a plural token
#[must_use]
pub fn name_matches(name: &str, token: &str) -> bool {
    if name.contains(token) {
        return true;
    }
    token.len() > 3
        && token.ends_with('s')
        && name.contains(&token[..token.len() - 1])
}

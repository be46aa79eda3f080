//! Edit vocabulary
//!
//! [`EditType`] names the category of a request, [`EditIntent`] carries the
//! resolved targets, and [`EditAction`] records whether the request removes
//! something from the rendered output.

use crate::error::ModelError;
use crate::manifest::FileManifest;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Classified category of an edit request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EditType {
    /// Change an existing component
    UpdateComponent,
    /// Add a page, section or feature
    AddFeature,
    /// Fix broken behaviour
    FixIssue,
    /// Change colours, theme or styling
    UpdateStyle,
    /// Restructure code without changing behaviour
    Refactor,
    /// Start the app over
    FullRebuild,
    /// Install a package
    AddDependency,
}

impl EditType {
    /// All edit types in declaration order
    pub const ALL: [EditType; 7] = [
        EditType::UpdateComponent,
        EditType::AddFeature,
        EditType::FixIssue,
        EditType::UpdateStyle,
        EditType::Refactor,
        EditType::FullRebuild,
        EditType::AddDependency,
    ];

    /// Wire name (`UPDATE_STYLE`)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EditType::UpdateComponent => "UPDATE_COMPONENT",
            EditType::AddFeature => "ADD_FEATURE",
            EditType::FixIssue => "FIX_ISSUE",
            EditType::UpdateStyle => "UPDATE_STYLE",
            EditType::Refactor => "REFACTOR",
            EditType::FullRebuild => "FULL_REBUILD",
            EditType::AddDependency => "ADD_DEPENDENCY",
        }
    }

    /// Human-readable label
    #[inline]
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            EditType::UpdateComponent => "Update component",
            EditType::AddFeature => "Add feature",
            EditType::FixIssue => "Fix issue",
            EditType::UpdateStyle => "Update styling",
            EditType::Refactor => "Refactor",
            EditType::FullRebuild => "Full rebuild",
            EditType::AddDependency => "Add dependency",
        }
    }

    /// Whether targets may name files that do not exist yet
    #[inline]
    #[must_use]
    pub fn may_create_files(&self) -> bool {
        matches!(self, EditType::AddFeature | EditType::FullRebuild)
    }
}

impl fmt::Display for EditType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditType {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();

        EditType::ALL
            .into_iter()
            .find(|t| t.as_str().replace('_', "") == normalized)
            .ok_or_else(|| ModelError::UnknownEditType(s.to_string()))
    }
}

/// Resolved intent for one edit request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditIntent {
    /// Classified edit type
    #[serde(rename = "type")]
    pub edit_type: EditType,
    /// Ordered target file paths
    pub target_files: Vec<String>,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Human-readable description
    pub description: String,
    /// Files to send as read-only context
    #[serde(default)]
    pub suggested_context: Vec<String>,
}

impl EditIntent {
    /// Create new intent; confidence is clamped to [0, 1]
    #[inline]
    #[must_use]
    pub fn new(
        edit_type: EditType,
        target_files: Vec<String>,
        confidence: f64,
        description: impl Into<String>,
    ) -> Self {
        Self {
            edit_type,
            target_files,
            confidence: confidence.clamp(0.0, 1.0),
            description: description.into(),
            suggested_context: Vec::new(),
        }
    }

    /// With explicit context files
    #[inline]
    #[must_use]
    pub fn with_context(mut self, context: Vec<String>) -> Self {
        self.suggested_context = context;
        self
    }

    /// Context = every manifest file that is not a target
    #[must_use]
    pub fn with_default_context(mut self, manifest: &FileManifest) -> Self {
        self.suggested_context = manifest
            .paths()
            .filter(|p| !self.target_files.iter().any(|t| t == p))
            .map(str::to_string)
            .collect();
        self
    }

    /// First target file
    #[inline]
    #[must_use]
    pub fn primary_target(&self) -> Option<&str> {
        self.target_files.first().map(String::as_str)
    }
}

static REMOVAL_VERB: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(remove|delete|hide|get rid of)\b").unwrap());

static QUOTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#""([^"]+)"|'([^']+)'|“([^”]+)”|`([^`]+)`"#).unwrap());

static REMOVAL_SUBJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:remove|delete|hide|get rid of)\s+(?:the\s+|a\s+|an\s+|all\s+|that\s+|this\s+)?(.+?)(?:\s+(?:from|in|on|at|inside|within|under)\b.*)?$",
    )
    .unwrap()
});

/// Trailing nouns that describe the element rather than its text
const ELEMENT_NOUNS: &[&str] = &[
    "button", "buttons", "link", "links", "text", "section", "element", "icon", "icons",
    "image", "badge", "label", "heading", "title", "item", "items", "banner",
];

/// What the request does to the rendered output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum EditAction {
    /// Change or add something
    Modify,
    /// Remove, delete or hide something
    Remove {
        /// Text identifying what to remove, when one could be extracted
        subject: Option<String>,
    },
}

impl EditAction {
    /// Detect removal requests and their subject
    #[must_use]
    pub fn from_prompt(prompt: &str) -> Self {
        if !REMOVAL_VERB.is_match(prompt) {
            return EditAction::Modify;
        }

        let quoted = QUOTED.captures(prompt).and_then(|caps| {
            caps.iter()
                .skip(1)
                .flatten()
                .next()
                .map(|m| m.as_str().trim().to_string())
        });

        let subject = quoted.or_else(|| {
            REMOVAL_SUBJECT
                .captures(prompt.trim())
                .and_then(|caps| caps.get(1))
                .map(|m| {
                    m.as_str()
                        .trim_end_matches(|c: char| c.is_ascii_punctuation())
                        .trim()
                        .to_string()
                })
        });

        EditAction::Remove {
            subject: subject.filter(|s| !s.is_empty()),
        }
    }

    /// Check if this is a removal
    #[inline]
    #[must_use]
    pub fn is_removal(&self) -> bool {
        matches!(self, EditAction::Remove { .. })
    }

    /// Removal subject, if any
    #[inline]
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        match self {
            EditAction::Remove { subject } => subject.as_deref(),
            EditAction::Modify => None,
        }
    }

    /// Phrases to look for in file content, most specific first
    #[must_use]
    pub fn search_phrases(&self) -> Vec<String> {
        let Some(subject) = self.subject() else {
            return Vec::new();
        };

        let mut phrases = vec![subject.to_string()];
        let words: Vec<&str> = subject.split_whitespace().collect();
        if words.len() > 1 {
            if let Some(last) = words.last() {
                if ELEMENT_NOUNS.contains(&last.to_lowercase().as_str()) {
                    phrases.push(words[..words.len() - 1].join(" "));
                }
            }
        }
        phrases
    }
}

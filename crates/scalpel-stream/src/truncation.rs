//! Truncation detection
//!
//! Heuristics only: without a real parser there is no ground truth. All
//! content checks sit behind [`TruncationHeuristic`] so thresholds can be
//! tuned or the detector replaced without touching extraction or recovery.
//!
//! Trailing ellipses are not treated as a signal; spread syntax and UI copy
//! produce too many false positives.

use crate::extractor::ExtractionOutcome;
use crate::merge::ParsedFile;
use once_cell::sync::Lazy;
use regex::Regex;
use scalpel_model::SourceLanguage;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

// A tag can only open at line start or after whitespace, `(`, `{`, `>`, `?` or `:`;
// `a<b` and `x.y()<z` are comparisons.
static DANGLING_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:^|[\s({>?:])</?[A-Za-z][\w.:-]*(?:\s[^>]*)?$").unwrap());

/// Detector thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TruncationConfig {
    /// Allowed difference between `{` and `}` counts in script files
    pub brace_tolerance: usize,
    /// Script files shorter than this are checked for a dangling `function`
    pub short_file_chars: usize,
}

impl Default for TruncationConfig {
    fn default() -> Self {
        Self {
            brace_tolerance: 3,
            short_file_chars: 20,
        }
    }
}

/// Why a file looks truncated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TruncationReason {
    /// Close tag never observed; response tag counts included
    UnclosedBlock {
        /// `<file path="` occurrences
        opened: usize,
        /// `</file>` occurrences
        closed: usize,
    },
    /// Content ends inside an opening tag
    DanglingTag,
    /// Brace counts differ by more than the tolerance
    BraceMismatch {
        /// `{` count
        open: usize,
        /// `}` count
        close: usize,
    },
    /// Very short script with `function` and no closing brace
    ShortFunction,
    /// Recovery ran but the replacement still looks truncated
    RecoveryIncomplete,
}

impl fmt::Display for TruncationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnclosedBlock { opened, closed } => {
                write!(f, "file block never closed ({opened} opened, {closed} closed)")
            }
            Self::DanglingTag => f.write_str("content ends inside an unterminated tag"),
            Self::BraceMismatch { open, close } => {
                write!(f, "unbalanced braces ({open} opening, {close} closing)")
            }
            Self::ShortFunction => f.write_str("function declaration without a body"),
            Self::RecoveryIncomplete => f.write_str("recovered content still looks truncated"),
        }
    }
}

/// Per-file truncation warning
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruncationWarning {
    /// File path
    pub path: String,
    /// Signal that fired
    pub reason: TruncationReason,
}

impl TruncationWarning {
    /// Create warning
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>, reason: TruncationReason) -> Self {
        Self {
            path: path.into(),
            reason,
        }
    }
}

impl fmt::Display for TruncationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Content-level truncation check
pub trait TruncationHeuristic: Send + Sync + fmt::Debug {
    /// Reason the content looks truncated, `None` if it looks whole
    fn is_likely_truncated(&self, content: &str, path: &str) -> Option<TruncationReason>;
}

/// Dangling-tag and brace-count heuristics
#[derive(Debug, Clone, Copy, Default)]
pub struct HeuristicDetector {
    config: TruncationConfig,
}

impl HeuristicDetector {
    /// Create detector with explicit thresholds
    #[inline]
    #[must_use]
    pub fn new(config: TruncationConfig) -> Self {
        Self { config }
    }
}

impl TruncationHeuristic for HeuristicDetector {
    fn is_likely_truncated(&self, content: &str, path: &str) -> Option<TruncationReason> {
        let trimmed = content.trim();

        let last_line = trimmed.lines().last().unwrap_or("");
        if trimmed.ends_with('<') || DANGLING_TAG.is_match(last_line) {
            return Some(TruncationReason::DanglingTag);
        }

        if !SourceLanguage::from_path(path).is_script_like() {
            return None;
        }

        let open = trimmed.matches('{').count();
        let close = trimmed.matches('}').count();
        if open.abs_diff(close) > self.config.brace_tolerance {
            return Some(TruncationReason::BraceMismatch { open, close });
        }

        if trimmed.len() < self.config.short_file_chars
            && trimmed.contains("function")
            && !trimmed.contains('}')
        {
            return Some(TruncationReason::ShortFunction);
        }

        None
    }
}

/// Inspects a drained extraction for truncated files
#[derive(Debug)]
pub struct TruncationAnalyzer {
    heuristic: Box<dyn TruncationHeuristic>,
}

impl Default for TruncationAnalyzer {
    fn default() -> Self {
        Self::new(HeuristicDetector::default())
    }
}

impl TruncationAnalyzer {
    /// Create analyzer around a heuristic
    #[must_use]
    pub fn new<H: TruncationHeuristic + 'static>(heuristic: H) -> Self {
        Self {
            heuristic: Box::new(heuristic),
        }
    }

    /// Create analyzer with the default heuristics and explicit thresholds
    #[must_use]
    pub fn with_config(config: TruncationConfig) -> Self {
        Self::new(HeuristicDetector::new(config))
    }

    /// Check one file
    #[must_use]
    pub fn check(&self, file: &ParsedFile) -> Option<TruncationReason> {
        self.heuristic.is_likely_truncated(&file.content, &file.path)
    }

    /// One warning per flagged file, in file order
    #[must_use]
    pub fn analyze(&self, outcome: &ExtractionOutcome) -> Vec<TruncationWarning> {
        let (opened, closed) = outcome.tag_balance();
        if opened != closed && outcome.incomplete_files().next().is_none() {
            warn!(opened, closed, "File tag counts differ but every kept file is complete");
        }

        let warnings: Vec<TruncationWarning> = outcome
            .files
            .iter()
            .filter_map(|file| {
                let reason = if file.complete {
                    self.check(file)?
                } else {
                    TruncationReason::UnclosedBlock { opened, closed }
                };
                Some(TruncationWarning::new(file.path.clone(), reason))
            })
            .collect();

        for warning in &warnings {
            warn!(path = %warning.path, reason = %warning.reason, "Possible truncation");
        }
        warnings
    }
}

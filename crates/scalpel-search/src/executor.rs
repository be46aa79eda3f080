//! Search plan executor
//!
//! Files are scanned in parallel and re-assembled in discovery order, so the
//! output for a given `(plan, files)` pair is always the same.

use crate::config::SearchConfig;
use crate::plan::SearchPlan;
use rayon::prelude::*;
use regex::{Regex, RegexBuilder};
use scalpel_model::{extension_of, FileContents};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

/// Coarse match confidence; ordered so that `High` is greatest
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchConfidence {
    /// Match on a comment line
    Low,
    /// Regex match, or a term matched only case-insensitively
    Medium,
    /// Exact term match, or a match on a declaration/render line
    High,
}

impl MatchConfidence {
    /// One level lower, saturating at `Low`
    #[inline]
    #[must_use]
    pub fn downgrade(self) -> Self {
        match self {
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }

    /// Lowercase name
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

/// What matched a line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Matcher {
    /// Literal search term
    Term(String),
    /// Regex pattern source
    Pattern(String),
}

impl Matcher {
    /// Term or pattern text
    #[inline]
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Term(s) | Self::Pattern(s) => s,
        }
    }
}

/// One evidence line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    /// File path
    pub file_path: String,
    /// 1-based line number
    pub line_number: usize,
    /// Trimmed line content
    pub line_content: String,
    /// Term or pattern that matched
    pub matched: Matcher,
    /// Up to `context_lines` lines before the match
    pub context_before: Vec<String>,
    /// Up to `context_lines` lines after the match
    pub context_after: Vec<String>,
    /// Match confidence
    pub confidence: MatchConfidence,
}

/// Outcome of executing a plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchExecutionResult {
    /// Whether any evidence was found
    pub success: bool,
    /// Evidence sorted by confidence, ties in discovery order
    pub results: Vec<SearchResult>,
    /// Number of files that passed the extension filter
    pub files_searched: usize,
    /// Wall-clock time spent scanning
    pub execution_time_ms: u64,
    /// Whether the results came from the fallback search
    pub used_fallback: bool,
}

impl SearchExecutionResult {
    /// Highest-ranked result
    #[inline]
    #[must_use]
    pub fn best(&self) -> Option<&SearchResult> {
        self.results.first()
    }
}

const DECLARATION_KEYWORDS: &[&str] = &["function", "export", "return"];
const COMMENT_PREFIXES: &[&str] = &["//", "/*", "*", "{/*", "<!--"];

/// Compiled term/pattern set for one search pass
struct Matchers {
    terms: Vec<(String, String)>,
    patterns: Vec<(String, Regex)>,
}

impl Matchers {
    fn compile(terms: &[String], patterns: &[String]) -> Self {
        let terms = terms
            .iter()
            .filter(|t| !t.trim().is_empty())
            .map(|t| (t.clone(), t.to_lowercase()))
            .collect();

        let patterns = patterns
            .iter()
            .filter(|p| !p.trim().is_empty())
            .filter_map(|p| {
                match RegexBuilder::new(p).case_insensitive(true).build() {
                    Ok(regex) => Some((p.clone(), regex)),
                    Err(e) => {
                        warn!(pattern = %p, error = %e, "Skipping invalid search pattern");
                        None
                    }
                }
            })
            .collect();

        Self { terms, patterns }
    }

    fn is_empty(&self) -> bool {
        self.terms.is_empty() && self.patterns.is_empty()
    }

    fn match_line(&self, line: &str) -> Option<(Matcher, MatchConfidence)> {
        let lowered = line.to_lowercase();

        let found = self
            .terms
            .iter()
            .find(|(_, term)| lowered.contains(term.as_str()))
            .map(|(original, _)| {
                let exact = line.contains(original.as_str());
                let declaration = DECLARATION_KEYWORDS.iter().any(|k| line.contains(k));
                let confidence = if exact || declaration {
                    MatchConfidence::High
                } else {
                    MatchConfidence::Medium
                };
                (Matcher::Term(original.clone()), confidence)
            })
            .or_else(|| {
                self.patterns
                    .iter()
                    .find(|(_, regex)| regex.is_match(line))
                    .map(|(source, _)| (Matcher::Pattern(source.clone()), MatchConfidence::Medium))
            })?;

        let trimmed = line.trim_start();
        if COMMENT_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            Some((found.0, found.1.downgrade()))
        } else {
            Some(found)
        }
    }
}

/// Executes [`SearchPlan`]s over file contents
#[derive(Debug, Clone, Default)]
pub struct SearchPlanExecutor {
    config: SearchConfig,
}

impl SearchPlanExecutor {
    /// Create executor with default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create executor with explicit settings
    #[inline]
    #[must_use]
    pub fn with_config(config: SearchConfig) -> Self {
        Self { config }
    }

    /// Executor settings
    #[inline]
    #[must_use]
    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Run the primary search, then the fallback when the primary finds nothing
    #[must_use]
    pub fn execute(&self, plan: &SearchPlan, files: &FileContents) -> SearchExecutionResult {
        let start = Instant::now();

        let mut extensions = plan.extensions();
        if extensions.is_empty() {
            extensions = self
                .config
                .default_file_types
                .iter()
                .map(|t| t.trim_start_matches('.').to_lowercase())
                .collect();
        }

        let eligible: Vec<(&str, &str)> = files
            .iter()
            .filter(|(path, _)| {
                extension_of(path)
                    .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
                    .unwrap_or(false)
            })
            .map(|(path, content)| (path.as_str(), content.as_str()))
            .collect();

        let primary = Matchers::compile(&plan.search_terms, &plan.regex_patterns);
        let mut results = self.search(&primary, &eligible);
        let mut used_fallback = false;

        if results.is_empty() {
            if let Some(fallback) = plan.fallback_search.as_ref().filter(|f| !f.is_empty()) {
                debug!("Primary search found nothing, running fallback");
                let matchers = Matchers::compile(&fallback.terms, &fallback.patterns);
                results = self.search(&matchers, &eligible);
                used_fallback = true;
            }
        }

        let execution_time_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        debug!(
            files = eligible.len(),
            results = results.len(),
            used_fallback,
            execution_time_ms,
            "Search plan executed"
        );

        SearchExecutionResult {
            success: !results.is_empty(),
            results,
            files_searched: eligible.len(),
            execution_time_ms,
            used_fallback,
        }
    }

    fn search(&self, matchers: &Matchers, files: &[(&str, &str)]) -> Vec<SearchResult> {
        if matchers.is_empty() {
            return Vec::new();
        }

        let per_file: Vec<Vec<SearchResult>> = files
            .par_iter()
            .map(|(path, content)| self.scan_file(matchers, path, content))
            .collect();

        let mut results: Vec<SearchResult> = per_file.into_iter().flatten().collect();
        // stable: ties keep discovery order
        results.sort_by(|a, b| b.confidence.cmp(&a.confidence));
        results
    }

    fn scan_file(&self, matchers: &Matchers, path: &str, content: &str) -> Vec<SearchResult> {
        let lines: Vec<&str> = content.lines().collect();
        let n = self.config.context_lines;

        lines
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| {
                let (matched, confidence) = matchers.match_line(line)?;
                let before = &lines[idx.saturating_sub(n)..idx];
                let after = &lines[idx + 1..(idx + 1 + n).min(lines.len())];
                Some(SearchResult {
                    file_path: path.to_string(),
                    line_number: idx + 1,
                    line_content: line.trim().to_string(),
                    matched,
                    context_before: before.iter().map(|l| (*l).to_string()).collect(),
                    context_after: after.iter().map(|l| (*l).to_string()).collect(),
                    confidence,
                })
            })
            .collect()
    }
}

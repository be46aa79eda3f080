//! Duplicate file resolution
//!
//! An oracle may declare the same path more than once in one response. The
//! [`MergePolicy`] decides which block survives; [`FileSet`] applies it while
//! keeping first-seen order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One extracted file block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFile {
    /// File path from the open tag
    pub path: String,
    /// Trimmed content
    pub content: String,
    /// Whether the close tag was observed
    pub complete: bool,
}

impl ParsedFile {
    /// Create parsed file
    #[inline]
    #[must_use]
    pub fn new(path: impl Into<String>, content: impl Into<String>, complete: bool) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            complete,
        }
    }
}

/// Decides between two blocks for the same path
pub trait MergePolicy: Send + Sync + fmt::Debug {
    /// Whether `incoming` replaces `existing`
    fn prefer_incoming(&self, existing: &ParsedFile, incoming: &ParsedFile) -> bool;

    /// Policy name (for debugging)
    fn name(&self) -> &'static str;
}

/// Complete beats incomplete, then longer content wins, ties keep the first
#[derive(Debug, Clone, Copy, Default)]
pub struct CompletenessFirst;

impl MergePolicy for CompletenessFirst {
    fn prefer_incoming(&self, existing: &ParsedFile, incoming: &ParsedFile) -> bool {
        if existing.complete != incoming.complete {
            return incoming.complete;
        }
        incoming.content.len() > existing.content.len()
    }

    fn name(&self) -> &'static str {
        "completeness_first"
    }
}

/// Result of inserting into a [`FileSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeDecision {
    /// First block for the path
    Inserted,
    /// Replaced the previous block
    Replaced,
    /// Previous block kept
    Kept,
}

/// Path-unique file collection in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    files: IndexMap<String, ParsedFile>,
}

impl FileSet {
    /// Create empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert using [`CompletenessFirst`]
    pub fn insert(&mut self, file: ParsedFile) -> MergeDecision {
        self.insert_with(&CompletenessFirst, file)
    }

    /// Insert using an explicit policy
    pub fn insert_with(&mut self, policy: &dyn MergePolicy, file: ParsedFile) -> MergeDecision {
        match self.files.get_mut(&file.path) {
            None => {
                self.files.insert(file.path.clone(), file);
                MergeDecision::Inserted
            }
            Some(existing) if policy.prefer_incoming(existing, &file) => {
                *existing = file;
                MergeDecision::Replaced
            }
            Some(_) => MergeDecision::Kept,
        }
    }

    /// Overwrite a path unconditionally, keeping its position
    pub fn replace(&mut self, file: ParsedFile) {
        match self.files.get_mut(&file.path) {
            Some(existing) => *existing = file,
            None => {
                self.files.insert(file.path.clone(), file);
            }
        }
    }

    /// Check if a path was finalized
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Get file by path
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&ParsedFile> {
        self.files.get(path)
    }

    /// Number of distinct paths
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Files in first-seen order
    pub fn iter(&self) -> impl Iterator<Item = &ParsedFile> {
        self.files.values()
    }

    /// Consume into files in first-seen order
    #[must_use]
    pub fn into_files(self) -> Vec<ParsedFile> {
        self.files.into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn complete_beats_longer_incomplete() {
        let mut set = FileSet::new();
        assert_eq!(set.insert(ParsedFile::new("a.js", "short", true)), MergeDecision::Inserted);
        assert_eq!(
            set.insert(ParsedFile::new("a.js", "much longer but cut", false)),
            MergeDecision::Kept
        );
        assert_eq!(set.get("a.js").unwrap().content, "short");
    }

    #[test]
    fn complete_replaces_incomplete() {
        let mut set = FileSet::new();
        set.insert(ParsedFile::new("a.js", "longer partial", false));
        assert_eq!(set.insert(ParsedFile::new("a.js", "x", true)), MergeDecision::Replaced);
        assert!(set.get("a.js").unwrap().complete);
    }

    #[test]
    fn longer_wins_between_equals_and_ties_keep_first() {
        let mut set = FileSet::new();
        set.insert(ParsedFile::new("a.js", "aa", true));
        assert_eq!(set.insert(ParsedFile::new("a.js", "bbb", true)), MergeDecision::Replaced);
        assert_eq!(set.insert(ParsedFile::new("a.js", "ccc", true)), MergeDecision::Kept);
        assert_eq!(set.get("a.js").unwrap().content, "bbb");

        set.insert(ParsedFile::new("b.js", "1", false));
        assert_eq!(set.insert(ParsedFile::new("b.js", "12", false)), MergeDecision::Replaced);
    }

    #[test]
    fn order_is_first_seen() {
        let mut set = FileSet::new();
        set.insert(ParsedFile::new("b.js", "b", true));
        set.insert(ParsedFile::new("a.js", "a", true));
        set.insert(ParsedFile::new("b.js", "bb", true));
        let paths: Vec<_> = set.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(paths, vec!["b.js", "a.js"]);
    }
}

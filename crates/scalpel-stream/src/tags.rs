//! Tag vocabulary of the generation stream

use serde::{Deserialize, Serialize};
use std::fmt;

/// Prefix of a file open tag: `<file path="…">`
pub const FILE_OPEN_PREFIX: &str = "<file path=\"";

/// File close tag
pub const FILE_CLOSE: &str = "</file>";

/// Longest file open tag accepted before the candidate is treated as plain text
pub const MAX_OPEN_TAG_LEN: usize = 512;

/// Bytes kept back from a body so a marker split across chunks is still found
pub(crate) const FILE_BODY_LOOKBACK: usize = if FILE_OPEN_PREFIX.len() > FILE_CLOSE.len() {
    FILE_OPEN_PREFIX.len() - 1
} else {
    FILE_CLOSE.len() - 1
};

/// Flat auxiliary blocks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockTag {
    /// `<package>name</package>`
    Package,
    /// `<packages>` with one name per line
    Packages,
    /// `<command>…</command>`
    Command,
    /// `<explanation>…</explanation>`
    Explanation,
    /// `<structure>…</structure>`
    Structure,
    /// `<template>…</template>`
    Template,
}

impl BlockTag {
    /// All auxiliary tags
    pub const ALL: [BlockTag; 6] = [
        BlockTag::Package,
        BlockTag::Packages,
        BlockTag::Command,
        BlockTag::Explanation,
        BlockTag::Structure,
        BlockTag::Template,
    ];

    /// Tag name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            BlockTag::Package => "package",
            BlockTag::Packages => "packages",
            BlockTag::Command => "command",
            BlockTag::Explanation => "explanation",
            BlockTag::Structure => "structure",
            BlockTag::Template => "template",
        }
    }

    /// Open marker, e.g. `<package>`
    #[must_use]
    pub fn open_marker(&self) -> &'static str {
        match self {
            BlockTag::Package => "<package>",
            BlockTag::Packages => "<packages>",
            BlockTag::Command => "<command>",
            BlockTag::Explanation => "<explanation>",
            BlockTag::Structure => "<structure>",
            BlockTag::Template => "<template>",
        }
    }

    /// Close marker, e.g. `</package>`
    #[must_use]
    pub fn close_marker(&self) -> &'static str {
        match self {
            BlockTag::Package => "</package>",
            BlockTag::Packages => "</packages>",
            BlockTag::Command => "</command>",
            BlockTag::Explanation => "</explanation>",
            BlockTag::Structure => "</structure>",
            BlockTag::Template => "</template>",
        }
    }
}

impl fmt::Display for BlockTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Largest char boundary not above `idx`
pub(crate) fn floor_char_boundary(s: &str, idx: usize) -> usize {
    if idx >= s.len() {
        return s.len();
    }
    let mut idx = idx;
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

/// Count file open and close tags in a response
#[must_use]
pub fn file_tag_balance(text: &str) -> (usize, usize) {
    (
        text.matches(FILE_OPEN_PREFIX).count(),
        text.matches(FILE_CLOSE).count(),
    )
}

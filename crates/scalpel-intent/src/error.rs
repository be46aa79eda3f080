//! Error types for rule construction

/// Errors raised while building classifier rules
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A rule pattern failed to compile
    #[error("invalid pattern in rule '{rule}': {source}")]
    InvalidPattern {
        rule: String,
        #[source]
        source: regex::Error,
    },

    /// A rule was declared without any pattern
    #[error("rule '{0}' has no patterns")]
    NoPatterns(String),
}

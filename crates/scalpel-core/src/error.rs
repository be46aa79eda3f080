//! Error types for the edit pipeline
//!
//! Nothing here escapes [`EditPipeline::run`](crate::EditPipeline::run): a
//! failure is recorded on the outcome next to whatever partial results exist.

use scalpel_intent::RuleError;
use scalpel_search::PlanError;
use std::path::PathBuf;

/// Oracle call failures
#[derive(Debug, Clone, thiserror::Error)]
pub enum OracleError {
    /// Service unreachable or refused the request
    #[error("oracle unavailable: {0}")]
    Unavailable(String),

    /// Call exceeded its time budget
    #[error("{operation} timed out after {secs}s")]
    Timeout {
        /// Operation that timed out
        operation: &'static str,
        /// Budget in seconds
        secs: u64,
    },

    /// Transport failed mid-stream
    #[error("stream interrupted: {0}")]
    Transport(String),

    /// Response could not be used
    #[error("invalid oracle response: {0}")]
    InvalidResponse(String),
}

impl OracleError {
    /// Check if retrying the call may help
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::InvalidResponse(_))
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// TOML could not be decoded
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Pipeline failures
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Planning oracle failed; resolution fell back to the classifier
    #[error("planning failed: {0}")]
    Planning(#[source] OracleError),

    /// Planning response was not a usable plan
    #[error("planning response rejected: {0}")]
    InvalidPlan(#[from] PlanError),

    /// Generation call could not be started
    #[error("generation failed: {0}")]
    Generation(#[source] OracleError),

    /// Generation stream ended with an error
    #[error("generation stream failed after {chunks} chunks: {source}")]
    Stream {
        /// Chunks received before the failure
        chunks: usize,
        /// Underlying error
        #[source]
        source: OracleError,
    },

    /// Recovery call for one file failed
    #[error("recovery of {path} failed: {source}")]
    Recovery {
        /// File being recovered
        path: String,
        /// Underlying error
        #[source]
        source: OracleError,
    },

    /// Classifier rule table is invalid
    #[error("classifier rules invalid: {0}")]
    Rules(#[from] RuleError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Check if retrying the whole request may help
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Planning(e) | Self::Generation(e) => e.is_retryable(),
            Self::Stream { source, .. } | Self::Recovery { source, .. } => source.is_retryable(),
            Self::InvalidPlan(_) | Self::Rules(_) | Self::Config(_) => false,
        }
    }
}

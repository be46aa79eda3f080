//! Search plan errors

use thiserror::Error;

/// Errors decoding or validating a search plan
#[derive(Error, Debug)]
pub enum PlanError {
    /// Plan JSON could not be decoded
    #[error("invalid search plan: {0}")]
    Json(#[from] serde_json::Error),

    /// Response contained no JSON object
    #[error("no JSON object found in planning response")]
    NoJson,

    /// Plan has neither search terms nor regex patterns
    #[error("search plan has no search terms or patterns")]
    Empty,
}

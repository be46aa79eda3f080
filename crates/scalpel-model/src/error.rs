//! Error types for the data model

/// Errors raised while loading or interpreting model values
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// Manifest JSON could not be decoded
    #[error("invalid manifest: {0}")]
    InvalidManifest(#[from] serde_json::Error),

    /// Edit type name not recognised
    #[error("unknown edit type: '{0}'")]
    UnknownEditType(String),
}

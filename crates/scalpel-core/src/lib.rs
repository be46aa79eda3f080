//! Scalpel Core - edit pipeline
//!
//! Orchestrates one edit request against an existing codebase:
//! - Resolves which file and line the request concerns
//! - Builds an edit instruction scoped to exactly those files
//! - Consumes the generation oracle's streamed response
//! - Re-generates truncated files, at most once each
//! - Collects the packages the final files need
//!
//! # Example
//!
//! ```rust,ignore
//! use scalpel_core::{EditConfig, EditPipeline, SessionHandle};
//!
//! # async fn example(oracle: std::sync::Arc<dyn scalpel_core::GenerationOracle>,
//! #                  manifest: scalpel_model::FileManifest) -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = EditPipeline::new(oracle, EditConfig::new())?;
//! let outcome = pipeline
//!     .run(&SessionHandle::new(), "make the header background black", &manifest)
//!     .await;
//!
//! for file in outcome.files() {
//!     println!("{} complete={}", file.path, file.complete);
//! }
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod instruction;
pub mod oracle;
pub mod pipeline;
pub mod session;

pub use config::{EditConfig, OracleConfig, RecoveryConfig};
pub use error::{ConfigError, OracleError, PipelineError};
pub use oracle::{
    ChunkStream, GenerationOracle, GenerationPurpose, GenerationRequest, PlanningOracle,
    PlanningRequest,
};
pub use pipeline::{EditOutcome, EditPipeline, RecoveryRecord, RecoveryStatus, ResolutionPath};
pub use session::{SessionHandle, SessionId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving the edit pipeline
    pub use crate::{
        EditConfig, EditOutcome, EditPipeline, GenerationOracle, OracleError, PlanningOracle,
        SessionHandle,
    };
    pub use scalpel_model::{EditIntent, EditType, FileManifest};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

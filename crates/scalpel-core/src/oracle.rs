//! Oracle seams
//!
//! The planning and generation services are external collaborators; the
//! pipeline only sees these traits.

use crate::error::OracleError;
use crate::session::SessionHandle;
use async_trait::async_trait;
use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

/// Live text stream from the generation oracle
pub type ChunkStream = BoxStream<'static, Result<String, OracleError>>;

/// Request for a search plan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanningRequest {
    /// Requesting session
    pub session: SessionHandle,
    /// System instruction
    pub system: String,
    /// User edit request
    pub prompt: String,
    /// One line per project file
    pub file_summary: String,
}

/// What a generation request is for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GenerationPurpose {
    /// Edit anchored on a search target
    SurgicalEdit,
    /// Edit scoped by a classified intent
    IntentEdit,
    /// Completion of one truncated file
    Recovery {
        /// File being completed
        path: String,
    },
}

/// Request for generated code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Requesting session
    pub session: SessionHandle,
    /// Request purpose
    pub purpose: GenerationPurpose,
    /// System instruction
    pub system: String,
    /// User instruction
    pub user: String,
    /// Files the response must contain
    pub required_files: Vec<String>,
}

/// Produces search plans
#[async_trait]
pub trait PlanningOracle: Send + Sync {
    /// Raw planning response; decoded with [`SearchPlan::from_json`](scalpel_search::SearchPlan::from_json)
    async fn plan(&self, request: &PlanningRequest) -> Result<String, OracleError>;
}

/// Produces tag-delimited code as a text stream
#[async_trait]
pub trait GenerationOracle: Send + Sync {
    /// Open a generation stream
    async fn generate(&self, request: &GenerationRequest) -> Result<ChunkStream, OracleError>;
}

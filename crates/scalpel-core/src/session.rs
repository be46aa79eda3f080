//! Explicit session identity
//!
//! The session (and the sandbox it edits, if any) is passed into every
//! pipeline call and oracle request rather than read from shared state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Unique edit session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Ulid);

impl SessionId {
    /// Generate new session ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    /// Underlying ULID
    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle for one edit request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandle {
    /// Session ID
    pub id: SessionId,
    /// Sandbox the results are destined for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sandbox_id: Option<String>,
    /// Creation time
    pub started_at: DateTime<Utc>,
}

impl SessionHandle {
    /// Create handle without a sandbox
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: SessionId::new(),
            sandbox_id: None,
            started_at: Utc::now(),
        }
    }

    /// With sandbox identity
    #[inline]
    #[must_use]
    pub fn with_sandbox(mut self, sandbox_id: impl Into<String>) -> Self {
        self.sandbox_id = Some(sandbox_id.into());
        self
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}

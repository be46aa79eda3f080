//! Search plan execution
//!
//! Locates exact evidence lines for an edit request:
//!
//! - [`SearchPlan`]: structured terms and patterns produced by the planning oracle
//! - [`SearchPlanExecutor`]: scans file contents line by line, ranks matches by
//!   [`MatchConfidence`] and falls back to the plan's secondary search when the
//!   primary one finds nothing
//! - [`TargetSelector`]: narrows ranked evidence to one `(file, line)` location

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod plan;
pub mod target;

pub use config::{SearchConfig, TargetingConfig};
pub use error::PlanError;
pub use executor::{
    MatchConfidence, Matcher, SearchExecutionResult, SearchPlanExecutor, SearchResult,
};
pub use plan::{FallbackSearch, SearchPlan};
pub use target::{EditTarget, TargetSelector};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

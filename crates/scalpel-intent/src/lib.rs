//! Edit intent classification
//!
//! Maps a free-text edit request onto an [`EditIntent`](scalpel_model::EditIntent)
//! without any oracle involvement:
//!
//! 1. An ordered list of [`IntentRule`]s is evaluated top to bottom against the
//!    lowercased prompt; the first rule that matches wins.
//! 2. The winning rule's edit type selects a [`CandidateResolver`] that turns
//!    prompt tokens into concrete target files.
//! 3. Confidence is assembled from [`ClassifierConfig`] weights.
//!
//! # Example
//!
//! ```rust,ignore
//! use scalpel_intent::IntentClassifier;
//!
//! let classifier = IntentClassifier::default();
//! let intent = classifier.classify("make the header background black", &manifest);
//! assert_eq!(intent.target_files, vec!["Header.jsx"]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classifier;
pub mod config;
pub mod error;
pub mod resolver;
pub mod rules;
pub mod tokens;

pub use classifier::{Classification, IntentClassifier};
pub use config::ClassifierConfig;
pub use error::RuleError;
pub use resolver::{CandidateResolver, Resolution, ResolutionSource, ResolverRegistry};
pub use rules::{default_rules, IntentRule, RuleMatch};
pub use tokens::PromptAnalysis;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

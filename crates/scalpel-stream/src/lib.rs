//! Streamed generation output handling
//!
//! Consumes the generation oracle's tag-delimited text stream:
//!
//! - [`StreamingFileExtractor`]: incremental lexer emitting file and auxiliary blocks
//! - [`FileSet`] / [`MergePolicy`]: duplicate file resolution
//! - [`TruncationAnalyzer`]: flags files that look cut off
//! - [`DependencyExtractor`]: package names from import statements
//! - [`drain_stream`]: async consumption of a chunk stream

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod deps;
pub mod drain;
pub mod extractor;
pub mod merge;
pub mod tags;
pub mod truncation;

pub use deps::{DependencyConfig, DependencyExtractor};
pub use drain::{drain_stream, drain_stream_with, DrainedStream};
pub use extractor::{
    ExtractionOutcome, GenerationSession, ParseState, StreamEvent, StreamingFileExtractor,
};
pub use merge::{CompletenessFirst, FileSet, MergeDecision, MergePolicy, ParsedFile};
pub use tags::{file_tag_balance, BlockTag, FILE_CLOSE, FILE_OPEN_PREFIX, MAX_OPEN_TAG_LEN};
pub use truncation::{
    HeuristicDetector, TruncationAnalyzer, TruncationConfig, TruncationHeuristic,
    TruncationReason, TruncationWarning,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! Scalpel data model
//!
//! Read-only project snapshot and the edit vocabulary shared by every stage of
//! an edit cycle.
//!
//! # Core Concepts
//!
//! - [`FileManifest`]: path → [`FileInfo`] snapshot built by an external introspection step
//! - [`EditType`]: classified category of an edit request
//! - [`EditIntent`]: target files, context files and confidence for one request
//! - [`EditAction`]: whether the request removes something, and what
//! - [`SourceLanguage`]: extension-based language detection
//!
//! # Example
//!
//! ```rust,ignore
//! use scalpel_model::{FileInfo, FileKind, FileManifest};
//!
//! let manifest = FileManifest::new()
//!     .with_file("src/App.jsx", FileInfo::new("export default function App() {}", FileKind::Component))
//!     .with_entry_point("src/App.jsx");
//!
//! assert!(manifest.contains("src/App.jsx"));
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod edit;
mod error;
mod language;
mod manifest;

pub use edit::{EditAction, EditIntent, EditType};
pub use error::ModelError;
pub use language::{
    extension_of, file_name, file_stem, is_component_source, SourceLanguage,
    COMPONENT_EXTENSIONS,
};
pub use manifest::{
    ComponentInfo, ComponentNode, FileContents, FileInfo, FileKind, FileManifest, ImportInfo,
    RouteInfo,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

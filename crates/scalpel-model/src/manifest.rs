//! Project file manifest
//!
//! A [`FileManifest`] is an immutable snapshot of the project for one edit
//! cycle. It is produced by an external introspection step and only read here.

use crate::error::ModelError;
use crate::language::file_stem;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Path → content map in discovery order
pub type FileContents = IndexMap<String, String>;

/// Role of a file inside the project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Reusable UI component
    Component,
    /// Routed page
    Page,
    /// Stylesheet
    Style,
    /// Build or tool configuration
    Config,
    /// Helper module
    Utility,
    /// Layout wrapper
    Layout,
    /// Custom hook
    Hook,
    /// Context provider
    Context,
}

/// One import statement as seen by the introspection step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportInfo {
    /// Module specifier
    pub source: String,
    /// Named bindings
    #[serde(default)]
    pub imports: Vec<String>,
    /// Default binding, if any
    #[serde(default)]
    pub default_import: Option<String>,
    /// Whether the specifier is project-local
    #[serde(default)]
    pub is_local: bool,
}

impl ImportInfo {
    /// Create import record for a specifier
    #[inline]
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        let source = source.into();
        let is_local = source.starts_with('.') || source.starts_with('/');
        Self {
            source,
            imports: Vec::new(),
            default_import: None,
            is_local,
        }
    }
}

/// Component metadata for a component-bearing file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentInfo {
    /// Component name
    pub name: String,
    /// Hooks used by the component
    #[serde(default)]
    pub hooks: Vec<String>,
    /// Whether the component keeps local state
    #[serde(default)]
    pub has_state: bool,
    /// Tag names of rendered child components
    #[serde(default)]
    pub child_components: Vec<String>,
}

impl ComponentInfo {
    /// Create component metadata with a name
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hooks: Vec::new(),
            has_state: false,
            child_components: Vec::new(),
        }
    }

    /// With rendered child components
    #[inline]
    #[must_use]
    pub fn with_children(mut self, children: Vec<String>) -> Self {
        self.child_components = children;
        self
    }
}

/// Per-file metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileInfo {
    /// Raw file content
    pub content: String,
    /// File role
    #[serde(rename = "type")]
    pub kind: FileKind,
    /// Import statements
    #[serde(default)]
    pub imports: Vec<ImportInfo>,
    /// Exported identifiers
    #[serde(default)]
    pub exports: Vec<String>,
    /// Component metadata
    #[serde(default)]
    pub component_info: Option<ComponentInfo>,
    /// Last modification time (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub last_modified: DateTime<Utc>,
}

impl FileInfo {
    /// Create file info with content and kind
    #[inline]
    #[must_use]
    pub fn new(content: impl Into<String>, kind: FileKind) -> Self {
        Self {
            content: content.into(),
            kind,
            imports: Vec::new(),
            exports: Vec::new(),
            component_info: None,
            last_modified: Utc::now(),
        }
    }

    /// With component metadata
    #[inline]
    #[must_use]
    pub fn with_component(mut self, component: ComponentInfo) -> Self {
        self.component_info = Some(component);
        self
    }

    /// With import records
    #[inline]
    #[must_use]
    pub fn with_imports(mut self, imports: Vec<ImportInfo>) -> Self {
        self.imports = imports;
        self
    }

    /// With exported identifiers
    #[inline]
    #[must_use]
    pub fn with_exports(mut self, exports: Vec<String>) -> Self {
        self.exports = exports;
        self
    }

    /// Component name, if the file defines one
    #[inline]
    #[must_use]
    pub fn component_name(&self) -> Option<&str> {
        self.component_info.as_ref().map(|c| c.name.as_str())
    }
}

/// Route detected in the project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteInfo {
    /// URL path
    pub path: String,
    /// Component rendered for the route
    pub component: String,
}

/// Node of the component dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentNode {
    /// Defining file path
    pub file: String,
    /// Component names this component imports
    #[serde(default)]
    pub imports: Vec<String>,
    /// Component names importing this component
    #[serde(default)]
    pub imported_by: Vec<String>,
}

/// Snapshot of a project for one resolution cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileManifest {
    /// Path → file metadata, in discovery order
    pub files: IndexMap<String, FileInfo>,
    /// Detected entry point
    #[serde(default)]
    pub entry_point: Option<String>,
    /// Stylesheet paths
    #[serde(default)]
    pub style_files: Vec<String>,
    /// Detected routes
    #[serde(default)]
    pub routes: Vec<RouteInfo>,
    /// Component name → graph node
    #[serde(default)]
    pub component_tree: IndexMap<String, ComponentNode>,
    /// Snapshot time (epoch milliseconds on the wire)
    #[serde(with = "chrono::serde::ts_milliseconds", default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Default for FileManifest {
    fn default() -> Self {
        Self {
            files: IndexMap::new(),
            entry_point: None,
            style_files: Vec::new(),
            routes: Vec::new(),
            component_tree: IndexMap::new(),
            timestamp: Utc::now(),
        }
    }
}

impl FileManifest {
    /// Create empty manifest
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a manifest from collaborator JSON
    pub fn from_json(json: &str) -> Result<Self, ModelError> {
        Ok(serde_json::from_str(json)?)
    }

    /// With a file; style files are also recorded in `style_files`
    #[must_use]
    pub fn with_file(mut self, path: impl Into<String>, info: FileInfo) -> Self {
        let path = path.into();
        if info.kind == FileKind::Style && !self.style_files.contains(&path) {
            self.style_files.push(path.clone());
        }
        if let Some(component) = &info.component_info {
            self.component_tree
                .entry(component.name.clone())
                .or_insert_with(|| ComponentNode {
                    file: path.clone(),
                    imports: component.child_components.clone(),
                    imported_by: Vec::new(),
                });
        }
        self.files.insert(path, info);
        self
    }

    /// With entry point
    #[inline]
    #[must_use]
    pub fn with_entry_point(mut self, path: impl Into<String>) -> Self {
        self.entry_point = Some(path.into());
        self
    }

    /// With a route
    #[inline]
    #[must_use]
    pub fn with_route(mut self, path: impl Into<String>, component: impl Into<String>) -> Self {
        self.routes.push(RouteInfo {
            path: path.into(),
            component: component.into(),
        });
        self
    }

    /// Get file metadata
    #[inline]
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&FileInfo> {
        self.files.get(path)
    }

    /// Check if path is part of the snapshot
    #[inline]
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    /// Paths in discovery order
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if manifest has no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Entry point path, if one was detected and is present
    #[must_use]
    pub fn entry_point(&self) -> Option<&str> {
        self.entry_point.as_deref()
    }

    /// Path → content view used by the search executor
    #[must_use]
    pub fn contents(&self) -> FileContents {
        self.files
            .iter()
            .map(|(path, info)| (path.clone(), info.content.clone()))
            .collect()
    }

    /// File defining a component, via the component graph or per-file metadata
    #[must_use]
    pub fn component_file(&self, name: &str) -> Option<&str> {
        if let Some(node) = self.component_tree.get(name) {
            return Some(node.file.as_str());
        }
        self.files
            .iter()
            .find(|(_, info)| info.component_name() == Some(name))
            .map(|(path, _)| path.as_str())
    }

    /// Components that render the given component
    #[must_use]
    pub fn parents_of(&self, name: &str) -> Vec<&str> {
        self.component_tree
            .get(name)
            .map(|node| node.imported_by.iter().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Searchable names for a path: file stem plus component name
    #[must_use]
    pub fn names_for(&self, path: &str) -> Vec<String> {
        let mut names = vec![file_stem(path).to_lowercase()];
        if let Some(component) = self.get(path).and_then(FileInfo::component_name) {
            let lowered = component.to_lowercase();
            if !names.contains(&lowered) {
                names.push(lowered);
            }
        }
        names
    }
}

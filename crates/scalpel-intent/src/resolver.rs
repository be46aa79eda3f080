//! Candidate file resolution
//!
//! One [`CandidateResolver`] per [`EditType`], looked up through a
//! [`ResolverRegistry`]. Resolvers narrow to a single existing file whenever
//! several match so that edits stay minimal.

use crate::tokens::{name_matches, PromptAnalysis};
use once_cell::sync::Lazy;
use regex::Regex;
use scalpel_model::{
    extension_of, file_name, is_component_source, EditType, FileKind, FileManifest,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a resolver arrived at its targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionSource {
    /// Removal subject found in file content
    Content,
    /// Prompt token found in a file or component name
    Name,
    /// UI element word mapped to a file name
    Dictionary,
    /// Project stylesheet
    StyleFile,
    /// Package manifest
    PackageFile,
    /// Proposed new file
    NewFile,
    /// Entry point fallback
    EntryPoint,
    /// Nothing found
    None,
}

/// Resolver output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Target file paths, ordered
    pub targets: Vec<String>,
    /// Explicit context files; `None` means every non-target manifest file
    pub context: Option<Vec<String>>,
    /// Whether a concrete target (not a fallback) was found
    pub concrete: bool,
    /// How the targets were found
    pub source: ResolutionSource,
}

impl Resolution {
    /// Concrete single-file resolution
    #[inline]
    #[must_use]
    pub fn found(path: impl Into<String>, source: ResolutionSource) -> Self {
        Self {
            targets: vec![path.into()],
            context: None,
            concrete: true,
            source,
        }
    }

    /// Fallback to the entry point, or nothing when there is none
    #[must_use]
    pub fn fallback(manifest: &FileManifest) -> Self {
        match manifest.entry_point().filter(|p| manifest.contains(p)) {
            Some(entry) => Self {
                targets: vec![entry.to_string()],
                context: None,
                concrete: false,
                source: ResolutionSource::EntryPoint,
            },
            None => Self {
                targets: Vec::new(),
                context: None,
                concrete: false,
                source: ResolutionSource::None,
            },
        }
    }
}

/// Resolves target files for one edit type
pub trait CandidateResolver: Send + Sync + fmt::Debug {
    /// Edit type this resolver serves
    fn edit_type(&self) -> EditType;

    /// Resolve targets for a prompt against a manifest snapshot
    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution;
}

/// Lookup helpers over a manifest snapshot
#[derive(Clone, Copy)]
struct Finder<'a> {
    manifest: &'a FileManifest,
}

impl<'a> Finder<'a> {
    fn new(manifest: &'a FileManifest) -> Self {
        Self { manifest }
    }

    /// Component sources first, then everything else, both in discovery order
    fn ordered_paths(&self, filter: fn(&str) -> bool) -> Vec<&'a str> {
        let (mut first, rest): (Vec<&str>, Vec<&str>) = self
            .manifest
            .paths()
            .filter(|p| filter(p))
            .partition(|p| is_component_source(p));
        first.extend(rest);
        first
    }

    /// First file whose content contains one of the phrases (case-insensitive)
    fn by_content(&self, phrases: &[String], filter: fn(&str) -> bool) -> Option<&'a str> {
        let paths = self.ordered_paths(filter);
        phrases
            .iter()
            .map(|p| p.to_lowercase())
            .filter(|p| !p.is_empty())
            .find_map(|phrase| {
                paths.iter().copied().find(|path| {
                    self.manifest
                        .get(path)
                        .map(|info| info.content.to_lowercase().contains(&phrase))
                        .unwrap_or(false)
                })
            })
    }

    /// First file whose stem or component name contains a token, tokens in prompt order
    fn by_name(&self, tokens: &[String], filter: fn(&str) -> bool) -> Option<&'a str> {
        let paths = self.ordered_paths(filter);
        tokens.iter().find_map(|token| {
            paths.iter().copied().find(|path| {
                self.manifest
                    .names_for(path)
                    .iter()
                    .any(|name| name_matches(name, token))
            })
        })
    }

    /// First file whose stem contains a UI dictionary fragment
    fn by_dictionary(&self, prompt: &PromptAnalysis, filter: fn(&str) -> bool) -> Option<&'a str> {
        let paths = self.ordered_paths(filter);
        prompt.ui_fragments().into_iter().find_map(|fragment| {
            paths.iter().copied().find(|path| {
                self.manifest
                    .names_for(path)
                    .iter()
                    .any(|name| name.contains(fragment))
            })
        })
    }

    /// Named file via tokens, then the UI dictionary
    fn named(&self, prompt: &PromptAnalysis, filter: fn(&str) -> bool) -> Option<Resolution> {
        if let Some(path) = self.by_name(&prompt.tokens, filter) {
            return Some(Resolution::found(path, ResolutionSource::Name));
        }
        self.by_dictionary(prompt, filter)
            .map(|path| Resolution::found(path, ResolutionSource::Dictionary))
    }
}

fn any_path(_: &str) -> bool {
    true
}

fn component_path(path: &str) -> bool {
    is_component_source(path)
}

/// Resolver for [`EditType::UpdateComponent`]
#[derive(Debug, Clone, Copy, Default)]
pub struct ComponentResolver;

impl CandidateResolver for ComponentResolver {
    fn edit_type(&self) -> EditType {
        EditType::UpdateComponent
    }

    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        let finder = Finder::new(manifest);

        if prompt.action.is_removal() {
            if let Some(path) = finder.by_content(&prompt.action.search_phrases(), component_path)
            {
                return Resolution::found(path, ResolutionSource::Content);
            }
        }

        finder
            .named(prompt, component_path)
            .unwrap_or_else(|| Resolution::fallback(manifest))
    }
}

static NEW_FEATURE_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:add|create|implement|build|include)\s+(?:a\s+|an\s+)?(?:new\s+)?([a-z][\w-]*)\s+(?:page|section|feature|component|form|modal)\b",
    )
    .unwrap()
});

/// Resolver for [`EditType::AddFeature`]
///
/// Targets the insertion point (a named file or the entry point) and, when the
/// prompt names a feature with no existing file, a proposed new component path.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureResolver;

impl FeatureResolver {
    fn proposed_path(name: &str, manifest: &FileManifest) -> String {
        let pascal: String = name
            .split(['-', '_'])
            .filter(|s| !s.is_empty())
            .map(|s| {
                let mut chars = s.chars();
                chars
                    .next()
                    .map(|c| c.to_uppercase().collect::<String>() + chars.as_str())
                    .unwrap_or_default()
            })
            .collect();

        let ext = manifest
            .entry_point()
            .and_then(extension_of)
            .filter(|e| matches!(*e, "jsx" | "tsx"))
            .unwrap_or("jsx");

        let dir = manifest
            .paths()
            .find(|p| p.contains("/components/"))
            .and_then(|p| p.rfind('/').map(|idx| p[..idx].to_string()))
            .or_else(|| {
                manifest.entry_point().map(|entry| match entry.rfind('/') {
                    Some(idx) => format!("{}/components", &entry[..idx]),
                    None => "components".to_string(),
                })
            })
            .unwrap_or_else(|| "src/components".to_string());

        format!("{dir}/{pascal}.{ext}")
    }
}

impl CandidateResolver for FeatureResolver {
    fn edit_type(&self) -> EditType {
        EditType::AddFeature
    }

    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        let finder = Finder::new(manifest);
        let feature = NEW_FEATURE_NAME
            .captures(&prompt.lowered)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string());

        let existing = finder.named(prompt, component_path);
        let mut resolution = existing.unwrap_or_else(|| Resolution::fallback(manifest));

        if let Some(name) = feature {
            let already_exists = finder
                .by_name(std::slice::from_ref(&name), component_path)
                .is_some();
            if !already_exists {
                let path = Self::proposed_path(&name, manifest);
                if !resolution.targets.contains(&path) {
                    resolution.targets.push(path);
                }
                resolution.concrete = true;
                if resolution.source == ResolutionSource::None {
                    resolution.source = ResolutionSource::NewFile;
                }
            }
        }

        resolution
    }
}

/// Resolver for [`EditType::FixIssue`]
#[derive(Debug, Clone, Copy, Default)]
pub struct IssueResolver;

impl CandidateResolver for IssueResolver {
    fn edit_type(&self) -> EditType {
        EditType::FixIssue
    }

    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        let finder = Finder::new(manifest);
        if let Some(resolution) = finder.named(prompt, component_path) {
            return resolution;
        }

        let terms: Vec<String> = prompt.tokens.iter().filter(|t| t.len() >= 4).cloned().collect();
        finder
            .by_content(&terms, component_path)
            .map(|path| Resolution::found(path, ResolutionSource::Content))
            .unwrap_or_else(|| Resolution::fallback(manifest))
    }
}

/// Resolver for [`EditType::UpdateStyle`]
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleResolver;

impl CandidateResolver for StyleResolver {
    fn edit_type(&self) -> EditType {
        EditType::UpdateStyle
    }

    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        let finder = Finder::new(manifest);
        if let Some(resolution) = finder.named(prompt, any_path) {
            return resolution;
        }

        let style_file = manifest
            .style_files
            .iter()
            .find(|p| manifest.contains(p))
            .map(String::as_str)
            .or_else(|| {
                manifest
                    .files
                    .iter()
                    .find(|(_, info)| info.kind == FileKind::Style)
                    .map(|(path, _)| path.as_str())
            });

        style_file
            .map(|path| Resolution::found(path, ResolutionSource::StyleFile))
            .unwrap_or_else(|| Resolution::fallback(manifest))
    }
}

/// Resolver for [`EditType::Refactor`]
#[derive(Debug, Clone, Copy, Default)]
pub struct RefactorResolver;

impl CandidateResolver for RefactorResolver {
    fn edit_type(&self) -> EditType {
        EditType::Refactor
    }

    fn resolve(&self, prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        Finder::new(manifest)
            .named(prompt, component_path)
            .unwrap_or_else(|| Resolution::fallback(manifest))
    }
}

/// Resolver for [`EditType::FullRebuild`]
///
/// Rebuilding needs no context; the entry point is rewritten (or created).
#[derive(Debug, Clone, Copy, Default)]
pub struct RebuildResolver;

/// Entry point proposed when the manifest has none
pub const DEFAULT_ENTRY_POINT: &str = "src/App.jsx";

impl CandidateResolver for RebuildResolver {
    fn edit_type(&self) -> EditType {
        EditType::FullRebuild
    }

    fn resolve(&self, _prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        let (target, concrete) = match manifest.entry_point() {
            Some(entry) => (entry.to_string(), true),
            None => (DEFAULT_ENTRY_POINT.to_string(), false),
        };
        Resolution {
            targets: vec![target],
            context: Some(Vec::new()),
            concrete,
            source: if concrete {
                ResolutionSource::EntryPoint
            } else {
                ResolutionSource::NewFile
            },
        }
    }
}

/// Resolver for [`EditType::AddDependency`]
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyResolver;

impl CandidateResolver for DependencyResolver {
    fn edit_type(&self) -> EditType {
        EditType::AddDependency
    }

    fn resolve(&self, _prompt: &PromptAnalysis, manifest: &FileManifest) -> Resolution {
        manifest
            .paths()
            .find(|p| file_name(p) == "package.json")
            .map(|path| Resolution::found(path, ResolutionSource::PackageFile))
            .unwrap_or_else(|| Resolution::fallback(manifest))
    }
}

/// Resolver lookup keyed by edit type
pub struct ResolverRegistry {
    resolvers: Vec<Box<dyn CandidateResolver>>,
}

impl fmt::Debug for ResolverRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolverRegistry")
            .field(
                "edit_types",
                &self.resolvers.iter().map(|r| r.edit_type()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Default for ResolverRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(ComponentResolver);
        registry.register(FeatureResolver);
        registry.register(IssueResolver);
        registry.register(StyleResolver);
        registry.register(RefactorResolver);
        registry.register(RebuildResolver);
        registry.register(DependencyResolver);
        registry
    }
}

impl ResolverRegistry {
    /// Create registry without resolvers
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self {
            resolvers: Vec::new(),
        }
    }

    /// Register a resolver, replacing any previous one for the same edit type
    pub fn register<R: CandidateResolver + 'static>(&mut self, resolver: R) {
        self.resolvers.retain(|r| r.edit_type() != resolver.edit_type());
        self.resolvers.push(Box::new(resolver));
    }

    /// Find resolver for an edit type
    #[must_use]
    pub fn find(&self, edit_type: EditType) -> Option<&dyn CandidateResolver> {
        self.resolvers
            .iter()
            .find(|r| r.edit_type() == edit_type)
            .map(|r| &**r)
    }

    /// Resolve with the registered resolver, falling back to the entry point
    #[must_use]
    pub fn resolve(
        &self,
        edit_type: EditType,
        prompt: &PromptAnalysis,
        manifest: &FileManifest,
    ) -> Resolution {
        match self.find(edit_type) {
            Some(resolver) => resolver.resolve(prompt, manifest),
            None => {
                tracing::warn!("No resolver registered for {}", edit_type);
                Resolution::fallback(manifest)
            }
        }
    }
}

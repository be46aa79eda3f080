//! Source language detection
//!
//! Languages are inferred from file extensions only; no content is parsed.

use serde::{Deserialize, Serialize};

/// Extensions whose files hold renderable component source
pub const COMPONENT_EXTENSIONS: &[&str] = &["jsx", "tsx", "js", "ts", "vue", "svelte"];

/// Languages found in a generated web project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceLanguage {
    /// JavaScript, including JSX and module variants
    JavaScript,
    /// TypeScript, including TSX
    TypeScript,
    /// Stylesheets (CSS and preprocessors)
    Css,
    /// HTML documents
    Html,
    /// JSON documents
    Json,
    /// Markdown documents
    Markdown,
    /// Anything else
    Other,
}

impl SourceLanguage {
    /// Get file extensions for this language
    #[inline]
    #[must_use]
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            SourceLanguage::JavaScript => &["js", "jsx", "mjs", "cjs"],
            SourceLanguage::TypeScript => &["ts", "tsx"],
            SourceLanguage::Css => &["css", "scss", "sass", "less"],
            SourceLanguage::Html => &["html", "htm"],
            SourceLanguage::Json => &["json"],
            SourceLanguage::Markdown => &["md", "mdx"],
            SourceLanguage::Other => &[],
        }
    }

    /// Get human-readable name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            SourceLanguage::JavaScript => "javascript",
            SourceLanguage::TypeScript => "typescript",
            SourceLanguage::Css => "css",
            SourceLanguage::Html => "html",
            SourceLanguage::Json => "json",
            SourceLanguage::Markdown => "markdown",
            SourceLanguage::Other => "other",
        }
    }

    /// Detect language from a path's extension
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        let Some(ext) = extension_of(path) else {
            return SourceLanguage::Other;
        };

        [
            SourceLanguage::JavaScript,
            SourceLanguage::TypeScript,
            SourceLanguage::Css,
            SourceLanguage::Html,
            SourceLanguage::Json,
            SourceLanguage::Markdown,
        ]
        .into_iter()
        .find(|lang| lang.extensions().iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(SourceLanguage::Other)
    }

    /// Script-like languages carry imports and brace-delimited bodies
    #[inline]
    #[must_use]
    pub fn is_script_like(&self) -> bool {
        matches!(self, SourceLanguage::JavaScript | SourceLanguage::TypeScript)
    }

    /// Check if this is a stylesheet language
    #[inline]
    #[must_use]
    pub fn is_stylesheet(&self) -> bool {
        matches!(self, SourceLanguage::Css)
    }
}

/// Final path segment
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Final path segment without its extension
#[must_use]
pub fn file_stem(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Extension of the final path segment, without the dot
#[must_use]
pub fn extension_of(path: &str) -> Option<&str> {
    let name = file_name(path);
    match name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < name.len() => Some(&name[idx + 1..]),
        _ => None,
    }
}

/// Check if a path points at component source rather than a stylesheet or data file
#[must_use]
pub fn is_component_source(path: &str) -> bool {
    extension_of(path)
        .map(|ext| COMPONENT_EXTENSIONS.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_extensions() {
        assert_eq!(SourceLanguage::TypeScript.extensions(), &["ts", "tsx"]);
        assert!(SourceLanguage::Css.extensions().contains(&"scss"));
    }

    #[test]
    fn detect_from_path() {
        assert_eq!(SourceLanguage::from_path("src/App.jsx"), SourceLanguage::JavaScript);
        assert_eq!(SourceLanguage::from_path("src/main.TSX"), SourceLanguage::TypeScript);
        assert_eq!(SourceLanguage::from_path("src/index.css"), SourceLanguage::Css);
        assert_eq!(SourceLanguage::from_path("package.json"), SourceLanguage::Json);
        assert_eq!(SourceLanguage::from_path("Dockerfile"), SourceLanguage::Other);
        assert_eq!(SourceLanguage::from_path(".env"), SourceLanguage::Other);
    }

    #[test]
    fn script_like_languages() {
        assert!(SourceLanguage::JavaScript.is_script_like());
        assert!(SourceLanguage::TypeScript.is_script_like());
        assert!(!SourceLanguage::Css.is_script_like());
    }

    #[test]
    fn path_segments() {
        assert_eq!(file_name("/app/src/components/Hero.jsx"), "Hero.jsx");
        assert_eq!(file_stem("/app/src/components/Hero.jsx"), "Hero");
        assert_eq!(file_stem("README"), "README");
        assert_eq!(extension_of("src/styles/main.module.css"), Some("css"));
        assert_eq!(extension_of("src/file."), None);
    }

    #[test]
    fn component_source_detection() {
        assert!(is_component_source("src/Hero.jsx"));
        assert!(is_component_source("src/App.vue"));
        assert!(!is_component_source("src/index.css"));
    }
}

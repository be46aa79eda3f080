//! Package dependency extraction from generated sources

use crate::merge::ParsedFile;
use indexmap::IndexSet;
use once_cell::sync::Lazy;
use regex::Regex;
use scalpel_model::SourceLanguage;
use serde::{Deserialize, Serialize};

/// `import x from 'y'`, `import { a, b } from "y"`, `import * as n from 'y'`,
/// `import 'y'`, `import type { T } from 'y'`
static IMPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bimport\s+(?:[\w*{}\s,$]+?\s+from\s+)?['"]([^'"\n]+)['"]"#).unwrap()
});

/// `export { a } from 'y'`, `export * from 'y'`
static EXPORT_FROM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\bexport\s+(?:\*(?:\s+as\s+\w+)?|\{[^}]*\})\s+from\s+['"]([^'"\n]+)['"]"#)
        .unwrap()
});

/// `import('y')` and `require('y')`
static CALL_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\b(?:import|require)\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#).unwrap()
});

/// Extraction settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DependencyConfig {
    /// Specifier prefixes that resolve inside the project
    pub alias_prefixes: Vec<String>,
    /// Packages the runtime always provides
    pub builtin_packages: Vec<String>,
}

impl Default for DependencyConfig {
    fn default() -> Self {
        Self {
            alias_prefixes: vec!["@/".to_string(), "~/".to_string()],
            builtin_packages: vec!["react".to_string(), "react-dom".to_string()],
        }
    }
}

/// Collects package names from import statements
#[derive(Debug, Clone, Default)]
pub struct DependencyExtractor {
    config: DependencyConfig,
}

impl DependencyExtractor {
    /// Create extractor with default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create extractor with explicit settings
    #[inline]
    #[must_use]
    pub fn with_config(config: DependencyConfig) -> Self {
        Self { config }
    }

    /// Package names imported by one source text, in order of appearance
    #[must_use]
    pub fn extract_content(&self, content: &str) -> Vec<String> {
        let mut found: Vec<(usize, &str)> = [&*IMPORT_FROM, &*EXPORT_FROM, &*CALL_IMPORT]
            .into_iter()
            .flat_map(|re| re.captures_iter(content))
            .filter_map(|caps| caps.get(1))
            .map(|m| (m.start(), m.as_str()))
            .collect();
        found.sort_by_key(|(pos, _)| *pos);

        let mut packages = IndexSet::new();
        for (_, specifier) in found {
            if let Some(name) = self.package_name(specifier) {
                packages.insert(name);
            }
        }
        packages.into_iter().collect()
    }

    /// Package names across script files, first occurrence wins
    #[must_use]
    pub fn extract_files(&self, files: &[ParsedFile]) -> Vec<String> {
        let mut packages = IndexSet::new();
        for file in files
            .iter()
            .filter(|f| SourceLanguage::from_path(&f.path).is_script_like())
        {
            packages.extend(self.extract_content(&file.content));
        }
        packages.into_iter().collect()
    }

    /// Explicitly declared packages first, then imported ones
    #[must_use]
    pub fn collect(&self, declared: &[String], files: &[ParsedFile]) -> Vec<String> {
        let mut packages: IndexSet<String> = declared
            .iter()
            .filter_map(|name| self.declared_name(name))
            .collect();
        packages.extend(self.extract_files(files));
        packages.into_iter().collect()
    }

    /// Package for an import specifier; `None` for local and builtin modules
    #[must_use]
    pub fn package_name(&self, specifier: &str) -> Option<String> {
        let specifier = specifier.trim();
        if specifier.is_empty()
            || specifier.starts_with('.')
            || specifier.starts_with('/')
            || self
                .config
                .alias_prefixes
                .iter()
                .any(|p| specifier.starts_with(p.as_str()))
        {
            return None;
        }

        let mut segments = specifier.split('/');
        let name = if specifier.starts_with('@') {
            match (segments.next(), segments.next()) {
                (Some(scope), Some(pkg)) if !pkg.is_empty() => format!("{scope}/{pkg}"),
                _ => return None,
            }
        } else {
            segments.next()?.to_string()
        };

        self.keep(name)
    }

    /// Declared name without a version suffix (`lodash@4` → `lodash`)
    fn declared_name(&self, name: &str) -> Option<String> {
        let name = name.trim();
        let bare = match name.char_indices().skip(1).find(|(_, c)| *c == '@') {
            Some((idx, _)) => &name[..idx],
            None => name,
        };
        if bare.is_empty() {
            return None;
        }
        self.keep(bare.to_string())
    }

    fn keep(&self, name: String) -> Option<String> {
        if self.config.builtin_packages.iter().any(|b| *b == name) {
            None
        } else {
            Some(name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn import_forms() {
        let content = r#"
import React, { useState } from 'react'
import * as Icons from "lucide-react"
import {
  motion,
  AnimatePresence,
} from 'framer-motion'
import 'swiper/css'
import type { Props } from '@/types'
export { cn } from 'clsx'
const dayjs = require('dayjs/plugin/utc')
const Chart = lazy(() => import('react-chartjs-2'))
import Header from './Header'
"#;
        assert_eq!(
            DependencyExtractor::new().extract_content(content),
            vec!["lucide-react", "framer-motion", "swiper", "clsx", "dayjs", "react-chartjs-2"]
        );
    }

    #[test]
    fn scoped_specifiers_collapse() {
        let extractor = DependencyExtractor::new();
        assert_eq!(extractor.package_name("@scope/pkg/sub/x").as_deref(), Some("@scope/pkg"));
        assert_eq!(extractor.package_name("pkg/sub/path").as_deref(), Some("pkg"));
        assert_eq!(extractor.package_name("@scope"), None);
        assert_eq!(extractor.package_name("react-dom/client"), None);
        assert_eq!(extractor.package_name("~/lib/util"), None);
        assert_eq!(extractor.package_name("/abs/path"), None);
    }

    #[test]
    fn only_script_files_are_scanned() {
        let files = vec![
            ParsedFile::new("src/index.css", "@import 'tailwindcss/base';", true),
            ParsedFile::new("src/main.tsx", "import axios from 'axios'", true),
            ParsedFile::new("README.md", "import x from 'nope'", true),
        ];
        assert_eq!(DependencyExtractor::new().extract_files(&files), vec!["axios"]);
    }

    #[test]
    fn declared_versions_are_stripped() {
        let files = vec![ParsedFile::new("a.js", "import _ from 'lodash'", true)];
        let declared = vec!["lodash@4.17.21".to_string(), "@tanstack/react-query@5".to_string(), "react".to_string()];
        assert_eq!(
            DependencyExtractor::new().collect(&declared, &files),
            vec!["lodash", "@tanstack/react-query"]
        );
    }
}

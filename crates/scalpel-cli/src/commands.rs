//! Subcommand implementations
//!
//! Each command takes already-loaded inputs and returns a serializable report,
//! so the binary only handles file I/O and printing.

use futures::stream;
use scalpel_core::EditConfig;
use scalpel_intent::{Classification, IntentClassifier};
use scalpel_model::{EditAction, FileManifest};
use scalpel_search::{EditTarget, SearchExecutionResult, SearchPlan, SearchPlanExecutor, TargetSelector};
use scalpel_stream::{
    drain_stream, DependencyExtractor, ExtractionOutcome, ParsedFile, TruncationAnalyzer,
    TruncationWarning,
};
use serde::Serialize;
use std::convert::Infallible;

/// `classify` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifyReport {
    pub prompt: String,
    #[serde(flatten)]
    pub classification: Classification,
}

/// `search` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchReport {
    pub plan: SearchPlan,
    pub execution: SearchExecutionResult,
    pub target: Option<EditTarget>,
}

/// `extract` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractReport {
    pub chunks: usize,
    #[serde(flatten)]
    pub outcome: ExtractionOutcome,
    pub warnings: Vec<TruncationWarning>,
    pub dependencies: Vec<String>,
}

/// `deps` output
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepsReport {
    pub files_scanned: usize,
    pub packages: Vec<String>,
}

pub fn classify(
    prompt: &str,
    manifest: &FileManifest,
    config: &EditConfig,
) -> anyhow::Result<ClassifyReport> {
    let classifier = IntentClassifier::new()?.with_config(config.classifier);
    Ok(ClassifyReport {
        prompt: prompt.to_string(),
        classification: classifier.classify_detailed(prompt, manifest),
    })
}

/// Execute a plan and select a target; `prompt` only informs removal handling
pub fn search(
    plan_json: &str,
    manifest: &FileManifest,
    prompt: Option<&str>,
    config: &EditConfig,
) -> anyhow::Result<SearchReport> {
    let plan = SearchPlan::from_json(plan_json)?;
    let execution =
        SearchPlanExecutor::with_config(config.search.clone()).execute(&plan, &manifest.contents());
    let action = prompt.map_or(EditAction::Modify, EditAction::from_prompt);
    let target = TargetSelector::new().select(&execution.results, plan.edit_type, &action);

    Ok(SearchReport {
        plan,
        execution,
        target,
    })
}

/// Replay a saved response, split into `chunk_size`-byte chunks
pub async fn extract(response: &str, chunk_size: usize, config: &EditConfig) -> ExtractReport {
    let chunks = chunk(response, chunk_size);
    let drained = drain_stream(stream::iter(chunks.into_iter().map(Ok::<_, Infallible>))).await;

    let warnings = TruncationAnalyzer::with_config(config.truncation).analyze(&drained.outcome);
    let dependencies = DependencyExtractor::with_config(config.dependencies.clone())
        .collect(&drained.outcome.packages, &drained.outcome.files);

    ExtractReport {
        chunks: drained.chunks,
        outcome: drained.outcome,
        warnings,
        dependencies,
    }
}

/// Packages imported anywhere in the manifest
#[must_use]
pub fn deps(manifest: &FileManifest, config: &EditConfig) -> DepsReport {
    let files: Vec<ParsedFile> = manifest
        .files
        .iter()
        .map(|(path, info)| ParsedFile::new(path.clone(), info.content.clone(), true))
        .collect();
    let packages = DependencyExtractor::with_config(config.dependencies.clone()).extract_files(&files);

    DepsReport {
        files_scanned: files.len(),
        packages,
    }
}

fn chunk(text: &str, size: usize) -> Vec<String> {
    if size == 0 || text.is_empty() {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < text.len() {
        let mut end = (start + size).min(text.len());
        while !text.is_char_boundary(end) {
            end += 1;
        }
        chunks.push(text[start..end].to_string());
        start = end;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn chunking_respects_char_boundaries() {
        assert_eq!(chunk("abcdef", 4), vec!["abcd", "ef"]);
        assert_eq!(chunk("héllo", 2), vec!["hé", "ll", "o"]);
        assert_eq!(chunk("abc", 0), vec!["abc"]);
    }

    #[tokio::test]
    async fn extract_reports_dependencies() {
        let response = "<file path=\"src/A.jsx\">import axios from 'axios'\nexport const A = 1</file>";
        let report = extract(response, 7, &EditConfig::default()).await;
        assert_eq!(report.outcome.files.len(), 1);
        assert_eq!(report.dependencies, vec!["axios"]);
        assert!(report.warnings.is_empty());
        assert!(report.chunks > 1);
    }
}

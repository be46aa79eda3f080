//! Oracle instructions
//!
//! Builds the planning, edit and recovery requests. Edit requests always name
//! the files the oracle may touch; everything else is marked read-only.

use crate::oracle::{GenerationPurpose, GenerationRequest, PlanningRequest};
use crate::session::SessionHandle;
use scalpel_model::{EditIntent, FileKind, FileManifest};
use scalpel_search::{EditTarget, SearchResult};
use scalpel_stream::{ParsedFile, StreamingFileExtractor};

/// Planning system instruction
pub const PLANNING_SYSTEM: &str = "You locate code for an edit request. \
Reply with one JSON object: {\"editType\": one of UPDATE_COMPONENT, ADD_FEATURE, FIX_ISSUE, \
UPDATE_STYLE, REFACTOR, FULL_REBUILD, ADD_DEPENDENCY, \"reasoning\": string, \
\"searchTerms\": [exact text likely present in the code], \"regexPatterns\": [optional], \
\"fileTypesToSearch\": [optional extensions], \"fallbackSearch\": {\"terms\": [], \"patterns\": []}}. \
Prefer literal strings copied from visible UI text or class names.";

/// Edit system instruction
pub const EDIT_SYSTEM: &str = "You edit an existing codebase. Change only what the request needs. \
Return every changed file in full inside <file path=\"...\">...</file>. \
Declare new npm packages in <package>name</package> or <packages> with one name per line. \
Put shell commands in <command>...</command> and a short summary in <explanation>...</explanation>. \
Never return files you did not change.";

/// Recovery system instruction
pub const RECOVERY_SYSTEM: &str = "A previous response was cut off. \
Return the complete file, from the first line to the last, inside a single <file path=\"...\">...</file> block. \
Do not add commentary.";

/// One line per manifest file: path, kind, component and children
#[must_use]
pub fn file_summary(manifest: &FileManifest) -> String {
    let mut out = String::new();
    for (path, info) in &manifest.files {
        out.push_str(&format!("- {path} ({})", kind_name(info.kind)));
        if let Some(component) = &info.component_info {
            out.push_str(" component ");
            out.push_str(&component.name);
            if !component.child_components.is_empty() {
                out.push_str(" renders ");
                out.push_str(&component.child_components.join(", "));
            }
        }
        if manifest.entry_point() == Some(path.as_str()) {
            out.push_str(" [entry]");
        }
        out.push('\n');
    }
    out
}

fn kind_name(kind: FileKind) -> &'static str {
    match kind {
        FileKind::Component => "component",
        FileKind::Page => "page",
        FileKind::Style => "style",
        FileKind::Config => "config",
        FileKind::Utility => "utility",
        FileKind::Layout => "layout",
        FileKind::Hook => "hook",
        FileKind::Context => "context",
    }
}

/// Planning request for a prompt
#[must_use]
pub fn planning_request(
    session: &SessionHandle,
    prompt: &str,
    manifest: &FileManifest,
) -> PlanningRequest {
    PlanningRequest {
        session: session.clone(),
        system: PLANNING_SYSTEM.to_string(),
        prompt: prompt.to_string(),
        file_summary: file_summary(manifest),
    }
}

/// Ranked evidence as text
#[must_use]
pub fn format_results(results: &[SearchResult]) -> String {
    let mut out = String::new();
    for (rank, result) in results.iter().enumerate() {
        out.push_str(&format!(
            "{}. {}:{} [{}] matched {}\n",
            rank + 1,
            result.file_path,
            result.line_number,
            result.confidence.as_str(),
            result.matched.text()
        ));
        let first = result.line_number.saturating_sub(result.context_before.len());
        for (offset, line) in result.context_before.iter().enumerate() {
            out.push_str(&format!("   {:>4} | {line}\n", first + offset));
        }
        out.push_str(&format!(" > {:>4} | {}\n", result.line_number, result.line_content));
        for (offset, line) in result.context_after.iter().enumerate() {
            out.push_str(&format!("   {:>4} | {line}\n", result.line_number + 1 + offset));
        }
    }
    out
}

/// Edit anchored on one `(file, line)`; only that file may be returned
#[must_use]
pub fn surgical_instruction(
    session: &SessionHandle,
    prompt: &str,
    target: &EditTarget,
    results: &[SearchResult],
    file_content: &str,
) -> GenerationRequest {
    let path = &target.file_path;
    let user = format!(
        "Request: {prompt}\n\n\
         Edit {path} at line {} ({}).\n\n\
         Evidence:\n{}\n\
         Current content of {path}:\n<file path=\"{path}\">\n{file_content}\n</file>\n\n\
         Return only {path} with the change applied. Keep every other line exactly as it is.",
        target.line_number,
        target.reason,
        format_results(results),
    );

    GenerationRequest {
        session: session.clone(),
        purpose: GenerationPurpose::SurgicalEdit,
        system: EDIT_SYSTEM.to_string(),
        user,
        required_files: vec![target.file_path.clone()],
    }
}

/// Edit scoped by a classified intent: targets editable, context read-only
#[must_use]
pub fn intent_instruction(
    session: &SessionHandle,
    prompt: &str,
    intent: &EditIntent,
    manifest: &FileManifest,
) -> GenerationRequest {
    let mut user = format!(
        "Request: {prompt}\nEdit type: {}\n\n",
        intent.edit_type.label()
    );

    if !intent.target_files.is_empty() {
        user.push_str("Files you may change or create:\n");
        for path in &intent.target_files {
            let entry = match manifest.get(path) {
                Some(info) => format!("<file path=\"{path}\">\n{}\n</file>\n", info.content),
                None => format!("- {path} (new file)\n"),
            };
            user.push_str(&entry);
        }
    }

    let context: Vec<_> = intent
        .suggested_context
        .iter()
        .filter_map(|path| manifest.get(path).map(|info| (path, info)))
        .collect();
    if !context.is_empty() {
        user.push_str("\nRead-only context, do not return these files:\n");
        for (path, info) in context {
            user.push_str(&format!("<context path=\"{path}\">\n{}\n</context>\n", info.content));
        }
    }

    GenerationRequest {
        session: session.clone(),
        purpose: GenerationPurpose::IntentEdit,
        system: EDIT_SYSTEM.to_string(),
        user,
        required_files: intent.target_files.clone(),
    }
}

/// Ask for the complete version of one truncated file
#[must_use]
pub fn recovery_instruction(
    session: &SessionHandle,
    path: &str,
    partial_content: &str,
    original_prompt: &str,
) -> GenerationRequest {
    let user = format!(
        "Original request: {original_prompt}\n\n\
         The file {path} was cut off. Partial content:\n{partial_content}\n\n\
         Return the complete {path}."
    );

    GenerationRequest {
        session: session.clone(),
        purpose: GenerationPurpose::Recovery {
            path: path.to_string(),
        },
        system: RECOVERY_SYSTEM.to_string(),
        user,
        required_files: vec![path.to_string()],
    }
}

/// File for `path` from a recovery response
///
/// Takes the `<file>` block for that path, keeping its completeness flag. A
/// single block under another path is taken as the file. Without any block the
/// whole response with code fences removed is used. `None` for an empty
/// response or several blocks none of which names `path`.
#[must_use]
pub fn recovered_file(path: &str, response: &str) -> Option<ParsedFile> {
    let outcome = StreamingFileExtractor::extract_all(response);
    if let Some(file) = outcome.file(path) {
        return Some(file.clone());
    }

    match outcome.files.as_slice() {
        [] => {
            let body = strip_code_fence(response.trim()).trim();
            (!body.is_empty()).then(|| ParsedFile::new(path, body, true))
        }
        [only] => Some(ParsedFile::new(path, only.content.clone(), only.complete)),
        _ => None,
    }
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let body = rest.find('\n').map_or("", |idx| &rest[idx + 1..]);
    body.strip_suffix("```").unwrap_or(body)
}

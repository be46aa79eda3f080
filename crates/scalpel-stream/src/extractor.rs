//! Streaming file extractor
//!
//! An incremental lexer over oracle output. Chunk boundaries are arbitrary,
//! so only text that can no longer be part of a marker is committed; a short
//! tail is held back in `pending` until the next chunk arrives. Feeding one
//! response as a single chunk or split at any byte offsets yields the same
//! [`ExtractionOutcome`].

use crate::merge::{CompletenessFirst, FileSet, MergeDecision, MergePolicy, ParsedFile};
use crate::tags::{
    file_tag_balance, floor_char_boundary, BlockTag, FILE_BODY_LOOKBACK, FILE_CLOSE,
    FILE_OPEN_PREFIX, MAX_OPEN_TAG_LEN,
};
use serde::{Deserialize, Serialize};
use std::mem;
use tracing::{debug, warn};

/// Lexer state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ParseState {
    /// Outside any block
    #[default]
    Idle,
    /// `pending` starts with `<` that has not resolved to a tag or plain text
    InOpenTagCandidate,
    /// Accumulating a file body
    InFileBody {
        /// Path from the open tag
        path: String,
        /// Content committed so far
        content: String,
    },
    /// Accumulating an auxiliary block body
    InOtherTagBody {
        /// Open block
        tag: BlockTag,
        /// Content committed so far
        content: String,
    },
}

/// Incremental extraction events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// File open tag recognised
    FileStarted {
        /// Declared path
        path: String,
    },
    /// File block finalized; `complete` is false when the stream ended inside it
    FileCompleted(ParsedFile),
    /// Auxiliary block closed
    BlockCompleted {
        /// Block kind
        tag: BlockTag,
        /// Trimmed body
        content: String,
    },
    /// Free text outside any tag
    Text(String),
}

/// Working state of one generation
#[derive(Debug, Default)]
pub struct GenerationSession {
    raw: String,
    state: ParseState,
    files: FileSet,
    packages: Vec<String>,
    commands: Vec<String>,
    explanation: Option<String>,
    structure: Option<String>,
    template: Option<String>,
    commentary: String,
    unterminated: Vec<BlockTag>,
    finished: bool,
}

impl GenerationSession {
    /// Raw text received so far
    #[inline]
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Current lexer state
    #[inline]
    #[must_use]
    pub fn state(&self) -> &ParseState {
        &self.state
    }

    /// Path and partial content of the open file, if any
    #[must_use]
    pub fn open_file(&self) -> Option<(&str, &str)> {
        match &self.state {
            ParseState::InFileBody { path, content } => Some((path.as_str(), content.as_str())),
            _ => None,
        }
    }

    /// Finalized files
    #[inline]
    #[must_use]
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Check if a path has already been finalized
    #[inline]
    #[must_use]
    pub fn is_finalized(&self, path: &str) -> bool {
        self.files.contains(path)
    }

    /// Package names from package blocks
    #[inline]
    #[must_use]
    pub fn packages(&self) -> &[String] {
        &self.packages
    }

    /// Commands from command blocks
    #[inline]
    #[must_use]
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    fn push_package(&mut self, name: &str) {
        let name = name.trim();
        if !name.is_empty() && !self.packages.iter().any(|p| p == name) {
            self.packages.push(name.to_string());
        }
    }
}

/// Everything extracted from one response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionOutcome {
    /// Path-unique files in first-seen order
    pub files: Vec<ParsedFile>,
    /// Package names from package blocks, deduplicated
    pub packages: Vec<String>,
    /// Shell commands
    pub commands: Vec<String>,
    /// Explanation text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    /// Structure block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structure: Option<String>,
    /// Template block
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    /// Free text outside tags, trimmed
    pub commentary: String,
    /// Auxiliary blocks still open when the stream ended (discarded)
    pub unterminated_blocks: Vec<BlockTag>,
    /// Full response text
    #[serde(skip)]
    pub raw: String,
}

impl ExtractionOutcome {
    /// Get file by path
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&ParsedFile> {
        self.files.iter().find(|f| f.path == path)
    }

    /// Files whose close tag was never observed
    pub fn incomplete_files(&self) -> impl Iterator<Item = &ParsedFile> {
        self.files.iter().filter(|f| !f.complete)
    }

    /// File open / close tag counts over the whole response
    #[must_use]
    pub fn tag_balance(&self) -> (usize, usize) {
        file_tag_balance(&self.raw)
    }

    /// Overwrite a file in place, or append it
    pub fn replace_file(&mut self, file: ParsedFile) {
        match self.files.iter_mut().find(|f| f.path == file.path) {
            Some(existing) => *existing = file,
            None => self.files.push(file),
        }
    }
}

enum OpenTag {
    File { path: String, consumed: usize },
    Block(BlockTag),
    Pending,
    NotATag,
}

/// Incremental extractor over a chunked text stream
///
/// Chunks must be fed strictly in arrival order.
#[derive(Debug)]
pub struct StreamingFileExtractor {
    session: GenerationSession,
    pending: String,
    policy: Box<dyn MergePolicy>,
}

impl Default for StreamingFileExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamingFileExtractor {
    /// Create extractor with the [`CompletenessFirst`] merge policy
    #[must_use]
    pub fn new() -> Self {
        Self::with_policy(CompletenessFirst)
    }

    /// Create extractor with a custom merge policy
    #[must_use]
    pub fn with_policy<P: MergePolicy + 'static>(policy: P) -> Self {
        Self {
            session: GenerationSession::default(),
            pending: String::new(),
            policy: Box::new(policy),
        }
    }

    /// Extract a complete response in one call
    #[must_use]
    pub fn extract_all(text: &str) -> ExtractionOutcome {
        let mut extractor = Self::new();
        extractor.feed(text);
        extractor.finish()
    }

    /// Session state
    #[inline]
    #[must_use]
    pub fn session(&self) -> &GenerationSession {
        &self.session
    }

    /// Feed the next chunk
    pub fn feed(&mut self, chunk: &str) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.session.finished || chunk.is_empty() {
            return events;
        }
        self.session.raw.push_str(chunk);
        self.pending.push_str(chunk);
        while self.step(&mut events) {}
        events
    }

    /// Signal end of stream; an open file is finalized as incomplete
    pub fn end(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.session.finished {
            return events;
        }
        self.session.finished = true;

        match mem::take(&mut self.session.state) {
            ParseState::Idle | ParseState::InOpenTagCandidate => {
                let rest = mem::take(&mut self.pending);
                self.text(rest, &mut events);
            }
            ParseState::InFileBody { path, mut content } => {
                content.push_str(&mem::take(&mut self.pending));
                warn!(path = %path, "Stream ended inside file block");
                self.finalize_file(path, &content, false, &mut events);
            }
            ParseState::InOtherTagBody { tag, .. } => {
                self.pending.clear();
                warn!(tag = %tag, "Stream ended inside block, discarding it");
                self.session.unterminated.push(tag);
            }
        }
        events
    }

    /// End the stream and collect the outcome
    #[must_use]
    pub fn finish(mut self) -> ExtractionOutcome {
        self.end();
        let session = self.session;
        ExtractionOutcome {
            files: session.files.into_files(),
            packages: session.packages,
            commands: session.commands,
            explanation: session.explanation,
            structure: session.structure,
            template: session.template,
            commentary: session.commentary.trim().to_string(),
            unterminated_blocks: session.unterminated,
            raw: session.raw,
        }
    }

    /// Advance once; false when more input is needed
    fn step(&mut self, events: &mut Vec<StreamEvent>) -> bool {
        match mem::take(&mut self.session.state) {
            ParseState::Idle => {
                if self.pending.is_empty() {
                    return false;
                }
                match self.pending.find('<') {
                    Some(idx) => {
                        let text: String = self.pending.drain(..idx).collect();
                        self.text(text, events);
                        self.session.state = ParseState::InOpenTagCandidate;
                        true
                    }
                    None => {
                        let text = mem::take(&mut self.pending);
                        self.text(text, events);
                        false
                    }
                }
            }
            ParseState::InOpenTagCandidate => match self.classify_open_tag() {
                OpenTag::File { path, consumed } => {
                    self.pending.drain(..consumed);
                    debug!(path = %path, "File block started");
                    events.push(StreamEvent::FileStarted { path: path.clone() });
                    self.session.state = ParseState::InFileBody {
                        path,
                        content: String::new(),
                    };
                    true
                }
                OpenTag::Block(tag) => {
                    self.pending.drain(..tag.open_marker().len());
                    self.session.state = ParseState::InOtherTagBody {
                        tag,
                        content: String::new(),
                    };
                    true
                }
                OpenTag::Pending => {
                    self.session.state = ParseState::InOpenTagCandidate;
                    false
                }
                OpenTag::NotATag => {
                    self.pending.drain(..1);
                    self.text("<".to_string(), events);
                    true
                }
            },
            ParseState::InFileBody { path, mut content } => {
                let close = self.pending.find(FILE_CLOSE);
                let reopen = self.pending.find(FILE_OPEN_PREFIX);
                match (close, reopen) {
                    (Some(c), r) if r.map_or(true, |r| c < r) => {
                        content.push_str(&self.pending[..c]);
                        self.pending.drain(..c + FILE_CLOSE.len());
                        self.finalize_file(path, &content, true, events);
                        true
                    }
                    (_, Some(r)) => {
                        content.push_str(&self.pending[..r]);
                        self.pending.drain(..r);
                        warn!(path = %path, "New file opened before close tag");
                        self.finalize_file(path, &content, false, events);
                        self.session.state = ParseState::InOpenTagCandidate;
                        true
                    }
                    _ => {
                        self.commit_safe(&mut content, FILE_BODY_LOOKBACK);
                        self.session.state = ParseState::InFileBody { path, content };
                        false
                    }
                }
            }
            ParseState::InOtherTagBody { tag, mut content } => {
                let marker = tag.close_marker();
                if let Some(c) = self.pending.find(marker) {
                    content.push_str(&self.pending[..c]);
                    self.pending.drain(..c + marker.len());
                    self.finalize_block(tag, &content, events);
                    true
                } else {
                    self.commit_safe(&mut content, marker.len() - 1);
                    self.session.state = ParseState::InOtherTagBody { tag, content };
                    false
                }
            }
        }
    }

    /// Move pending text into `content`, holding back `lookback` bytes
    fn commit_safe(&mut self, content: &mut String, lookback: usize) {
        let safe = floor_char_boundary(
            &self.pending,
            self.pending.len().saturating_sub(lookback),
        );
        content.push_str(&self.pending[..safe]);
        self.pending.drain(..safe);
    }

    fn classify_open_tag(&self) -> OpenTag {
        let buf = self.pending.as_str();

        if buf.starts_with(FILE_OPEN_PREFIX) {
            let window = &buf[..floor_char_boundary(buf, MAX_OPEN_TAG_LEN)];
            let attrs = &window[FILE_OPEN_PREFIX.len()..];
            if let Some(quote) = attrs.find('"') {
                if let Some(gt) = attrs[quote..].find('>') {
                    let path = attrs[..quote].trim();
                    if path.is_empty() {
                        return OpenTag::NotATag;
                    }
                    return OpenTag::File {
                        path: path.to_string(),
                        consumed: FILE_OPEN_PREFIX.len() + quote + gt + 1,
                    };
                }
            }
            return if buf.len() >= MAX_OPEN_TAG_LEN {
                OpenTag::NotATag
            } else {
                OpenTag::Pending
            };
        }

        if FILE_OPEN_PREFIX.starts_with(buf) {
            return OpenTag::Pending;
        }

        if let Some(tag) = BlockTag::ALL
            .into_iter()
            .find(|t| buf.starts_with(t.open_marker()))
        {
            return OpenTag::Block(tag);
        }

        if BlockTag::ALL.iter().any(|t| t.open_marker().starts_with(buf)) {
            return OpenTag::Pending;
        }

        OpenTag::NotATag
    }

    fn text(&mut self, text: String, events: &mut Vec<StreamEvent>) {
        if text.is_empty() {
            return;
        }
        self.session.commentary.push_str(&text);
        events.push(StreamEvent::Text(text));
    }

    fn finalize_file(
        &mut self,
        path: String,
        content: &str,
        complete: bool,
        events: &mut Vec<StreamEvent>,
    ) {
        let file = ParsedFile::new(path, content.trim(), complete);
        events.push(StreamEvent::FileCompleted(file.clone()));

        let path = file.path.clone();
        let decision = self.session.files.insert_with(self.policy.as_ref(), file);
        if decision == MergeDecision::Inserted {
            debug!(path = %path, complete, "File block finalized");
        } else {
            debug!(path = %path, complete, ?decision, policy = self.policy.name(), "Duplicate file block merged");
        }
    }

    fn finalize_block(&mut self, tag: BlockTag, content: &str, events: &mut Vec<StreamEvent>) {
        let content = content.trim();
        match tag {
            BlockTag::Package => self.session.push_package(content),
            BlockTag::Packages => {
                for name in content.split(['\n', ',']) {
                    self.session.push_package(name);
                }
            }
            BlockTag::Command => {
                if !content.is_empty() {
                    self.session.commands.push(content.to_string());
                }
            }
            BlockTag::Explanation => {
                self.session.explanation = Some(match self.session.explanation.take() {
                    Some(previous) => format!("{previous}\n\n{content}"),
                    None => content.to_string(),
                });
            }
            BlockTag::Structure => self.session.structure = Some(content.to_string()),
            BlockTag::Template => self.session.template = Some(content.to_string()),
        }
        events.push(StreamEvent::BlockCompleted {
            tag,
            content: content.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn single_file_block() {
        let outcome = StreamingFileExtractor::extract_all(
            "Sure!\n<file path=\"src/App.jsx\">\nexport default App\n</file>\nDone.",
        );
        assert_eq!(
            outcome.files,
            vec![ParsedFile::new("src/App.jsx", "export default App", true)]
        );
        assert_eq!(outcome.commentary, "Sure!\n\nDone.");
    }

    #[test]
    fn events_follow_chunks() {
        let mut extractor = StreamingFileExtractor::new();
        assert!(extractor.feed("<file pa").is_empty());
        assert_eq!(
            extractor.feed("th=\"a.js\">x"),
            vec![StreamEvent::FileStarted { path: "a.js".into() }]
        );
        assert_eq!(extractor.session().open_file().map(|(p, _)| p), Some("a.js"));
        assert!(extractor.feed("</fi").is_empty());
        assert_eq!(
            extractor.feed("le>"),
            vec![StreamEvent::FileCompleted(ParsedFile::new("a.js", "x", true))]
        );
        assert!(extractor.session().is_finalized("a.js"));
    }

    #[test]
    fn stream_end_inside_file_marks_incomplete() {
        let mut extractor = StreamingFileExtractor::new();
        extractor.feed("<file path=\"a.js\">function a() {");
        let events = extractor.end();
        assert_eq!(
            events,
            vec![StreamEvent::FileCompleted(ParsedFile::new("a.js", "function a() {", false))]
        );
        assert!(extractor.end().is_empty());
    }

    #[test]
    fn reopen_finalizes_previous_file() {
        let outcome = StreamingFileExtractor::extract_all(
            "<file path=\"a.js\">const a = 1<file path=\"b.js\">const b = 2</file>",
        );
        assert_eq!(
            outcome.files,
            vec![
                ParsedFile::new("a.js", "const a = 1", false),
                ParsedFile::new("b.js", "const b = 2", true),
            ]
        );
    }

    #[test]
    fn package_blocks_are_distinguished() {
        let outcome = StreamingFileExtractor::extract_all(
            "<package>zustand</package><packages>\nlodash\naxios\nzustand\n</packages>",
        );
        assert_eq!(outcome.packages, vec!["zustand", "lodash", "axios"]);
    }

    #[test]
    fn auxiliary_blocks_are_captured() {
        let outcome = StreamingFileExtractor::extract_all(
            "<explanation> Updated header </explanation><command>npm run build</command><structure>src/</structure><template>vite</template>",
        );
        assert_eq!(outcome.explanation.as_deref(), Some("Updated header"));
        assert_eq!(outcome.commands, vec!["npm run build"]);
        assert_eq!(outcome.structure.as_deref(), Some("src/"));
        assert_eq!(outcome.template.as_deref(), Some("vite"));
        assert_eq!(outcome.commentary, "");
    }

    #[test]
    fn unterminated_block_is_discarded() {
        let outcome = StreamingFileExtractor::extract_all("<command>rm -rf");
        assert!(outcome.commands.is_empty());
        assert_eq!(outcome.unterminated_blocks, vec![BlockTag::Command]);
    }

    #[test]
    fn stray_angle_brackets_are_text() {
        let outcome = StreamingFileExtractor::extract_all("a <b> c < d </file> e");
        assert!(outcome.files.is_empty());
        assert_eq!(outcome.commentary, "a <b> c < d </file> e");
    }

    #[test]
    fn oversized_open_tag_is_text() {
        let text = format!("<file path=\"{}", "x".repeat(MAX_OPEN_TAG_LEN));
        let outcome = StreamingFileExtractor::extract_all(&text);
        assert!(outcome.files.is_empty());
        assert_eq!(outcome.commentary, text);
    }

    #[test]
    fn multibyte_content_survives_splits() {
        let text = "<file path=\"i18n.js\">export const hi = 'héllo 👋'</file>";
        let mut extractor = StreamingFileExtractor::new();
        for ch in text.chars() {
            extractor.feed(&ch.to_string());
        }
        let outcome = extractor.finish();
        assert_eq!(outcome.files[0].content, "export const hi = 'héllo 👋'");
    }

    #[test]
    fn chunks_after_end_are_ignored() {
        let mut extractor = StreamingFileExtractor::new();
        extractor.feed("<file path=\"a.js\">x</file>");
        extractor.end();
        assert!(extractor.feed("<file path=\"b.js\">y</file>").is_empty());
        assert_eq!(extractor.finish().files.len(), 1);
    }
}

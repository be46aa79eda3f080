//! Edit pipeline
//!
//! Turns one edit request into a scoped generation and a structured result:
//!
//! 1. Resolve the edit: planning oracle → search → target, or the intent
//!    classifier when no planner is configured or planning yields nothing
//! 2. Build the edit instruction and stream the generation
//! 3. Extract files and blocks from the stream
//! 4. Flag truncated files and re-generate each one at most once
//! 5. Collect packages from declarations and imports
//!
//! [`EditPipeline::run`] never fails: oracle and stream failures are recorded
//! on the [`EditOutcome`] next to every partial result.

use crate::config::EditConfig;
use crate::error::{OracleError, PipelineError};
use crate::instruction::{
    intent_instruction, planning_request, recovered_file, recovery_instruction,
    surgical_instruction,
};
use crate::oracle::{ChunkStream, GenerationOracle, GenerationRequest, PlanningOracle};
use crate::session::SessionHandle;
use futures::{stream, StreamExt, TryStreamExt};
use scalpel_intent::IntentClassifier;
use scalpel_model::{EditAction, EditIntent, FileManifest};
use scalpel_search::{EditTarget, SearchExecutionResult, SearchPlan, SearchPlanExecutor, TargetSelector};
use scalpel_stream::{
    drain_stream_with, file_tag_balance, DependencyExtractor, ExtractionOutcome, ParsedFile, StreamEvent,
    StreamingFileExtractor, TruncationAnalyzer, TruncationReason, TruncationWarning,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// How the edit scope was decided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    /// Planning oracle, search evidence and a selected target
    Surgical,
    /// Rule-based intent classification
    Classifier,
}

/// Result of one recovery attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RecoveryStatus {
    /// Replacement passed the truncation checks
    Recovered,
    /// Replacement kept but still looks truncated
    StillTruncated {
        /// Signal that fired on the replacement
        reason: TruncationReason,
    },
    /// Call failed or returned nothing; original block kept
    Failed {
        /// Failure description
        error: String,
    },
}

/// One recovery attempt for one file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoveryRecord {
    /// File that was re-generated
    pub path: String,
    /// Why it was flagged
    pub trigger: TruncationReason,
    /// Outcome
    pub status: RecoveryStatus,
}

/// Structured result of one edit request
#[derive(Debug)]
pub struct EditOutcome {
    /// Session the request ran in
    pub session: SessionHandle,
    /// Resolved intent
    pub intent: EditIntent,
    /// How the intent was resolved
    pub resolution: ResolutionPath,
    /// Selected `(file, line)` for surgical edits
    pub target: Option<EditTarget>,
    /// Search evidence, when a plan was executed
    pub search: Option<SearchExecutionResult>,
    /// Extracted files and blocks after recovery
    pub extraction: ExtractionOutcome,
    /// Declared and imported packages, deduplicated
    pub packages: Vec<String>,
    /// Truncation warnings that still stand after recovery
    pub warnings: Vec<TruncationWarning>,
    /// Recovery attempts, one per flagged file
    pub recoveries: Vec<RecoveryRecord>,
    /// Required files the oracle did not return
    pub missing_files: Vec<String>,
    /// Failures in the order they occurred
    pub errors: Vec<PipelineError>,
    /// Chunks received from the generation stream
    pub chunks: usize,
    /// Wall-clock duration
    pub duration_ms: u64,
}

impl EditOutcome {
    /// Final files
    #[inline]
    #[must_use]
    pub fn files(&self) -> &[ParsedFile] {
        &self.extraction.files
    }

    /// Get file by path
    #[inline]
    #[must_use]
    pub fn file(&self, path: &str) -> Option<&ParsedFile> {
        self.extraction.file(path)
    }

    /// First recorded failure
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&PipelineError> {
        self.errors.first()
    }

    /// Check if the run finished without failures or standing warnings
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty() && self.missing_files.is_empty()
    }
}

struct ResolvedEdit {
    intent: EditIntent,
    resolution: ResolutionPath,
    target: Option<EditTarget>,
    search: Option<SearchExecutionResult>,
    request: GenerationRequest,
}

/// Orchestrates one edit request end to end
pub struct EditPipeline {
    planner: Option<Arc<dyn PlanningOracle>>,
    generator: Arc<dyn GenerationOracle>,
    classifier: IntentClassifier,
    executor: SearchPlanExecutor,
    selector: TargetSelector,
    analyzer: TruncationAnalyzer,
    dependencies: DependencyExtractor,
    config: EditConfig,
}

impl fmt::Debug for EditPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditPipeline")
            .field("planner", &self.planner.is_some())
            .field("classifier", &self.classifier)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl EditPipeline {
    /// Create pipeline around a generation oracle
    pub fn new(
        generator: Arc<dyn GenerationOracle>,
        config: EditConfig,
    ) -> Result<Self, PipelineError> {
        Ok(Self {
            planner: None,
            generator,
            classifier: IntentClassifier::new()?.with_config(config.classifier),
            executor: SearchPlanExecutor::with_config(config.search.clone()),
            selector: TargetSelector::new(),
            analyzer: TruncationAnalyzer::with_config(config.truncation),
            dependencies: DependencyExtractor::with_config(config.dependencies.clone()),
            config,
        })
    }

    /// With a planning oracle; enables surgical resolution
    #[inline]
    #[must_use]
    pub fn with_planner(mut self, planner: Arc<dyn PlanningOracle>) -> Self {
        self.planner = Some(planner);
        self
    }

    /// With a custom classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: IntentClassifier) -> Self {
        self.classifier = classifier;
        self
    }

    /// With a custom truncation analyzer
    #[inline]
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: TruncationAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &EditConfig {
        &self.config
    }

    /// Run one edit request
    ///
    /// The manifest is treated as a read-only snapshot for the whole run.
    #[tracing::instrument(skip_all, fields(session = %session.id))]
    pub async fn run(
        &self,
        session: &SessionHandle,
        prompt: &str,
        manifest: &FileManifest,
    ) -> EditOutcome {
        let start = Instant::now();
        let mut errors = Vec::new();
        info!("Running edit request");

        // 1. Resolve scope
        let resolved = self.resolve(session, prompt, manifest, &mut errors).await;
        info!(
            edit_type = resolved.intent.edit_type.as_str(),
            targets = ?resolved.intent.target_files,
            resolution = ?resolved.resolution,
            "Edit resolved"
        );

        // 2-3. Generate and extract
        let (mut extraction, chunks) = match self.generate(&resolved.request).await {
            Ok(drained) => {
                if let Some(source) = drained.error {
                    errors.push(PipelineError::Stream {
                        chunks: drained.chunks,
                        source,
                    });
                }
                (drained.outcome, drained.chunks)
            }
            Err(e) => {
                warn!(error = %e, "Generation could not start");
                errors.push(e);
                (ExtractionOutcome::default(), 0)
            }
        };

        // 4. Truncation and recovery
        let flagged = self.analyzer.analyze(&extraction);
        let (warnings, recoveries) = if flagged.is_empty() || !self.config.recovery.enabled {
            (flagged, Vec::new())
        } else {
            self.recover(session, prompt, &mut extraction, flagged, &mut errors)
                .await
        };

        // 5. Packages over final content
        let packages = self
            .dependencies
            .collect(&extraction.packages, &extraction.files);

        let missing_files: Vec<String> = resolved
            .request
            .required_files
            .iter()
            .filter(|path| extraction.file(path).is_none())
            .cloned()
            .collect();
        if !missing_files.is_empty() {
            warn!(missing = ?missing_files, "Required files not returned");
        }

        let duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            files = extraction.files.len(),
            packages = packages.len(),
            warnings = warnings.len(),
            errors = errors.len(),
            duration_ms,
            "Edit request finished"
        );

        EditOutcome {
            session: session.clone(),
            intent: resolved.intent,
            resolution: resolved.resolution,
            target: resolved.target,
            search: resolved.search,
            extraction,
            packages,
            warnings,
            recoveries,
            missing_files,
            errors,
            chunks,
            duration_ms,
        }
    }

    async fn resolve(
        &self,
        session: &SessionHandle,
        prompt: &str,
        manifest: &FileManifest,
        errors: &mut Vec<PipelineError>,
    ) -> ResolvedEdit {
        let mut search = None;

        if let Some(planner) = &self.planner {
            match self.plan(planner.as_ref(), session, prompt, manifest).await {
                Ok(plan) => {
                    let result = self.executor.execute(&plan, &manifest.contents());
                    let action = EditAction::from_prompt(prompt);
                    if let Some(target) =
                        self.selector
                            .select(&result.results, plan.edit_type, &action)
                    {
                        return self.surgical(session, prompt, manifest, &plan, target, result);
                    }
                    debug!(
                        files_searched = result.files_searched,
                        "Plan found no evidence, classifying instead"
                    );
                    search = Some(result);
                }
                Err(e) => {
                    warn!(error = %e, "Planning failed, classifying instead");
                    errors.push(e);
                }
            }
        }

        let classification = self.classifier.classify_detailed(prompt, manifest);
        debug!(rule = ?classification.rule, source = ?classification.source, "Classified");
        let request = intent_instruction(session, prompt, &classification.intent, manifest);

        ResolvedEdit {
            intent: classification.intent,
            resolution: ResolutionPath::Classifier,
            target: None,
            search,
            request,
        }
    }

    fn surgical(
        &self,
        session: &SessionHandle,
        prompt: &str,
        manifest: &FileManifest,
        plan: &SearchPlan,
        target: EditTarget,
        result: SearchExecutionResult,
    ) -> ResolvedEdit {
        let content = manifest
            .get(&target.file_path)
            .map_or("", |info| info.content.as_str());
        let request = surgical_instruction(session, prompt, &target, &result.results, content);
        let intent = EditIntent::new(
            plan.edit_type,
            vec![target.file_path.clone()],
            target.intent_confidence(&self.config.targeting),
            format!(
                "{} at {}:{}",
                plan.edit_type.label(),
                target.file_path,
                target.line_number
            ),
        )
        .with_default_context(manifest);

        debug!(
            path = %target.file_path,
            line = target.line_number,
            reason = %target.reason,
            used_fallback = result.used_fallback,
            "Target selected"
        );

        ResolvedEdit {
            intent,
            resolution: ResolutionPath::Surgical,
            target: Some(target),
            search: Some(result),
            request,
        }
    }

    async fn plan(
        &self,
        planner: &dyn PlanningOracle,
        session: &SessionHandle,
        prompt: &str,
        manifest: &FileManifest,
    ) -> Result<SearchPlan, PipelineError> {
        let request = planning_request(session, prompt, manifest);
        let secs = self.config.oracle.planning_timeout_secs;
        let response = with_budget("planning", secs, planner.plan(&request))
            .await
            .map_err(PipelineError::Planning)?;
        Ok(SearchPlan::from_json(&response)?)
    }

    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<scalpel_stream::DrainedStream<OracleError>, PipelineError> {
        let secs = self.config.oracle.generation_connect_timeout_secs;
        let chunks = with_budget("generation", secs, self.generator.generate(request))
            .await
            .map_err(PipelineError::Generation)?;

        Ok(drain_stream_with(chunks, StreamingFileExtractor::new(), log_event).await)
    }

    /// One attempt per flagged file; attempts target disjoint paths
    async fn recover(
        &self,
        session: &SessionHandle,
        prompt: &str,
        extraction: &mut ExtractionOutcome,
        flagged: Vec<TruncationWarning>,
        errors: &mut Vec<PipelineError>,
    ) -> (Vec<TruncationWarning>, Vec<RecoveryRecord>) {
        let requests: Vec<(TruncationWarning, GenerationRequest)> = flagged
            .into_iter()
            .map(|warning| {
                let partial = extraction
                    .file(&warning.path)
                    .map_or("", |file| file.content.as_str());
                let request = recovery_instruction(session, &warning.path, partial, prompt);
                (warning, request)
            })
            .collect();
        info!(files = requests.len(), "Recovering truncated files");

        let concurrency = self.config.recovery.concurrency.max(1);
        let responses: Vec<_> = stream::iter(requests)
            .map(|(warning, request)| async move {
                let response = self.recover_file(&request).await;
                (warning, response)
            })
            .buffered(concurrency)
            .collect()
            .await;

        let mut warnings = Vec::new();
        let mut records = Vec::new();
        for (warning, response) in responses {
            let path = warning.path.clone();
            let status = match response {
                Ok(text) => match recovered_file(&path, &text) {
                    Some(mut file) => {
                        let still_truncated = if file.complete {
                            self.analyzer.check(&file)
                        } else {
                            let (opened, closed) = file_tag_balance(&text);
                            Some(TruncationReason::UnclosedBlock { opened, closed })
                        };
                        let status = match still_truncated {
                            Some(reason) => {
                                file.complete = false;
                                warnings.push(TruncationWarning::new(
                                    path.clone(),
                                    TruncationReason::RecoveryIncomplete,
                                ));
                                RecoveryStatus::StillTruncated { reason }
                            }
                            None => RecoveryStatus::Recovered,
                        };
                        extraction.replace_file(file);
                        status
                    }
                    None => {
                        warnings.push(warning.clone());
                        RecoveryStatus::Failed {
                            error: "no usable file in recovery response".to_string(),
                        }
                    }
                },
                Err(source) => {
                    warnings.push(warning.clone());
                    let error = source.to_string();
                    errors.push(PipelineError::Recovery {
                        path: path.clone(),
                        source,
                    });
                    RecoveryStatus::Failed { error }
                }
            };

            match &status {
                RecoveryStatus::Recovered => info!(%path, "File recovered"),
                other => warn!(%path, status = ?other, "Recovery did not complete the file"),
            }
            records.push(RecoveryRecord {
                path,
                trigger: warning.reason,
                status,
            });
        }

        (warnings, records)
    }

    async fn recover_file(&self, request: &GenerationRequest) -> Result<String, OracleError> {
        let secs = self.config.recovery.timeout_secs;
        with_budget("recovery", secs, async {
            let chunks: ChunkStream = self.generator.generate(request).await?;
            chunks
                .try_fold(String::new(), |mut text, chunk| async move {
                    text.push_str(&chunk);
                    Ok(text)
                })
                .await
        })
        .await
    }
}

async fn with_budget<T, F>(operation: &'static str, secs: u64, call: F) -> Result<T, OracleError>
where
    F: Future<Output = Result<T, OracleError>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), call).await {
        Ok(result) => result,
        Err(_) => Err(OracleError::Timeout { operation, secs }),
    }
}

fn log_event(event: &StreamEvent) {
    match event {
        StreamEvent::FileStarted { path } => debug!(%path, "File started"),
        StreamEvent::FileCompleted(file) => {
            debug!(path = %file.path, complete = file.complete, "File completed");
        }
        StreamEvent::BlockCompleted { tag, .. } => debug!(%tag, "Block completed"),
        StreamEvent::Text(_) => {}
    }
}

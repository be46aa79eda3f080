//! Async stream consumption

use crate::extractor::{ExtractionOutcome, StreamEvent, StreamingFileExtractor};
use futures::{Stream, StreamExt};
use std::fmt;
use tracing::{debug, warn};

/// Drained stream with the error that ended it early, if any
#[derive(Debug)]
pub struct DrainedStream<E> {
    /// Everything extracted, including files closed before an error
    pub outcome: ExtractionOutcome,
    /// Error that cut the stream short
    pub error: Option<E>,
    /// Number of chunks received
    pub chunks: usize,
}

impl<E> DrainedStream<E> {
    /// Check if the stream ended normally
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

/// Drain a chunk stream through a fresh extractor
pub async fn drain_stream<S, E>(stream: S) -> DrainedStream<E>
where
    S: Stream<Item = Result<String, E>>,
    E: fmt::Display,
{
    drain_stream_with(stream, StreamingFileExtractor::new(), |_| {}).await
}

/// Drain a chunk stream, reporting each event as it is produced
///
/// A stream error stops consumption; files already closed are kept and the
/// open file, if any, is finalized as incomplete.
pub async fn drain_stream_with<S, E, F>(
    stream: S,
    mut extractor: StreamingFileExtractor,
    mut on_event: F,
) -> DrainedStream<E>
where
    S: Stream<Item = Result<String, E>>,
    E: fmt::Display,
    F: FnMut(&StreamEvent),
{
    futures::pin_mut!(stream);
    let mut chunks = 0;
    let mut error = None;

    while let Some(item) = stream.next().await {
        match item {
            Ok(chunk) => {
                chunks += 1;
                for event in extractor.feed(&chunk) {
                    on_event(&event);
                }
            }
            Err(e) => {
                warn!(error = %e, chunks, "Generation stream failed");
                error = Some(e);
                break;
            }
        }
    }

    for event in extractor.end() {
        on_event(&event);
    }
    let outcome = extractor.finish();
    debug!(chunks, files = outcome.files.len(), "Generation stream drained");

    DrainedStream {
        outcome,
        error,
        chunks,
    }
}

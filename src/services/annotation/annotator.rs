//! Annotator trait: shared abstraction for pipeline stages.

use async_trait::async_trait;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};

use super::pipeline::PipelineState;
use super::types::AnnotationError;

/// A stage that scans a document and emits span annotations.
///
/// Implementations wrap a specific collaborator (segmenter, entity linking
/// service, recognizer, link validation, keyphrase extraction) and expose it
/// through a uniform interface so the `Pipeline` can drive them identically.
///
/// Instances are shared across concurrent requests and must not keep
/// per-request state.
#[async_trait]
pub trait Annotator: Send + Sync {
    /// Pipeline slot this annotator fills.
    fn stage(&self) -> StageKind;

    /// Human-readable name for logs.
    fn display_name(&self) -> &str;

    /// Whether the backend is ready to run.
    /// Remote backends check service availability; local ones return true.
    async fn is_available(&self) -> bool {
        true
    }

    /// Human-readable reason when `is_available` returns false.
    fn availability_hint(&self) -> String {
        String::new()
    }

    /// Annotate a document.
    ///
    /// `prior` holds the streams committed by earlier stages only. The
    /// returned stream is committed by the pipeline under [`stage`](Self::stage).
    async fn process(
        &self,
        doc: &Document,
        prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError>;
}

/// Build an annotation for a character span, filling in the covered text.
pub fn span(
    doc: &Document,
    source: StageKind,
    begin: usize,
    end: usize,
    raw_type: impl Into<String>,
    attrs: AnnotationAttrs,
) -> Result<SpanAnnotation, AnnotationError> {
    let covered = doc.slice(begin, end).ok_or_else(|| {
        AnnotationError::Malformed(format!(
            "span {}..{} outside document of {} chars",
            begin,
            end,
            doc.char_len()
        ))
    })?;
    Ok(SpanAnnotation::new(source, begin, end, covered, raw_type, attrs))
}

/// Convert a byte range (e.g. a regex match) into a character span.
pub fn char_span(doc: &Document, start: usize, end: usize) -> Result<(usize, usize), AnnotationError> {
    doc.char_span(start, end).ok_or_else(|| {
        AnnotationError::Malformed(format!("byte range {}..{} splits a char", start, end))
    })
}

//! Named Entity Recognition annotator: wraps a `NerBackend` behind the `Annotator` trait.

use async_trait::async_trait;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};
use crate::services::ner::{GazetteerNerBackend, NerBackend};

use super::annotator::{char_span, span, Annotator};
use super::pipeline::PipelineState;
use super::types::AnnotationError;

/// Annotator that tags named entities sentence by sentence.
///
/// Accepts any `NerBackend` implementation. Defaults to `GazetteerNerBackend`.
/// Entities are recognized within each sentence of the segmenter's output,
/// so no entity crosses a sentence boundary.
pub struct NerAnnotator {
    backend: Box<dyn NerBackend>,
}

impl NerAnnotator {
    pub fn new() -> Self {
        Self {
            backend: Box::new(GazetteerNerBackend::new()),
        }
    }

    pub fn with_backend(backend: Box<dyn NerBackend>) -> Self {
        Self { backend }
    }
}

impl Default for NerAnnotator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Annotator for NerAnnotator {
    fn stage(&self) -> StageKind {
        StageKind::NamedEntityRecognizer
    }

    fn display_name(&self) -> &str {
        "Named Entity Recognition"
    }

    async fn process(
        &self,
        doc: &Document,
        prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        prior.require(StageKind::Segmenter)?;

        let mut annotations = Vec::new();
        for sentence in prior.sentences() {
            let offset = doc.byte_offset(sentence.begin).ok_or_else(|| {
                AnnotationError::Malformed(format!("sentence begins past end at {}", sentence.begin))
            })?;

            for entity in self.backend.extract(&sentence.covered_text) {
                let (begin, end) = char_span(doc, offset + entity.start, offset + entity.end)?;
                annotations.push(span(
                    doc,
                    StageKind::NamedEntityRecognizer,
                    begin,
                    end,
                    entity.label,
                    AnnotationAttrs::NamedEntity {
                        value: entity.label.to_string(),
                    },
                )?);
            }
        }

        tracing::debug!(
            "{} found {} entities",
            self.backend.backend_id(),
            annotations.len()
        );
        Ok(annotations)
    }
}

//! Fixed-order annotation pipeline.
//!
//! Stages run strictly in sequence: segmenter, entity linker, named-entity
//! recognizer, link validator, keyphrase extractor. Each stage sees only the
//! streams committed by the stages before it. The first failing stage aborts
//! the run; there are no partial results.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use crate::error::AnalysisError;
use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};

use super::annotator::Annotator;
use super::types::AnnotationError;

/// Annotation streams committed so far, keyed by stage.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    streams: BTreeMap<StageKind, Vec<SpanAnnotation>>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stream committed by a stage, empty when the stage has not run.
    pub fn stream(&self, kind: StageKind) -> &[SpanAnnotation] {
        self.streams.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has(&self, kind: StageKind) -> bool {
        self.streams.contains_key(&kind)
    }

    /// Stream committed by a stage, or `MissingInput` when it has not run.
    pub fn require(&self, kind: StageKind) -> Result<&[SpanAnnotation], AnnotationError> {
        self.streams
            .get(&kind)
            .map(Vec::as_slice)
            .ok_or(AnnotationError::MissingInput(kind))
    }

    pub fn sentences(&self) -> impl Iterator<Item = &SpanAnnotation> {
        self.stream(StageKind::Segmenter)
            .iter()
            .filter(|a| matches!(a.attrs, AnnotationAttrs::Sentence))
    }

    pub fn tokens(&self) -> impl Iterator<Item = &SpanAnnotation> {
        self.stream(StageKind::Segmenter)
            .iter()
            .filter(|a| matches!(a.attrs, AnnotationAttrs::Token))
    }

    /// Stages committed so far, in execution order.
    pub fn committed(&self) -> impl Iterator<Item = StageKind> + '_ {
        self.streams.keys().copied()
    }

    pub fn commit(&mut self, kind: StageKind, annotations: Vec<SpanAnnotation>) {
        self.streams.insert(kind, annotations);
    }
}

/// Per-stage streams of a complete pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    state: PipelineState,
}

impl PipelineOutput {
    pub fn new(state: PipelineState) -> Self {
        Self { state }
    }

    pub fn stream(&self, kind: StageKind) -> &[SpanAnnotation] {
        self.state.stream(kind)
    }
}

/// Ordered list of annotator stages.
///
/// Read-only after construction; share it across requests behind an `Arc`.
pub struct Pipeline {
    stages: Vec<Arc<dyn Annotator>>,
}

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Fail with a configuration error when any stage backend is unreachable.
    pub async fn ensure_available(&self) -> Result<(), AnalysisError> {
        for stage in &self.stages {
            if !stage.is_available().await {
                return Err(AnalysisError::configuration(format!(
                    "{} is not available: {}",
                    stage.display_name(),
                    stage.availability_hint()
                )));
            }
        }
        Ok(())
    }

    /// Run every stage over the document in order.
    pub async fn run(&self, document: Document) -> Result<PipelineOutput, AnalysisError> {
        let mut state = PipelineState::new();

        for stage in &self.stages {
            let kind = stage.stage();
            let started = Instant::now();

            let annotations = stage
                .process(&document, &state)
                .await
                .and_then(|annotations| {
                    check_stream(&document, kind, &annotations)?;
                    Ok(annotations)
                })
                .map_err(|e| {
                    tracing::warn!("{} failed: {}", stage.display_name(), e);
                    AnalysisError::processing(kind, e)
                })?;

            tracing::debug!(
                "{} produced {} annotations in {:?}",
                stage.display_name(),
                annotations.len(),
                started.elapsed()
            );
            state.commit(kind, annotations);
        }

        Ok(PipelineOutput::new(state))
    }
}

/// Reject annotations that are mislabelled or do not match the document text.
fn check_stream(
    doc: &Document,
    kind: StageKind,
    annotations: &[SpanAnnotation],
) -> Result<(), AnnotationError> {
    for ann in annotations {
        if ann.source != kind {
            return Err(AnnotationError::Malformed(format!(
                "annotation {}..{} claims source {}",
                ann.begin, ann.end, ann.source
            )));
        }
        match doc.slice(ann.begin, ann.end) {
            Some(text) if text == ann.covered_text => {}
            Some(text) => {
                return Err(AnnotationError::Malformed(format!(
                    "annotation {}..{} covers {:?} but document has {:?}",
                    ann.begin, ann.end, ann.covered_text, text
                )))
            }
            None => {
                return Err(AnnotationError::Malformed(format!(
                    "annotation {}..{} outside document of {} chars",
                    ann.begin,
                    ann.end,
                    doc.char_len()
                )))
            }
        }
    }
    Ok(())
}

/// Wires annotators into the fixed stage order.
#[derive(Default)]
pub struct PipelineBuilder {
    slots: BTreeMap<StageKind, Arc<dyn Annotator>>,
    errors: Vec<String>,
}

impl PipelineBuilder {
    pub fn segmenter(self, annotator: Arc<dyn Annotator>) -> Self {
        self.slot(StageKind::Segmenter, annotator)
    }

    pub fn entity_linker(self, annotator: Arc<dyn Annotator>) -> Self {
        self.slot(StageKind::EntityLinker, annotator)
    }

    pub fn recognizer(self, annotator: Arc<dyn Annotator>) -> Self {
        self.slot(StageKind::NamedEntityRecognizer, annotator)
    }

    pub fn link_validator(self, annotator: Arc<dyn Annotator>) -> Self {
        self.slot(StageKind::LinkValidator, annotator)
    }

    pub fn keyphrase_extractor(self, annotator: Arc<dyn Annotator>) -> Self {
        self.slot(StageKind::KeyphraseExtractor, annotator)
    }

    /// Place an annotator in the slot it declares.
    pub fn stage(self, annotator: Arc<dyn Annotator>) -> Self {
        let kind = annotator.stage();
        self.slot(kind, annotator)
    }

    fn slot(mut self, expected: StageKind, annotator: Arc<dyn Annotator>) -> Self {
        if annotator.stage() != expected {
            self.errors.push(format!(
                "{} is a {} stage, not {}",
                annotator.display_name(),
                annotator.stage(),
                expected
            ));
        } else if self.slots.contains_key(&expected) {
            self.errors
                .push(format!("{} stage configured more than once", expected));
        } else {
            self.slots.insert(expected, annotator);
        }
        self
    }

    pub fn build(mut self) -> Result<Pipeline, AnalysisError> {
        for kind in StageKind::ORDER {
            if !self.slots.contains_key(&kind) {
                self.errors
                    .push(format!("pipeline is missing the {} stage", kind));
            }
        }
        if !self.errors.is_empty() {
            return Err(AnalysisError::configuration(self.errors.join("; ")));
        }

        let stages = StageKind::ORDER
            .iter()
            .filter_map(|kind| self.slots.remove(kind))
            .collect();
        Ok(Pipeline { stages })
    }
}

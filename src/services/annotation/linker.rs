//! Entity linking annotators.
//!
//! `SpotlightLinker` queries a remote linking service; `GazetteerLinker`
//! resolves against the built-in gazetteer and needs no network.

use std::time::Duration;

use async_trait::async_trait;
use tracing::warn;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};
use crate::services::gazetteer;
use crate::services::spotlight::{SpotlightClient, SpotlightError, SpotlightResource};

use super::annotator::{char_span, span, Annotator};
use super::pipeline::PipelineState;
use super::types::AnnotationError;

/// Similarity reported for multi-word gazetteer names.
const FULL_NAME_SIMILARITY: f64 = 1.0;
/// Similarity reported for single-token aliases ("Obama", "Paris").
const ALIAS_SIMILARITY: f64 = 0.85;

/// Linker backed by a DBpedia-Spotlight-compatible REST service.
pub struct SpotlightLinker {
    client: SpotlightClient,
    confidence: f64,
    all_candidates: bool,
}

impl SpotlightLinker {
    pub fn new(
        endpoint: &str,
        confidence: f64,
        all_candidates: bool,
        timeout: Duration,
    ) -> Result<Self, SpotlightError> {
        Ok(Self {
            client: SpotlightClient::new(endpoint, timeout)?,
            confidence,
            all_candidates,
        })
    }

    fn request_error(&self, e: SpotlightError) -> AnnotationError {
        match e {
            SpotlightError::Parse(message) => AnnotationError::Decode {
                endpoint: self.client.endpoint().to_string(),
                message,
            },
            other => AnnotationError::Request {
                endpoint: self.client.endpoint().to_string(),
                message: other.to_string(),
            },
        }
    }
}

/// Turn a service resource into a link annotation, or `None` when the
/// reported offset does not point at the reported surface form.
fn link_from_resource(doc: &Document, resource: SpotlightResource) -> Option<SpanAnnotation> {
    let begin = resource.offset;
    let Some(end) = begin.checked_add(resource.surface_form.chars().count()) else {
        warn!(
            "Dropping link {} for '{}': offset {} out of range",
            resource.uri, resource.surface_form, begin
        );
        return None;
    };
    if doc.slice(begin, end) != Some(resource.surface_form.as_str()) {
        warn!(
            "Dropping link {} for '{}' at {}: offset does not match text",
            resource.uri, resource.surface_form, begin
        );
        return None;
    }

    Some(SpanAnnotation::new(
        StageKind::EntityLinker,
        begin,
        end,
        resource.surface_form,
        "DBpediaResource",
        AnnotationAttrs::Link {
            uri: resource.uri,
            types: resource.types,
            similarity: resource.similarity,
            support: resource.support,
        },
    ))
}

#[async_trait]
impl Annotator for SpotlightLinker {
    fn stage(&self) -> StageKind {
        StageKind::EntityLinker
    }

    fn display_name(&self) -> &str {
        "DBpedia Spotlight"
    }

    async fn is_available(&self) -> bool {
        self.client.is_available().await
    }

    fn availability_hint(&self) -> String {
        format!(
            "Spotlight service is not reachable at {}. Start it or set linker.backend = \"gazetteer\".",
            self.client.endpoint()
        )
    }

    async fn process(
        &self,
        doc: &Document,
        _prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        let fetched = if self.all_candidates {
            self.client.candidates(doc.text(), self.confidence).await
        } else {
            self.client.annotate(doc.text(), self.confidence).await
        };
        let resources = fetched.map_err(|e| self.request_error(e))?;

        Ok(resources
            .into_iter()
            .filter_map(|r| link_from_resource(doc, r))
            .collect())
    }
}

/// Offline linker over the built-in gazetteer.
pub struct GazetteerLinker;

impl GazetteerLinker {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GazetteerLinker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Annotator for GazetteerLinker {
    fn stage(&self) -> StageKind {
        StageKind::EntityLinker
    }

    fn display_name(&self) -> &str {
        "Gazetteer Linker"
    }

    async fn process(
        &self,
        doc: &Document,
        _prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        gazetteer::find_all(doc.text())
            .into_iter()
            .map(|m| {
                let (begin, end) = char_span(doc, m.start, m.end)?;
                let similarity = if m.entry.is_full_name() {
                    FULL_NAME_SIMILARITY
                } else {
                    ALIAS_SIMILARITY
                };
                span(
                    doc,
                    StageKind::EntityLinker,
                    begin,
                    end,
                    "DBpediaResource",
                    AnnotationAttrs::Link {
                        uri: m.entry.uri(),
                        types: m.entry.kind.ontology_types().to_string(),
                        similarity,
                        support: 0,
                    },
                )
            })
            .collect()
    }
}

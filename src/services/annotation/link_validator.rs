//! Link validation: confirms entity links against recognized entities.

use async_trait::async_trait;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};

use super::annotator::Annotator;
use super::pipeline::PipelineState;
use super::types::AnnotationError;

/// Confirms a link when a named entity overlaps it, or when the linker's
/// own similarity score is high enough to stand alone.
pub struct ConfirmLinkValidator {
    min_similarity: f64,
}

impl ConfirmLinkValidator {
    pub fn new(min_similarity: f64) -> Self {
        Self { min_similarity }
    }
}

#[async_trait]
impl Annotator for ConfirmLinkValidator {
    fn stage(&self) -> StageKind {
        StageKind::LinkValidator
    }

    fn display_name(&self) -> &str {
        "Link Validator"
    }

    async fn process(
        &self,
        _doc: &Document,
        prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        let links = prior.require(StageKind::EntityLinker)?;
        let entities = prior.require(StageKind::NamedEntityRecognizer)?;

        let mut validated = Vec::new();
        for link in links {
            let AnnotationAttrs::Link {
                uri,
                types,
                similarity,
                ..
            } = &link.attrs
            else {
                return Err(AnnotationError::Malformed(format!(
                    "entity linker emitted non-link annotation '{}'",
                    link.covered_text
                )));
            };

            let confirmed = *similarity >= self.min_similarity
                || entities.iter().any(|e| e.overlaps(link));
            if confirmed {
                validated.push(SpanAnnotation::new(
                    StageKind::LinkValidator,
                    link.begin,
                    link.end,
                    link.covered_text.clone(),
                    "TopDBpediaResource",
                    AnnotationAttrs::ValidatedLink {
                        uri: uri.clone(),
                        types: types.clone(),
                    },
                ));
            }
        }
        Ok(validated)
    }
}

//! Annotation stages and the pipeline that drives them.
//!
//! Each stage implements [`Annotator`]. The built-in collaborators are:
//! - `RuleSegmenter`: sentences and tokens
//! - `SpotlightLinker` / `GazetteerLinker`: knowledge-base links
//! - `NerAnnotator`: named entities
//! - `ConfirmLinkValidator`: link confirmation
//! - `KeyphraseRanker`: ranked keyphrases

mod annotator;
mod keyphrase;
mod link_validator;
mod linker;
mod ner_annotator;
mod pipeline;
mod segmenter;
mod types;

pub use annotator::{char_span, span, Annotator};
pub use keyphrase::{stem, KeyphraseRanker};
pub use link_validator::ConfirmLinkValidator;
pub use linker::{GazetteerLinker, SpotlightLinker};
pub use ner_annotator::NerAnnotator;
pub use pipeline::{Pipeline, PipelineBuilder, PipelineOutput, PipelineState};
pub use segmenter::RuleSegmenter;
pub use types::AnnotationError;

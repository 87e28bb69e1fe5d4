//! Data models for textnerl.

mod annotation;
mod document;
mod response;
mod result;

pub use annotation::{AnnotationAttrs, SpanAnnotation, StageKind};
pub use document::{Document, DEFAULT_LANGUAGE};
pub use response::{AnalysisResponse, StatusType};
pub use result::{AnalysisResult, Category, CategoryBuckets, ClassifiedEntity, KeyphraseEntity};

//! Service layer for textnerl.
//!
//! The analysis engine and its annotator collaborators. Transport concerns
//! (CLI, HTTP) live outside this module and only call `AnalysisService`.

pub mod analysis;
pub mod annotation;
pub mod gazetteer;
pub mod ner;
pub mod spotlight;

pub use analysis::{AnalysisService, ResultAggregator, TypeClassifier};
pub use annotation::{Annotator, Pipeline, PipelineOutput};

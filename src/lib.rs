//! textnerl - text analysis engine.
//!
//! Runs text through an ordered annotator pipeline (segmentation, entity
//! linking, named entity recognition, link validation, keyphrase
//! extraction), classifies the resulting entities into canonical
//! categories, ranks keyphrases and derives escaped search-index queries.

pub mod cli;
pub mod config;
pub mod error;
pub mod models;
pub mod server;
pub mod services;

pub use config::Config;
pub use error::{AnalysisError, Result};
pub use models::{AnalysisResponse, AnalysisResult, Category, Document};
pub use services::AnalysisService;

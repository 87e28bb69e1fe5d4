//! Request-level error taxonomy.

use thiserror::Error;

use crate::models::{StageKind, StatusType};
use crate::services::annotation::AnnotationError;

/// Errors surfaced by [`AnalysisService`](crate::services::analysis::AnalysisService).
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Missing or blank input; raised before the pipeline runs.
    #[error("Invalid request: {0}")]
    Validation(String),

    /// Pipeline or collaborator misconfiguration, fatal at startup.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A stage failed while processing a request.
    #[error("Stage {stage} failed: {source}")]
    Processing {
        stage: StageKind,
        #[source]
        source: AnnotationError,
    },

    #[error("Unexpected error: {0}")]
    Unknown(String),
}

impl AnalysisError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub fn processing(stage: StageKind, source: AnnotationError) -> Self {
        Self::Processing { stage, source }
    }

    /// Status reported to the caller.
    pub fn status(&self) -> StatusType {
        match self {
            Self::Validation(_) | Self::Configuration(_) => StatusType::Error,
            Self::Processing { .. } | Self::Unknown(_) => StatusType::ErrorUnknown,
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalysisError>;

//! Types shared across annotation backends.

use thiserror::Error;

use crate::models::StageKind;

/// Errors from annotation backends.
#[derive(Debug, Error)]
pub enum AnnotationError {
    #[error("Annotation failed: {0}")]
    Failed(String),

    #[error("Request to {endpoint} failed: {message}")]
    Request { endpoint: String, message: String },

    #[error("Could not decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("Malformed annotation: {0}")]
    Malformed(String),

    #[error("Required output of stage {0} is missing")]
    MissingInput(StageKind),
}

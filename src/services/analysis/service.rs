//! Request-level orchestration: validate, run the pipeline, aggregate.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::config::{Config, LinkerBackend};
use crate::error::AnalysisError;
use crate::models::{AnalysisResponse, AnalysisResult, Document, StatusType};
use crate::services::annotation::{
    Annotator, ConfirmLinkValidator, GazetteerLinker, KeyphraseRanker, NerAnnotator, Pipeline,
    RuleSegmenter, SpotlightLinker,
};

use super::aggregator::ResultAggregator;
use super::classifier::TypeClassifier;

/// Long-lived analysis engine.
///
/// Construct once at startup and share by reference; `analyze` keeps no
/// state between calls and may run concurrently.
pub struct AnalysisService {
    pipeline: Pipeline,
    aggregator: ResultAggregator,
}

impl AnalysisService {
    pub fn new(pipeline: Pipeline, aggregator: ResultAggregator) -> Self {
        Self {
            pipeline,
            aggregator,
        }
    }

    /// Build the default pipeline from configuration.
    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        config.validate()?;

        let linker: Arc<dyn Annotator> = match config.linker.backend {
            LinkerBackend::Spotlight => {
                info!(
                    "Using Spotlight linker at {} (confidence {})",
                    config.linker.endpoint, config.linker.confidence
                );
                Arc::new(
                    SpotlightLinker::new(
                        &config.linker.endpoint,
                        config.linker.confidence,
                        config.linker.all_candidates,
                        config.linker.timeout(),
                    )
                    .map_err(|e| AnalysisError::configuration(e.to_string()))?,
                )
            }
            LinkerBackend::Gazetteer => {
                info!("Using built-in gazetteer linker");
                Arc::new(GazetteerLinker::new())
            }
        };

        let pipeline = Pipeline::builder()
            .segmenter(Arc::new(RuleSegmenter::new()))
            .entity_linker(linker)
            .recognizer(Arc::new(NerAnnotator::new()))
            .link_validator(Arc::new(ConfirmLinkValidator::new(
                config.validator.min_similarity,
            )))
            .keyphrase_extractor(Arc::new(KeyphraseRanker::new(config.keyphrase.ratio)))
            .build()?;

        Ok(Self::new(
            pipeline,
            ResultAggregator::new(TypeClassifier::default(), config.query.clone()),
        ))
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Check that every stage backend is reachable.
    pub async fn ensure_available(&self) -> Result<(), AnalysisError> {
        self.pipeline.ensure_available().await
    }

    /// Analyze one piece of text.
    pub async fn analyze(&self, text: &str) -> Result<AnalysisResult, AnalysisError> {
        let document = Document::new(text);
        if document.is_blank() {
            return Err(AnalysisError::validation("text must not be empty"));
        }

        debug!("Analyzing {} chars", document.char_len());
        let output = self.pipeline.run(document).await?;
        self.aggregator.aggregate(&output)
    }

    /// Analyze and wrap the outcome in the response envelope.
    pub async fn respond(&self, text: Option<&str>) -> AnalysisResponse {
        let Some(text) = text else {
            return error_response(&AnalysisError::validation("missing 'text' parameter"));
        };
        match self.analyze(text).await {
            Ok(result) => AnalysisResponse::success(result),
            Err(e) => error_response(&e),
        }
    }
}

/// Envelope for a failed request.
///
/// Validation and configuration messages are passed through; processing and
/// unknown failures are logged and reported without internal detail.
pub fn error_response(err: &AnalysisError) -> AnalysisResponse {
    let status = err.status();
    match err {
        AnalysisError::Validation(_) | AnalysisError::Configuration(_) => {
            debug!("Rejected request: {}", err);
            AnalysisResponse::with_message(status, err.to_string())
        }
        AnalysisError::Processing { stage, source } => {
            error!(stage = %stage, "Analysis failed: {:?}", source);
            AnalysisResponse::with_message(status, format!("Processing failed in {} stage", stage))
        }
        AnalysisError::Unknown(detail) => {
            error!("Analysis failed unexpectedly: {}", detail);
            AnalysisResponse::from_status(StatusType::ErrorUnknown)
        }
    }
}

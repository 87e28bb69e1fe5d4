//! End-to-end service behaviour with scripted annotators.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use textnerl::config::{Config, LinkerBackend, QueryConfig};
use textnerl::models::{AnnotationAttrs, Category, Document, SpanAnnotation, StageKind};
use textnerl::services::analysis::{ResultAggregator, TypeClassifier, LINKED_SOURCE, NER_SOURCE};
use textnerl::services::annotation::{
    span, AnnotationError, Annotator, Pipeline, PipelineState, RuleSegmenter,
};
use textnerl::{AnalysisError, AnalysisService};

/// Emits a fixed list of `(surface, raw_type, attrs)` at the first
/// occurrence of each surface form.
struct Scripted {
    kind: StageKind,
    items: Vec<(&'static str, &'static str, AnnotationAttrs)>,
    calls: Arc<AtomicUsize>,
}

impl Scripted {
    fn new(kind: StageKind, items: Vec<(&'static str, &'static str, AnnotationAttrs)>) -> Self {
        Self {
            kind,
            items,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

#[async_trait]
impl Annotator for Scripted {
    fn stage(&self) -> StageKind {
        self.kind
    }

    fn display_name(&self) -> &str {
        "Scripted"
    }

    async fn process(
        &self,
        doc: &Document,
        _prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.items
            .iter()
            .map(|(surface, raw_type, attrs)| {
                let byte = doc
                    .text()
                    .find(surface)
                    .ok_or_else(|| AnnotationError::Failed(format!("{} not in text", surface)))?;
                let begin = doc.char_offset(byte).unwrap_or_default();
                let end = begin + surface.chars().count();
                span(doc, self.kind, begin, end, *raw_type, attrs.clone())
            })
            .collect()
    }
}

/// Always fails.
struct Broken {
    kind: StageKind,
}

#[async_trait]
impl Annotator for Broken {
    fn stage(&self) -> StageKind {
        self.kind
    }

    fn display_name(&self) -> &str {
        "Broken"
    }

    async fn process(
        &self,
        _doc: &Document,
        _prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        Err(AnnotationError::Failed("collaborator crashed".to_string()))
    }
}

fn link(uri: &str, types: &str) -> AnnotationAttrs {
    AnnotationAttrs::Link {
        uri: format!("http://dbpedia.org/resource/{}", uri),
        types: types.to_string(),
        similarity: 0.99,
        support: 100,
    }
}

fn validated(uri: &str, types: &str) -> AnnotationAttrs {
    AnnotationAttrs::ValidatedLink {
        uri: format!("http://dbpedia.org/resource/{}", uri),
        types: types.to_string(),
    }
}

fn ne(label: &str) -> AnnotationAttrs {
    AnnotationAttrs::NamedEntity {
        value: label.to_string(),
    }
}

fn kp(phrase: &str, rank: u32, probability: f64) -> AnnotationAttrs {
    AnnotationAttrs::Keyphrase {
        keyphrase: phrase.to_lowercase(),
        stem: phrase.to_lowercase(),
        rank,
        probability,
        deprecated: false,
    }
}

const PERSON_TYPES: &str = "DBpedia:Agent,Schema:Person,DBpedia:Person";
const CITY_TYPES: &str = "Schema:Place,DBpedia:Place,DBpedia:PopulatedPlace,Schema:City,DBpedia:City";

fn scripted_pipeline(keyphrase: Arc<dyn Annotator>) -> Pipeline {
    Pipeline::builder()
        .segmenter(Arc::new(RuleSegmenter::new()))
        .entity_linker(Arc::new(Scripted::new(
            StageKind::EntityLinker,
            vec![
                ("Obama", "DBpediaResource", link("Barack_Obama", PERSON_TYPES)),
                ("Merkel", "DBpediaResource", link("Angela_Merkel", PERSON_TYPES)),
                ("Berlin", "DBpediaResource", link("Berlin", CITY_TYPES)),
            ],
        )))
        .recognizer(Arc::new(Scripted::new(
            StageKind::NamedEntityRecognizer,
            vec![
                ("Obama", "PERSON", ne("PERSON")),
                ("Merkel", "PERSON", ne("PERSON")),
                ("Berlin", "LOCATION", ne("LOCATION")),
            ],
        )))
        .link_validator(Arc::new(Scripted::new(
            StageKind::LinkValidator,
            vec![
                ("Obama", "TopDBpediaResource", validated("Barack_Obama", PERSON_TYPES)),
                ("Merkel", "TopDBpediaResource", validated("Angela_Merkel", PERSON_TYPES)),
                ("Berlin", "TopDBpediaResource", validated("Berlin", CITY_TYPES)),
            ],
        )))
        .keyphrase_extractor(keyphrase)
        .build()
        .unwrap()
}

fn scripted_keyphrases() -> Arc<dyn Annotator> {
    Arc::new(Scripted::new(
        StageKind::KeyphraseExtractor,
        vec![
            ("Berlin", "Keyphrase", kp("Berlin", 2, 0.5)),
            ("Obama", "Keyphrase", kp("Obama", 1, 1.0)),
            ("Merkel", "Keyphrase", kp("Merkel", 2, 0.5)),
        ],
    ))
}

fn scripted_service(keyphrase: Arc<dyn Annotator>) -> AnalysisService {
    AnalysisService::new(scripted_pipeline(keyphrase), ResultAggregator::default())
}

#[tokio::test]
async fn test_scripted_end_to_end() {
    let service = scripted_service(scripted_keyphrases());
    let result = service
        .analyze("Obama visits Merkel in Berlin.")
        .await
        .unwrap();

    for source in [LINKED_SOURCE, NER_SOURCE] {
        let persons: Vec<&str> = result
            .bucket(source, Category::Person)
            .iter()
            .map(|e| e.text.as_str())
            .collect();
        assert_eq!(persons, vec!["Obama", "Merkel"], "source {}", source);
        assert_eq!(result.bucket(source, Category::Location)[0].text, "Berlin");
        assert_eq!(result.bucket(source, Category::All).len(), 3);
    }
    assert_eq!(result.bucket(LINKED_SOURCE, Category::City).len(), 1);
    assert!(result.bucket(NER_SOURCE, Category::City).is_empty());

    let ranks: Vec<(&str, u32)> = result
        .kea
        .iter()
        .map(|k| (k.text.as_str(), k.rank))
        .collect();
    assert_eq!(ranks, vec![("Obama", 1), ("Berlin", 2), ("Merkel", 2)]);

    let similarity = &result.solr["similarity"];
    assert!(similarity.starts_with("meta.extracted.text_nerl.dbpedia.all:("));
    assert!(similarity.contains(r"http\:\/\/dbpedia.org\/resource\/Barack_Obama"));
    assert!(similarity.ends_with("meta.extracted.text_nerl.ner.all:(Obama Merkel Berlin)"));
}

#[tokio::test]
async fn test_serialized_shape() {
    let service = scripted_service(scripted_keyphrases());
    let response = service.respond(Some("Obama visits Merkel in Berlin.")).await;
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["status"], "ok");
    assert_eq!(json["code"], 0);
    assert_eq!(json["message"], "analyzed successfully");

    let obama = &json["data"]["dbpedia"]["person"][0];
    assert_eq!(obama["text"], "Obama");
    assert_eq!(obama["uri"], "http://dbpedia.org/resource/Barack_Obama");
    assert_eq!(obama["type"], PERSON_TYPES);
    assert_eq!(obama["begin"], 0);
    assert_eq!(obama["end"], 5);

    let berlin = &json["data"]["stanford"]["all"][2];
    assert_eq!(berlin["type"], "LOCATION");
    assert!(berlin.get("uri").is_none());

    let first = &json["data"]["kea"][0];
    assert_eq!(first["stemmed"], "obama");
    assert_eq!(first["rank"], 1);
    assert!(json["data"]["solr"]["similarity"].is_string());
}

#[tokio::test]
async fn test_blank_text_never_runs_pipeline() {
    let keyphrases = Arc::new(Scripted::new(StageKind::KeyphraseExtractor, vec![]));
    let calls = keyphrases.calls.clone();
    let service = scripted_service(keyphrases);

    let response = service.respond(Some("   \n")).await;
    assert_eq!(response.code, 1);
    assert_eq!(response.status, "error");
    assert!(response.data.is_none());
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    let err = service.analyze("").await.unwrap_err();
    assert!(matches!(err, AnalysisError::Validation(_)));
}

#[tokio::test]
async fn test_stage_failure_yields_unknown_status() {
    let service = scripted_service(Arc::new(Broken {
        kind: StageKind::KeyphraseExtractor,
    }));

    let err = service
        .analyze("Obama visits Merkel in Berlin.")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AnalysisError::Processing {
            stage: StageKind::KeyphraseExtractor,
            ..
        }
    ));

    let response = service.respond(Some("Obama visits Merkel in Berlin.")).await;
    assert_eq!(response.code, 999);
    assert_eq!(response.status, "error");
    assert!(response.data.is_none());
    assert!(!response.message.contains("crashed"));
}

#[tokio::test]
async fn test_early_failure_skips_later_stages() {
    let keyphrases = Arc::new(Scripted::new(StageKind::KeyphraseExtractor, vec![]));
    let calls = keyphrases.calls.clone();
    let pipeline = Pipeline::builder()
        .segmenter(Arc::new(RuleSegmenter::new()))
        .entity_linker(Arc::new(Broken {
            kind: StageKind::EntityLinker,
        }))
        .recognizer(Arc::new(Scripted::new(StageKind::NamedEntityRecognizer, vec![])))
        .link_validator(Arc::new(Scripted::new(StageKind::LinkValidator, vec![])))
        .keyphrase_extractor(keyphrases)
        .build()
        .unwrap();
    let service = AnalysisService::new(pipeline, ResultAggregator::default());

    let response = service.respond(Some("Obama")).await;
    assert_eq!(response.code, 999);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_custom_classifier_and_query_name() {
    let classifier = TypeClassifier::empty()
        .with_rule("PERSON", Category::Person)
        .unwrap();
    let aggregator = ResultAggregator::new(
        classifier,
        QueryConfig {
            name: "related".to_string(),
            ..QueryConfig::default()
        },
    );
    let service = AnalysisService::new(scripted_pipeline(scripted_keyphrases()), aggregator);
    let result = service
        .analyze("Obama visits Merkel in Berlin.")
        .await
        .unwrap();

    let other: Vec<&str> = result
        .bucket(NER_SOURCE, Category::Other)
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(other, vec!["Berlin"]);
    assert!(result.solr.contains_key("related"));
}

#[tokio::test]
async fn test_offline_pipeline_from_config() {
    let mut config = Config::default();
    config.linker.backend = LinkerBackend::Gazetteer;
    let service = AnalysisService::from_config(&config).unwrap();
    service.ensure_available().await.unwrap();

    let result = service
        .analyze("Obama visits Merkel in Berlin. Merkel then flew to Paris.")
        .await
        .unwrap();

    let linked: Vec<&str> = result
        .bucket(LINKED_SOURCE, Category::All)
        .iter()
        .map(|e| e.identifier())
        .collect();
    assert_eq!(
        linked,
        vec![
            "http://dbpedia.org/resource/Barack_Obama",
            "http://dbpedia.org/resource/Angela_Merkel",
            "http://dbpedia.org/resource/Berlin",
            "http://dbpedia.org/resource/Angela_Merkel",
            "http://dbpedia.org/resource/Paris",
        ]
    );
    assert_eq!(result.bucket(LINKED_SOURCE, Category::City).len(), 2);

    let ranks: Vec<u32> = result.kea.iter().map(|k| k.rank).collect();
    let mut sorted = ranks.clone();
    sorted.sort();
    assert_eq!(ranks, sorted);
    assert!(!result.kea.is_empty());
}

#[tokio::test]
async fn test_unreachable_spotlight_is_configuration_error() {
    let mut config = Config::default();
    config.linker.endpoint = "http://127.0.0.1:9/rest".to_string();
    config.linker.timeout_secs = 1;
    let service = AnalysisService::from_config(&config).unwrap();

    let err = service.ensure_available().await.unwrap_err();
    assert!(matches!(err, AnalysisError::Configuration(_)));
}

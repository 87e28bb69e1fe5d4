//! Turns pipeline streams into an [`AnalysisResult`].

use std::collections::HashSet;

use crate::config::QueryConfig;
use crate::error::AnalysisError;
use crate::models::{
    AnalysisResult, AnnotationAttrs, Category, CategoryBuckets, ClassifiedEntity,
    KeyphraseEntity, SpanAnnotation, StageKind,
};
use crate::services::annotation::PipelineOutput;

use super::classifier::TypeClassifier;
use super::query::{join_clauses, or_clause};

/// Source name for validated knowledge-base links.
pub const LINKED_SOURCE: &str = "dbpedia";
/// Source name for recognized named entities.
pub const NER_SOURCE: &str = "stanford";

/// Retention rule for linked entities: multi-word, or not entirely lowercase.
///
/// A single capitalized word ("Paris") passes; a single lowercase word
/// ("paris") does not.
pub fn keep_linked(covered_text: &str) -> bool {
    covered_text.contains(' ') || covered_text != covered_text.to_lowercase()
}

/// Classifies, groups, ranks and derives queries from pipeline output.
#[derive(Debug, Clone)]
pub struct ResultAggregator {
    classifier: TypeClassifier,
    query: QueryConfig,
}

impl Default for ResultAggregator {
    fn default() -> Self {
        Self::new(TypeClassifier::default(), QueryConfig::default())
    }
}

impl ResultAggregator {
    pub fn new(classifier: TypeClassifier, query: QueryConfig) -> Self {
        Self { classifier, query }
    }

    pub fn aggregate(&self, output: &PipelineOutput) -> Result<AnalysisResult, AnalysisError> {
        let linked = self.linked_entities(output.stream(StageKind::LinkValidator))?;
        let named = self.named_entities(output.stream(StageKind::NamedEntityRecognizer))?;

        let mut result = AnalysisResult::default();
        result
            .sources
            .insert(LINKED_SOURCE.to_string(), bucketize(dedup(linked)));
        result
            .sources
            .insert(NER_SOURCE.to_string(), bucketize(dedup(named)));

        result.kea = keyphrases(output.stream(StageKind::KeyphraseExtractor))?;

        let query = join_clauses([
            or_clause(
                &self.query.linked_field,
                result
                    .bucket(LINKED_SOURCE, Category::All)
                    .iter()
                    .map(ClassifiedEntity::identifier),
            ),
            or_clause(
                &self.query.ner_field,
                result
                    .bucket(NER_SOURCE, Category::All)
                    .iter()
                    .map(|e| e.text.as_str()),
            ),
        ]);
        result.solr.insert(self.query.name.clone(), query);

        Ok(result)
    }

    fn linked_entities(
        &self,
        stream: &[SpanAnnotation],
    ) -> Result<Vec<ClassifiedEntity>, AnalysisError> {
        let mut entities = Vec::new();
        for ann in stream {
            let AnnotationAttrs::ValidatedLink { uri, types } = &ann.attrs else {
                return Err(unexpected(ann, "validated link"));
            };
            if !keep_linked(&ann.covered_text) {
                continue;
            }
            entities.push(ClassifiedEntity {
                text: ann.covered_text.clone(),
                uri: Some(uri.clone()),
                raw_type: types.clone(),
                begin: ann.begin,
                end: ann.end,
                categories: self.classifier.classify(types),
            });
        }
        Ok(entities)
    }

    fn named_entities(
        &self,
        stream: &[SpanAnnotation],
    ) -> Result<Vec<ClassifiedEntity>, AnalysisError> {
        stream
            .iter()
            .map(|ann| {
                let AnnotationAttrs::NamedEntity { value } = &ann.attrs else {
                    return Err(unexpected(ann, "named entity"));
                };
                Ok(ClassifiedEntity {
                    text: ann.covered_text.clone(),
                    uri: None,
                    raw_type: value.clone(),
                    begin: ann.begin,
                    end: ann.end,
                    categories: self.classifier.classify(value),
                })
            })
            .collect()
    }
}

fn unexpected(ann: &SpanAnnotation, expected: &str) -> AnalysisError {
    AnalysisError::Unknown(format!(
        "{} stream holds a non-{} annotation at {}..{}",
        ann.source, expected, ann.begin, ann.end
    ))
}

/// Drop entities repeating an earlier one's offsets and identifier.
fn dedup(entities: Vec<ClassifiedEntity>) -> Vec<ClassifiedEntity> {
    let mut seen: HashSet<(usize, usize, String)> = HashSet::new();
    entities
        .into_iter()
        .filter(|e| seen.insert((e.begin, e.end, e.identifier().to_string())))
        .collect()
}

/// Every entity goes to each of its categories and to `All`, in encounter order.
fn bucketize(entities: Vec<ClassifiedEntity>) -> CategoryBuckets {
    let mut buckets = CategoryBuckets::new();
    buckets.insert(Category::All, Vec::new());
    for entity in entities {
        for category in &entity.categories {
            buckets.entry(*category).or_default().push(entity.clone());
        }
        buckets.entry(Category::All).or_default().push(entity);
    }
    buckets
}

/// Non-deprecated keyphrases, stably sorted by rank.
fn keyphrases(stream: &[SpanAnnotation]) -> Result<Vec<KeyphraseEntity>, AnalysisError> {
    let mut kea = Vec::new();
    for ann in stream {
        let AnnotationAttrs::Keyphrase {
            keyphrase,
            stem,
            rank,
            probability,
            deprecated,
        } = &ann.attrs
        else {
            return Err(unexpected(ann, "keyphrase"));
        };
        if *deprecated {
            continue;
        }
        kea.push(KeyphraseEntity {
            text: ann.covered_text.clone(),
            keyphrase: keyphrase.clone(),
            stem: stem.clone(),
            rank: *rank,
            probability: *probability,
            begin: ann.begin,
            end: ann.end,
        });
    }
    kea.sort_by_key(|k| k.rank);
    Ok(kea)
}

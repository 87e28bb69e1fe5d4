//! Span annotations produced by pipeline stages.

use serde::{Deserialize, Serialize};

/// Pipeline stage slots, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Segmenter,
    EntityLinker,
    NamedEntityRecognizer,
    LinkValidator,
    KeyphraseExtractor,
}

impl StageKind {
    /// Fixed execution order of the pipeline.
    pub const ORDER: [StageKind; 5] = [
        StageKind::Segmenter,
        StageKind::EntityLinker,
        StageKind::NamedEntityRecognizer,
        StageKind::LinkValidator,
        StageKind::KeyphraseExtractor,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StageKind::Segmenter => "segmenter",
            StageKind::EntityLinker => "entity_linker",
            StageKind::NamedEntityRecognizer => "ner",
            StageKind::LinkValidator => "link_validator",
            StageKind::KeyphraseExtractor => "keyphrase",
        }
    }

    pub fn position(&self) -> usize {
        Self::ORDER
            .iter()
            .position(|k| k == self)
            .unwrap_or(Self::ORDER.len())
    }
}

impl std::fmt::Display for StageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage-specific fields carried by an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AnnotationAttrs {
    Sentence,
    Token,
    /// Knowledge-base link proposed by the entity linker.
    Link {
        uri: String,
        types: String,
        similarity: f64,
        support: u64,
    },
    /// Entity recognized by the NER stage; `value` is the recognizer's label.
    NamedEntity { value: String },
    /// Link confirmed by the validation stage.
    ValidatedLink { uri: String, types: String },
    Keyphrase {
        keyphrase: String,
        stem: String,
        rank: u32,
        probability: f64,
        /// Marks a repeated occurrence of an already-annotated keyphrase.
        deprecated: bool,
    },
}

/// A typed, positioned fragment of document text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpanAnnotation {
    pub begin: usize,
    pub end: usize,
    pub covered_text: String,
    /// Type string as supplied by the producing stage.
    pub raw_type: String,
    pub source: StageKind,
    pub attrs: AnnotationAttrs,
}

impl SpanAnnotation {
    pub fn new(
        source: StageKind,
        begin: usize,
        end: usize,
        covered_text: impl Into<String>,
        raw_type: impl Into<String>,
        attrs: AnnotationAttrs,
    ) -> Self {
        Self {
            begin,
            end,
            covered_text: covered_text.into(),
            raw_type: raw_type.into(),
            source,
            attrs,
        }
    }

    pub fn overlaps(&self, other: &SpanAnnotation) -> bool {
        self.overlaps_range(other.begin, other.end)
    }

    pub fn overlaps_range(&self, begin: usize, end: usize) -> bool {
        self.begin < end && begin < self.end
    }

    pub fn contains_range(&self, begin: usize, end: usize) -> bool {
        self.begin <= begin && end <= self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }
}

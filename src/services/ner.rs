//! Named Entity Recognition.
//!
//! Provides a `NerBackend` trait for pluggable extraction backends and a
//! built-in `GazetteerNerBackend` that combines the shared gazetteer with
//! title patterns ("President John Kennedy").

use std::sync::LazyLock;

use regex::Regex;

use super::gazetteer;

/// An entity found in text. Offsets are byte offsets into the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognizedEntity {
    pub start: usize,
    pub end: usize,
    /// CoNLL-style label: PERSON, LOCATION, ORGANIZATION or MISC.
    pub label: &'static str,
}

/// Trait for pluggable NER backends.
pub trait NerBackend: Send + Sync {
    /// Human-readable backend identifier (e.g. "gazetteer").
    fn backend_id(&self) -> &str;

    /// Extract named entities from text.
    ///
    /// Returned entities are sorted by start offset and never overlap.
    fn extract(&self, text: &str) -> Vec<RecognizedEntity>;
}

static TITLE_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:(?:President|Vice President|Chancellor|Prime Minister|Secretary|Director|General|Minister|Ambassador|Senator|Governor|Mayor|Judge|Dr\.|Prof\.|Mr\.|Mrs\.|Ms\.)\s+)([A-Z][a-z]+(?:\s+[A-Z]\.?)?\s+[A-Z][a-z]+)",
    )
    .expect("title pattern should compile")
});

/// Dictionary and pattern based recognizer.
pub struct GazetteerNerBackend;

impl GazetteerNerBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GazetteerNerBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl NerBackend for GazetteerNerBackend {
    fn backend_id(&self) -> &str {
        "gazetteer"
    }

    fn extract(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut candidates: Vec<RecognizedEntity> = gazetteer::find_all(text)
            .into_iter()
            .filter_map(|m| {
                m.entry.kind.ner_label().map(|label| RecognizedEntity {
                    start: m.start,
                    end: m.end,
                    label,
                })
            })
            .collect();

        for cap in TITLE_PATTERN.captures_iter(text) {
            if let Some(name) = cap.get(1) {
                candidates.push(RecognizedEntity {
                    start: name.start(),
                    end: name.end(),
                    label: "PERSON",
                });
            }
        }

        resolve_overlaps(candidates)
    }
}

/// Keep the longest candidate among overlapping ones; earlier start wins ties.
fn resolve_overlaps(mut candidates: Vec<RecognizedEntity>) -> Vec<RecognizedEntity> {
    candidates.sort_by(|a, b| {
        a.start
            .cmp(&b.start)
            .then((b.end - b.start).cmp(&(a.end - a.start)))
    });

    // Accepted spans stay sorted and disjoint, so only the last can overlap.
    let mut accepted: Vec<RecognizedEntity> = Vec::new();
    for candidate in candidates {
        match accepted.last_mut() {
            Some(last) if candidate.start < last.end => {
                // A longer candidate starting later swallows the last one.
                if candidate.end - candidate.start > last.end - last.start {
                    *last = candidate;
                }
            }
            _ => accepted.push(candidate),
        }
    }
    accepted
}

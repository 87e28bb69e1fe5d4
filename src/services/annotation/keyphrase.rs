//! Keyphrase extraction over the segmenter's tokens.
//!
//! Candidates are runs of one to three word tokens inside a sentence with no
//! stopword at either edge. Candidates are grouped by stem, scored by how
//! often they occur and how early they first appear, and the best `k` are
//! annotated at every occurrence.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};

use super::annotator::{span, Annotator};
use super::pipeline::PipelineState;
use super::types::AnnotationError;

const MAX_PHRASE_TOKENS: usize = 3;
const MIN_KEYPHRASES: usize = 3;

const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "few",
    "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "herself", "him", "himself", "his", "how", "i", "if", "in", "into", "is", "it", "its",
    "itself", "just", "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "said",
    "same", "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs",
    "them", "themselves", "then", "there", "these", "they", "this", "those", "through", "to",
    "too", "under", "until", "up", "very", "was", "we", "were", "what", "when", "where", "which",
    "while", "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word.to_lowercase().as_str())
}

fn is_word(token: &str) -> bool {
    token.chars().any(char::is_alphabetic)
}

/// Light English suffix stripper.
pub fn stem(word: &str) -> String {
    let w = word.to_lowercase();
    let len = w.chars().count();

    if len > 4 && w.ends_with("ies") {
        return format!("{}y", &w[..w.len() - 3]);
    }
    if len > 5 && w.ends_with("ing") {
        return w[..w.len() - 3].to_string();
    }
    if len > 4 && w.ends_with("ed") && !w.ends_with("eed") {
        return w[..w.len() - 2].to_string();
    }
    if len > 4 && w.ends_with("ly") {
        return w[..w.len() - 2].to_string();
    }
    if len > 3
        && w.ends_with("es")
        && ["ses", "xes", "zes", "ches", "shes"]
            .iter()
            .any(|s| w.ends_with(s))
    {
        return w[..w.len() - 2].to_string();
    }
    if len > 3 && w.ends_with('s') && !w.ends_with("ss") && !w.ends_with("us") {
        return w[..w.len() - 1].to_string();
    }
    w
}

#[derive(Debug)]
struct Candidate {
    keyphrase: String,
    stem: String,
    words: usize,
    /// Token index of the first occurrence.
    first: usize,
    occurrences: Vec<(usize, usize)>,
}

impl Candidate {
    fn score(&self, total_tokens: usize) -> f64 {
        let position = self.first as f64 / total_tokens.max(1) as f64;
        self.occurrences.len() as f64 * (1.0 - position)
    }
}

/// Frequency and position based keyphrase ranker.
pub struct KeyphraseRanker {
    ratio: usize,
}

impl KeyphraseRanker {
    /// `ratio` is the number of words per extracted keyphrase.
    pub fn new(ratio: usize) -> Self {
        Self {
            ratio: ratio.max(1),
        }
    }

    fn collect_candidates(doc: &Document, prior: &PipelineState) -> (Vec<Candidate>, usize) {
        let mut tokens: Vec<&SpanAnnotation> = prior.tokens().collect();
        tokens.sort_by_key(|t| t.begin);
        let mut by_stem: HashMap<String, usize> = HashMap::new();
        let mut candidates: Vec<Candidate> = Vec::new();

        let mut sentences: Vec<&SpanAnnotation> = prior.sentences().collect();
        sentences.sort_by_key(|s| s.begin);

        for sentence in sentences {
            let from = tokens.partition_point(|t| t.begin < sentence.begin);
            let in_sentence: Vec<(usize, &SpanAnnotation)> = tokens[from..]
                .iter()
                .enumerate()
                .take_while(|(_, t)| t.begin < sentence.end)
                .filter(|(_, t)| sentence.contains_range(t.begin, t.end))
                .map(|(i, t)| (from + i, *t))
                .collect();

            for start in 0..in_sentence.len() {
                for n in 1..=MAX_PHRASE_TOKENS {
                    let Some(window) = in_sentence.get(start..start + n) else {
                        break;
                    };
                    if !window.iter().all(|(_, t)| is_word(&t.covered_text)) {
                        break;
                    }
                    let first = window[0].1;
                    let last = window[n - 1].1;
                    if is_stopword(&first.covered_text) || is_stopword(&last.covered_text) {
                        continue;
                    }

                    let stem_key = window
                        .iter()
                        .map(|(_, t)| stem(&t.covered_text))
                        .collect::<Vec<_>>()
                        .join(" ");
                    let surface = doc.slice(first.begin, last.end).unwrap_or_default();

                    let idx = *by_stem.entry(stem_key.clone()).or_insert_with(|| {
                        candidates.push(Candidate {
                            keyphrase: surface.to_lowercase(),
                            stem: stem_key,
                            words: n,
                            first: window[0].0,
                            occurrences: Vec::new(),
                        });
                        candidates.len() - 1
                    });
                    candidates[idx].occurrences.push((first.begin, last.end));
                }
            }
        }

        let word_count = tokens.iter().filter(|t| is_word(&t.covered_text)).count();
        (candidates, word_count)
    }
}

#[async_trait]
impl Annotator for KeyphraseRanker {
    fn stage(&self) -> StageKind {
        StageKind::KeyphraseExtractor
    }

    fn display_name(&self) -> &str {
        "Keyphrase Ranker"
    }

    async fn process(
        &self,
        doc: &Document,
        prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        prior.require(StageKind::Segmenter)?;
        if doc.language() != "en" {
            return Err(AnnotationError::Failed(format!(
                "no stopword list for language '{}'",
                doc.language()
            )));
        }

        let (mut candidates, word_count) = Self::collect_candidates(doc, prior);
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let total_tokens = prior.tokens().count();
        candidates.sort_by(|a, b| {
            b.score(total_tokens)
                .total_cmp(&a.score(total_tokens))
                .then(a.first.cmp(&b.first))
                .then(b.words.cmp(&a.words))
        });

        let k = (word_count / self.ratio)
            .max(MIN_KEYPHRASES)
            .min(candidates.len());
        let best = candidates[0].score(total_tokens);

        let mut annotations = Vec::new();
        for (i, candidate) in candidates.iter_mut().take(k).enumerate() {
            let probability = if best > 0.0 {
                candidate.score(total_tokens) / best
            } else {
                0.0
            };
            candidate.occurrences.sort_unstable();
            for (n, &(begin, end)) in candidate.occurrences.iter().enumerate() {
                annotations.push(span(
                    doc,
                    StageKind::KeyphraseExtractor,
                    begin,
                    end,
                    "Keyphrase",
                    AnnotationAttrs::Keyphrase {
                        keyphrase: candidate.keyphrase.clone(),
                        stem: candidate.stem.clone(),
                        rank: (i + 1) as u32,
                        probability,
                        deprecated: n > 0,
                    },
                )?);
            }
        }
        Ok(annotations)
    }
}

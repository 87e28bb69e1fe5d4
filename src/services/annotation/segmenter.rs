//! Rule-based sentence and token segmenter.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use crate::models::{AnnotationAttrs, Document, SpanAnnotation, StageKind};

use super::annotator::{char_span, span, Annotator};
use super::pipeline::PipelineState;
use super::types::AnnotationError;

static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\w+(?:[-'’.]\w+)*|[^\w\s]").expect("token pattern should compile")
});

// Sentence-final punctuation (optionally followed by closing quotes/brackets)
// followed by whitespace.
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("sentence pattern should compile")
});

/// Abbreviations that do not end a sentence.
const ABBREVIATIONS: &[&str] = &[
    "Mr", "Mrs", "Ms", "Dr", "Prof", "Gen", "Sen", "Rep", "St", "Jr", "Sr", "vs", "etc", "e.g",
    "i.e", "U.S", "Inc", "Ltd", "Co",
];

/// Splits text into sentences and tokens.
pub struct RuleSegmenter;

impl RuleSegmenter {
    pub fn new() -> Self {
        Self
    }

    /// Sentence byte ranges, trimmed of surrounding whitespace.
    pub fn sentence_ranges(text: &str) -> Vec<(usize, usize)> {
        let mut ranges = Vec::new();
        let mut start = 0;

        for m in SENTENCE_BREAK.find_iter(text) {
            let before = &text[start..m.start()];
            let last_word = before
                .rsplit(|c: char| c.is_whitespace())
                .next()
                .unwrap_or("");
            if ABBREVIATIONS.contains(&last_word) {
                continue;
            }
            // Include the punctuation, exclude trailing whitespace.
            let end = m.start() + m.as_str().trim_end().len();
            push_trimmed(text, start, end, &mut ranges);
            start = m.end();
        }
        push_trimmed(text, start, text.len(), &mut ranges);
        ranges
    }
}

fn push_trimmed(text: &str, start: usize, end: usize, ranges: &mut Vec<(usize, usize)>) {
    let slice = &text[start..end];
    let leading = slice.len() - slice.trim_start().len();
    let trimmed = slice.trim();
    if !trimmed.is_empty() {
        let s = start + leading;
        ranges.push((s, s + trimmed.len()));
    }
}

impl Default for RuleSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Annotator for RuleSegmenter {
    fn stage(&self) -> StageKind {
        StageKind::Segmenter
    }

    fn display_name(&self) -> &str {
        "Segmenter"
    }

    async fn process(
        &self,
        doc: &Document,
        _prior: &PipelineState,
    ) -> Result<Vec<SpanAnnotation>, AnnotationError> {
        let text = doc.text();
        let mut annotations = Vec::new();

        for (start, end) in Self::sentence_ranges(text) {
            let (begin, end) = char_span(doc, start, end)?;
            annotations.push(span(
                doc,
                StageKind::Segmenter,
                begin,
                end,
                "Sentence",
                AnnotationAttrs::Sentence,
            )?);
        }

        for m in TOKEN_PATTERN.find_iter(text) {
            let (begin, end) = char_span(doc, m.start(), m.end())?;
            annotations.push(span(
                doc,
                StageKind::Segmenter,
                begin,
                end,
                "Token",
                AnnotationAttrs::Token,
            )?);
        }

        Ok(annotations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn segment(text: &str) -> (Vec<String>, Vec<String>) {
        let doc = Document::new(text);
        let anns = RuleSegmenter::new()
            .process(&doc, &PipelineState::new())
            .await
            .unwrap();
        let sentences = anns
            .iter()
            .filter(|a| matches!(a.attrs, AnnotationAttrs::Sentence))
            .map(|a| a.covered_text.clone())
            .collect();
        let tokens = anns
            .iter()
            .filter(|a| matches!(a.attrs, AnnotationAttrs::Token))
            .map(|a| a.covered_text.clone())
            .collect();
        (sentences, tokens)
    }

    #[tokio::test]
    async fn test_single_sentence() {
        let (sentences, tokens) = segment("Obama visits Merkel in Berlin.").await;
        assert_eq!(sentences, vec!["Obama visits Merkel in Berlin."]);
        assert_eq!(tokens, vec!["Obama", "visits", "Merkel", "in", "Berlin", "."]);
    }

    #[tokio::test]
    async fn test_multiple_sentences() {
        let (sentences, _) =
            segment("The vote passed. Was it close? Yes!  Mr. Smith agreed.").await;
        assert_eq!(
            sentences,
            vec![
                "The vote passed.",
                "Was it close?",
                "Yes!",
                "Mr. Smith agreed."
            ]
        );
    }

    #[tokio::test]
    async fn test_hyphenated_and_numeric_tokens() {
        let (_, tokens) = segment("Ban Ki-moon paid US$400 million.").await;
        assert_eq!(
            tokens,
            vec!["Ban", "Ki-moon", "paid", "US", "$", "400", "million", "."]
        );
    }

    #[tokio::test]
    async fn test_multibyte_offsets() {
        let doc = Document::new("Köln ist schön. Zürich auch.");
        let anns = RuleSegmenter::new()
            .process(&doc, &PipelineState::new())
            .await
            .unwrap();
        for ann in &anns {
            assert_eq!(doc.slice(ann.begin, ann.end), Some(ann.covered_text.as_str()));
        }
        let second = anns
            .iter()
            .filter(|a| matches!(a.attrs, AnnotationAttrs::Sentence))
            .nth(1)
            .unwrap();
        assert_eq!(second.begin, 16);
        assert_eq!(second.covered_text, "Zürich auch.");
    }

    #[tokio::test]
    async fn test_whitespace_only() {
        let (sentences, tokens) = segment("   ").await;
        assert!(sentences.is_empty());
        assert!(tokens.is_empty());
    }
}

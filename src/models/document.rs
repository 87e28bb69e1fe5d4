//! Input document model.
//!
//! Offsets throughout the crate are character (Unicode scalar) positions,
//! not byte positions. `Document` owns the conversion between the two.

/// Language tag applied to every document.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Immutable text submitted for analysis.
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    language: String,
    /// Byte index of every char boundary, plus one trailing entry for `text.len()`.
    boundaries: Vec<usize>,
}

impl Document {
    pub fn new(text: impl Into<String>) -> Self {
        Self::with_language(text, DEFAULT_LANGUAGE)
    }

    pub fn with_language(text: impl Into<String>, language: impl Into<String>) -> Self {
        let text = text.into();
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self {
            text,
            language: language.into(),
            boundaries,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Length in characters.
    pub fn char_len(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Text between two character offsets, or `None` when out of bounds.
    pub fn slice(&self, begin: usize, end: usize) -> Option<&str> {
        if begin > end || end > self.char_len() {
            return None;
        }
        Some(&self.text[self.boundaries[begin]..self.boundaries[end]])
    }

    /// Character offset of a byte index that lies on a char boundary.
    pub fn char_offset(&self, byte: usize) -> Option<usize> {
        self.boundaries.binary_search(&byte).ok()
    }

    /// Byte index of a character offset.
    pub fn byte_offset(&self, char_offset: usize) -> Option<usize> {
        self.boundaries.get(char_offset).copied()
    }

    /// Character span of a byte range, as produced by regex matches.
    pub fn char_span(&self, byte_start: usize, byte_end: usize) -> Option<(usize, usize)> {
        Some((self.char_offset(byte_start)?, self.char_offset(byte_end)?))
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

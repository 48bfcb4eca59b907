//! Character vocabulary derived from the training corpus.
//!
//! Maps between characters and dense indices. The ordering is by code point,
//! so the same corpus always yields the same index assignment and therefore
//! the same parameter matrix layout.

use std::collections::{BTreeSet, HashMap};

use crate::error::{RnnError, RnnResult};

/// Character-to-index vocabulary built from a corpus.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    /// Ordered list of distinct characters; position is the index.
    pub chars: Vec<char>,
    /// Reverse mapping from character to index.
    pub char_to_idx: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build the vocabulary of every distinct character in `text`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect::<BTreeSet<_>>().into_iter().collect();
        let char_to_idx = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { chars, char_to_idx }
    }

    /// Number of characters in the vocabulary.
    #[must_use]
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Get the index for a character, or `None` if not in vocabulary.
    #[must_use]
    pub fn char_to_index(&self, c: char) -> Option<usize> {
        self.char_to_idx.get(&c).copied()
    }

    /// Get the character for an index, or `None` if out of bounds.
    #[must_use]
    pub fn index_to_char(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }

    /// Index of `c`.
    ///
    /// # Errors
    /// `UnknownChar` if `c` never occurred in the corpus.
    pub fn encode(&self, c: char) -> RnnResult<usize> {
        self.char_to_index(c).ok_or(RnnError::UnknownChar(c))
    }

    /// Character at `idx`.
    ///
    /// # Errors
    /// `UnknownIndex` if `idx >= self.size()`.
    pub fn decode(&self, idx: usize) -> RnnResult<char> {
        self.index_to_char(idx).ok_or(RnnError::UnknownIndex(idx))
    }

    /// Encode a whole string into an index sequence.
    pub fn encode_str(&self, text: &str) -> RnnResult<Vec<usize>> {
        text.chars().map(|c| self.encode(c)).collect()
    }

    /// Decode an index sequence back into a string.
    pub fn decode_indices(&self, indices: &[usize]) -> RnnResult<String> {
        indices.iter().map(|&i| self.decode(i)).collect()
    }
}

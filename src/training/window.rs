//! Sliding window over the encoded corpus.

use std::ops::Range;

/// Pointer into the corpus plus the fixed unroll length.
///
/// A window spans `seq_length + 1` characters: inputs are
/// `[p, p + seq_length)` and targets are shifted one to the right.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    pointer: usize,
    seq_length: usize,
    corpus_len: usize,
}

impl Window {
    #[must_use]
    pub fn new(seq_length: usize, corpus_len: usize) -> Self {
        Self {
            pointer: 0,
            seq_length,
            corpus_len,
        }
    }

    #[must_use]
    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Rewind to the corpus start if this is the first iteration or the
    /// window would reach the end (`p + seq_length + 1 >= len`).
    ///
    /// Returns `true` when the caller must zero its hidden state.
    pub fn prepare(&mut self, first_iteration: bool) -> bool {
        let reset = first_iteration || self.pointer + self.seq_length + 1 >= self.corpus_len;
        if reset {
            self.pointer = 0;
        }
        reset
    }

    #[must_use]
    pub fn inputs(&self) -> Range<usize> {
        self.pointer..self.pointer + self.seq_length
    }

    #[must_use]
    pub fn targets(&self) -> Range<usize> {
        self.pointer + 1..self.pointer + self.seq_length + 1
    }

    pub fn advance(&mut self) {
        self.pointer += self.seq_length;
    }
}

//! Error type shared by the vocabulary, corpus loader, model and trainer.

use std::path::PathBuf;
use thiserror::Error;

/// Error type for RNN operations.
///
/// Reaching the iteration budget or being interrupted is not an error; those
/// outcomes are reported through [`crate::training::TrainState`].
#[derive(Error, Debug)]
pub enum RnnError {
    /// Bad corpus source or hyperparameters. Raised before any parameter
    /// matrix is allocated.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Character absent from the vocabulary.
    #[error("character {0:?} is not in the vocabulary")]
    UnknownChar(char),

    /// Index outside `0..vocab_size`.
    #[error("index {0} is outside the vocabulary")]
    UnknownIndex(usize),

    /// Mismatched sequence lengths or vector shapes.
    #[error("shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Degenerate numeric state (NaN probabilities, zero-mass distribution).
    #[error("numeric fault: {0}")]
    Numeric(String),

    #[error("i/o error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl RnnError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RnnError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type RnnResult<T> = Result<T, RnnError>;

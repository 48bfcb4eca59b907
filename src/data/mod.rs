//! Corpus loading and vocabulary management.
//!
//! ## Submodules
//!
//! - [`vocab`] — Character vocabulary derived from the corpus
//! - [`corpus`] — `.txt` file / directory loading and output path derivation

pub mod corpus;
pub mod vocab;

pub use corpus::TrainingData;
pub use vocab::Vocabulary;

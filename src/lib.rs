//! # lyrics-rnn
//!
//! A character-level vanilla RNN trained on song lyrics.
//!
//! ## Overview
//!
//! Lyrics are scraped into a directory of `.txt` files, concatenated into one
//! corpus, and fed through a single-layer tanh RNN in windows of
//! `seq_length` characters. Each window runs a forward pass, truncated
//! backpropagation-through-time with gradient clipping, and an Adagrad update.
//! Every `sample_every` iterations the model generates text; the last sample
//! is written to disk when the run completes or is interrupted.
//!
//! ## Structure
//!
//! - [`core`] — RNN parameters, forward pass, BPTT, sampling
//! - [`training`] — Adagrad, sliding window, training loop state machine
//! - [`data`] — Corpus loading and vocabulary
//! - [`scrape`] — Lyrics scraper producing the corpus directory
//! - [`utils`] — Softmax, tanh backprop, clipping helpers

pub mod core;
pub mod data;
pub mod error;
pub mod scrape;
pub mod training;
pub mod utils;

pub use crate::core::{ForwardPass, Gradients, RNN};
pub use data::{TrainingData, Vocabulary};
pub use error::{RnnError, RnnResult};
pub use training::{Never, StopSignal, StopWhen, TrainReport, TrainState, Trainer};

/// Hyperparameters for a training run.
///
/// Used by [`Trainer::new`]; the binary maps its command-line flags onto it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Size of the hidden layer.
    pub hidden_size: usize,
    /// Number of steps to unroll the RNN for.
    pub seq_length: usize,
    pub learning_rate: f64,
    /// Iteration budget; the loop runs while `n <= iters`.
    pub iters: usize,
    /// Sample and log every N iterations.
    pub sample_every: usize,
    /// Characters per generated sample.
    pub sample_len: usize,
    /// Element-wise gradient clip bound.
    pub clip: f64,
    /// RNG seed for initialisation and sampling; `None` uses OS entropy.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            hidden_size: 100,
            seq_length: 25,
            learning_rate: 1e-1,
            iters: 10_000,
            sample_every: 100,
            sample_len: 200,
            clip: 5.0,
            seed: None,
        }
    }
}

impl Config {
    /// # Errors
    /// `InvalidConfig` for zero sizes or a non-positive learning rate / clip.
    pub fn validate(&self) -> RnnResult<()> {
        let positive = [
            ("hidden_size", self.hidden_size),
            ("seq_length", self.seq_length),
            ("sample_every", self.sample_every),
        ];
        if let Some((name, _)) = positive.iter().find(|(_, v)| *v == 0) {
            return Err(RnnError::InvalidConfig(format!("{name} must be positive")));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(RnnError::InvalidConfig(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.clip.is_finite() && self.clip > 0.0) {
            return Err(RnnError::InvalidConfig(format!(
                "clip must be positive, got {}",
                self.clip
            )));
        }
        Ok(())
    }
}

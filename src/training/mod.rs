//! Training loop: sliding window, Adagrad updates, periodic sampling.
//!
//! ## Submodules
//!
//! - [`adagrad`] — per-parameter adaptive learning rate
//! - [`window`] — corpus pointer and hidden-state reset rule
//! - [`metrics`] — JSONL progress log

pub mod adagrad;
pub mod metrics;
pub mod window;

use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};

use crate::core::RNN;
use crate::data::{TrainingData, Vocabulary};
use crate::error::{RnnError, RnnResult};
use crate::Config;

pub use adagrad::Adagrad;
pub use metrics::{MetricsLog, ProgressEvent};
pub use window::Window;

/// Decay of the exponentially smoothed loss.
const SMOOTHING: f64 = 0.999;

/// Lifecycle of a training run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainState {
    Running,
    /// The iteration budget was exhausted.
    Completed,
    /// A [`StopSignal`] fired at an iteration boundary.
    Interrupted,
}

/// Cooperative cancellation, polled once per iteration before any work.
pub trait StopSignal {
    fn should_stop(&self, iteration: usize) -> bool;
}

impl StopSignal for AtomicBool {
    fn should_stop(&self, _iteration: usize) -> bool {
        self.load(Ordering::SeqCst)
    }
}

/// Never interrupts; the run ends only when the budget is exhausted.
#[derive(Debug, Clone, Copy, Default)]
pub struct Never;

impl StopSignal for Never {
    fn should_stop(&self, _iteration: usize) -> bool {
        false
    }
}

/// Interrupts when the predicate returns `true` for the upcoming iteration.
pub struct StopWhen<F>(pub F);

impl<F: Fn(usize) -> bool> StopSignal for StopWhen<F> {
    fn should_stop(&self, iteration: usize) -> bool {
        (self.0)(iteration)
    }
}

/// Summary returned when the loop reaches a terminal state.
#[derive(Debug, Clone)]
pub struct TrainReport {
    pub state: TrainState,
    /// Iterations actually executed.
    pub iterations: usize,
    pub smooth_loss: f64,
    /// The sample that was written to `output_path`.
    pub sample: String,
    pub output_path: PathBuf,
}

/// Owns the model, optimizer state and corpus position for one run.
#[derive(Debug)]
pub struct Trainer {
    config: Config,
    vocab: Vocabulary,
    data: Vec<usize>,
    model: RNN,
    optimizer: Adagrad,
    hprev: Array1<f64>,
    window: Window,
    iteration: usize,
    smooth_loss: f64,
    last_loss: f64,
    sample: String,
    state: TrainState,
    rng: StdRng,
    output_path: PathBuf,
    metrics: Option<MetricsLog>,
}

impl Trainer {
    /// Build the vocabulary, encode the corpus and initialise parameters.
    ///
    /// # Errors
    /// `InvalidConfig` if the config is invalid or the corpus has no more
    /// than `seq_length` characters. Both are checked before any matrix is
    /// allocated.
    pub fn new(data: TrainingData, config: Config) -> RnnResult<Self> {
        config.validate()?;

        let vocab = Vocabulary::from_text(&data.text);
        let encoded = vocab.encode_str(&data.text)?;
        if encoded.len() <= config.seq_length {
            return Err(RnnError::InvalidConfig(format!(
                "corpus has {} characters; need more than seq_length ({})",
                encoded.len(),
                config.seq_length
            )));
        }
        info!(
            chars = encoded.len(),
            unique = vocab.size(),
            "data has {} characters, {} unique",
            encoded.len(),
            vocab.size()
        );

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let model = RNN::new(vocab.size(), config.hidden_size, &mut rng)?;
        let optimizer = Adagrad::new(&model);
        let smooth_loss = (vocab.size() as f64).ln() * config.seq_length as f64;

        Ok(Self {
            window: Window::new(config.seq_length, encoded.len()),
            hprev: Array1::zeros(config.hidden_size),
            config,
            vocab,
            data: encoded,
            model,
            optimizer,
            iteration: 0,
            smooth_loss,
            last_loss: 0.0,
            sample: String::new(),
            state: TrainState::Running,
            rng,
            output_path: data.output_path,
            metrics: None,
        })
    }

    /// Append a JSONL progress event at every sampling checkpoint.
    pub fn with_metrics_log(mut self, path: impl AsRef<Path>) -> RnnResult<Self> {
        self.metrics = Some(MetricsLog::open(path)?);
        Ok(self)
    }

    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub fn vocab(&self) -> &Vocabulary {
        &self.vocab
    }

    #[must_use]
    pub fn model(&self) -> &RNN {
        &self.model
    }

    #[must_use]
    pub fn optimizer(&self) -> &Adagrad {
        &self.optimizer
    }

    /// Hidden state carried into the next window.
    #[must_use]
    pub fn hidden(&self) -> &Array1<f64> {
        &self.hprev
    }

    /// Number of iterations executed so far.
    #[must_use]
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    /// Corpus position of the next window (before any reset check).
    #[must_use]
    pub fn pointer(&self) -> usize {
        self.window.pointer()
    }

    #[must_use]
    pub fn smooth_loss(&self) -> f64 {
        self.smooth_loss
    }

    /// Loss of the most recent window.
    #[must_use]
    pub fn last_loss(&self) -> f64 {
        self.last_loss
    }

    /// Most recent generated sample (empty before the first checkpoint).
    #[must_use]
    pub fn sample(&self) -> &str {
        &self.sample
    }

    #[must_use]
    pub fn state(&self) -> TrainState {
        self.state
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Execute one iteration: window, optional sample, forward/backward, update.
    ///
    /// Returns the window's loss.
    pub fn step(&mut self) -> RnnResult<f64> {
        let n = self.iteration;
        if self.window.prepare(n == 0) {
            self.hprev.fill(0.0);
        }

        let inputs = &self.data[self.window.inputs()];
        let targets = &self.data[self.window.targets()];

        let checkpoint = n % self.config.sample_every == 0;
        if checkpoint {
            let ixes =
                self.model
                    .sample(&self.hprev, inputs[0], self.config.sample_len, &mut self.rng)?;
            self.sample = self.vocab.decode_indices(&ixes)?;
            info!("----\n {} \n----", self.sample);
        }

        let (loss, grads, h_last) =
            self.model
                .loss_and_gradients(inputs, targets, &self.hprev, self.config.clip)?;
        self.smooth_loss = self.smooth_loss * SMOOTHING + loss * (1.0 - SMOOTHING);
        self.last_loss = loss;

        if checkpoint {
            info!(
                iteration = n,
                smooth_loss = self.smooth_loss,
                "iter {}/{} loss: {:.6}",
                n,
                self.config.iters,
                self.smooth_loss
            );
            if let Some(log) = self.metrics.as_mut() {
                log.record(&ProgressEvent {
                    iteration: n,
                    loss,
                    smooth_loss: self.smooth_loss,
                    sample: self.sample.clone(),
                })?;
            }
        }

        self.optimizer
            .update(&mut self.model, &grads, self.config.learning_rate);

        self.hprev = h_last;
        self.window.advance();
        self.iteration += 1;
        Ok(loss)
    }

    /// Run until the budget (`n <= iters`, i.e. `iters + 1` iterations) is
    /// spent or `stop` fires, then write the current sample to the output path.
    ///
    /// Faults inside an iteration propagate without touching the output file.
    pub fn run<S: StopSignal + ?Sized>(&mut self, stop: &S) -> RnnResult<TrainReport> {
        if self.state != TrainState::Running {
            return Err(RnnError::InvalidConfig(format!(
                "trainer already finished in state {:?}",
                self.state
            )));
        }
        debug!(
            iters = self.config.iters,
            hidden_size = self.config.hidden_size,
            seq_length = self.config.seq_length,
            "starting training"
        );

        let state = loop {
            if self.iteration > self.config.iters {
                info!("completed {} iterations", self.config.iters);
                break TrainState::Completed;
            }
            if stop.should_stop(self.iteration) {
                warn!(iteration = self.iteration, "training interrupted");
                break TrainState::Interrupted;
            }
            self.step()?;
        };

        self.finish(state)
    }

    fn finish(&mut self, state: TrainState) -> RnnResult<TrainReport> {
        fs::write(&self.output_path, &self.sample)
            .map_err(|e| RnnError::io(&self.output_path, e))?;
        self.state = state;
        info!(
            path = %self.output_path.display(),
            chars = self.sample.chars().count(),
            "wrote generated sample"
        );

        Ok(TrainReport {
            state,
            iterations: self.iteration,
            smooth_loss: self.smooth_loss,
            sample: self.sample.clone(),
            output_path: self.output_path.clone(),
        })
    }
}

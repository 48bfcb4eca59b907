//! Core vanilla RNN: parameters, forward pass, BPTT and sampling.
//!
//! ## Recurrence
//!
//! ```text
//! h_t = tanh(W_xh x_t + W_hh h_{t-1} + b_h)
//! y_t = W_hy h_t + b_y
//! p_t = softmax(y_t)
//! L   = Σ_t -ln p_t[target_t]
//! ```
//!
//! `x_t` is a one-hot vector, so `W_xh x_t` is the column of `W_xh` selected
//! by the input index.

use ndarray::{Array1, Array2};
use ndarray_rand::rand_distr::StandardNormal;
use ndarray_rand::RandomExt;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;

use crate::error::{RnnError, RnnResult};
use crate::utils::{add_outer, clip_inplace, max_abs, softmax, tanh_backward};

/// Scale applied to standard-normal weight initialisation.
pub const INIT_SCALE: f64 = 0.01;

/// A single-layer character RNN.
///
/// # Shapes
///
/// - `w_xh`: `(hidden, vocab)` input to hidden
/// - `w_hh`: `(hidden, hidden)` hidden to hidden
/// - `w_hy`: `(vocab, hidden)` hidden to output
/// - `b_h`: `(hidden)`, `b_y`: `(vocab)`
#[derive(Debug, Clone)]
pub struct RNN {
    pub w_xh: Array2<f64>,
    pub w_hh: Array2<f64>,
    pub w_hy: Array2<f64>,
    pub b_h: Array1<f64>,
    pub b_y: Array1<f64>,
}

/// Activations recorded by [`RNN::forward`] for the backward pass.
#[derive(Debug, Clone)]
pub struct ForwardPass {
    /// Summed cross-entropy over the window (not averaged).
    pub loss: f64,
    /// Input indices, one per time step.
    pub inputs: Vec<usize>,
    /// Hidden states; `hs[0]` is the incoming `hprev`, `hs[t + 1]` is `h_t`.
    pub hs: Vec<Array1<f64>>,
    /// Softmax output for every time step.
    pub ps: Vec<Array1<f64>>,
}

impl ForwardPass {
    /// Number of time steps.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inputs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }

    /// Hidden state after the last time step (the next window's `hprev`).
    #[must_use]
    pub fn last_hidden(&self) -> &Array1<f64> {
        &self.hs[self.hs.len() - 1]
    }
}

/// Gradients for all five parameter tensors, same shapes as [`RNN`].
#[derive(Debug, Clone)]
pub struct Gradients {
    pub w_xh: Array2<f64>,
    pub w_hh: Array2<f64>,
    pub w_hy: Array2<f64>,
    pub b_h: Array1<f64>,
    pub b_y: Array1<f64>,
}

impl Gradients {
    /// Zero gradients shaped like `model`.
    #[must_use]
    pub fn zeros_like(model: &RNN) -> Self {
        Self {
            w_xh: Array2::zeros(model.w_xh.dim()),
            w_hh: Array2::zeros(model.w_hh.dim()),
            w_hy: Array2::zeros(model.w_hy.dim()),
            b_h: Array1::zeros(model.b_h.len()),
            b_y: Array1::zeros(model.b_y.len()),
        }
    }

    /// Clip every element into `[-limit, limit]`.
    pub fn clip(&mut self, limit: f64) {
        clip_inplace(&mut self.w_xh, limit);
        clip_inplace(&mut self.w_hh, limit);
        clip_inplace(&mut self.w_hy, limit);
        clip_inplace(&mut self.b_h, limit);
        clip_inplace(&mut self.b_y, limit);
    }

    /// Largest absolute gradient element across all tensors.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        [
            max_abs(&self.w_xh),
            max_abs(&self.w_hh),
            max_abs(&self.w_hy),
            max_abs(&self.b_h),
            max_abs(&self.b_y),
        ]
        .into_iter()
        .fold(0.0, f64::max)
    }
}

impl RNN {
    /// Create an RNN with weights drawn from `N(0, 1) * 0.01` and zero biases.
    ///
    /// # Errors
    /// `InvalidConfig` if either dimension is zero.
    pub fn new<R: Rng + ?Sized>(
        vocab_size: usize,
        hidden_size: usize,
        rng: &mut R,
    ) -> RnnResult<Self> {
        if vocab_size == 0 || hidden_size == 0 {
            return Err(RnnError::InvalidConfig(format!(
                "vocab_size ({vocab_size}) and hidden_size ({hidden_size}) must be positive"
            )));
        }

        let w_xh: Array2<f64> =
            Array2::random_using((hidden_size, vocab_size), StandardNormal, rng) * INIT_SCALE;
        let w_hh: Array2<f64> =
            Array2::random_using((hidden_size, hidden_size), StandardNormal, rng) * INIT_SCALE;
        let w_hy: Array2<f64> =
            Array2::random_using((vocab_size, hidden_size), StandardNormal, rng) * INIT_SCALE;

        Ok(Self {
            w_xh,
            w_hh,
            w_hy,
            b_h: Array1::zeros(hidden_size),
            b_y: Array1::zeros(vocab_size),
        })
    }

    #[must_use]
    pub fn vocab_size(&self) -> usize {
        self.w_xh.ncols()
    }

    #[must_use]
    pub fn hidden_size(&self) -> usize {
        self.w_hh.nrows()
    }

    fn check_index(&self, idx: usize) -> RnnResult<()> {
        if idx < self.vocab_size() {
            Ok(())
        } else {
            Err(RnnError::UnknownIndex(idx))
        }
    }

    fn check_hidden(&self, h: &Array1<f64>) -> RnnResult<()> {
        if h.len() == self.hidden_size() {
            Ok(())
        } else {
            Err(RnnError::ShapeMismatch(format!(
                "hidden state has {} elements, expected {}",
                h.len(),
                self.hidden_size()
            )))
        }
    }

    /// One recurrent step without bounds checks.
    fn step_unchecked(&self, x: usize, h: &Array1<f64>) -> (Array1<f64>, Array1<f64>) {
        let pre = &self.w_xh.column(x) + &self.w_hh.dot(h) + &self.b_h;
        let h_next = pre.mapv(f64::tanh);
        let y = self.w_hy.dot(&h_next) + &self.b_y;
        let p = softmax(&y);
        (h_next, p)
    }

    /// Advance the recurrence by one input character.
    ///
    /// Returns `(h_next, probabilities)`.
    pub fn step(&self, x: usize, h: &Array1<f64>) -> RnnResult<(Array1<f64>, Array1<f64>)> {
        self.check_index(x)?;
        self.check_hidden(h)?;
        Ok(self.step_unchecked(x, h))
    }

    /// Run the window forward and accumulate cross-entropy loss.
    ///
    /// # Errors
    /// `ShapeMismatch` if `inputs` and `targets` differ in length or `hprev`
    /// has the wrong size; `UnknownIndex` for an index outside the vocabulary.
    pub fn forward(
        &self,
        inputs: &[usize],
        targets: &[usize],
        hprev: &Array1<f64>,
    ) -> RnnResult<ForwardPass> {
        if inputs.len() != targets.len() {
            return Err(RnnError::ShapeMismatch(format!(
                "{} inputs vs {} targets",
                inputs.len(),
                targets.len()
            )));
        }
        self.check_hidden(hprev)?;
        for &idx in inputs.iter().chain(targets) {
            self.check_index(idx)?;
        }

        let mut hs = Vec::with_capacity(inputs.len() + 1);
        let mut ps = Vec::with_capacity(inputs.len());
        hs.push(hprev.clone());
        let mut loss = 0.0;

        for (t, (&x, &target)) in inputs.iter().zip(targets).enumerate() {
            let (h, p) = self.step_unchecked(x, &hs[t]);
            loss -= p[target].ln();
            hs.push(h);
            ps.push(p);
        }

        Ok(ForwardPass {
            loss,
            inputs: inputs.to_vec(),
            hs,
            ps,
        })
    }

    /// Backpropagation through time over a recorded forward pass.
    ///
    /// Gradients are summed over time steps and then clipped element-wise to
    /// `[-clip, clip]`.
    pub fn backward(&self, pass: &ForwardPass, targets: &[usize], clip: f64) -> RnnResult<Gradients> {
        if targets.len() != pass.len() {
            return Err(RnnError::ShapeMismatch(format!(
                "{} targets for a {}-step forward pass",
                targets.len(),
                pass.len()
            )));
        }
        for &idx in targets {
            self.check_index(idx)?;
        }

        let mut grads = Gradients::zeros_like(self);
        let mut dhnext = Array1::zeros(self.hidden_size());

        for t in (0..pass.len()).rev() {
            let h = &pass.hs[t + 1];
            let h_prev = &pass.hs[t];

            // softmax + cross-entropy: dy = p - onehot(target)
            let mut dy = pass.ps[t].clone();
            dy[targets[t]] -= 1.0;

            add_outer(&mut grads.w_hy, dy.view(), h.view());
            grads.b_y += &dy;

            let dh = self.w_hy.t().dot(&dy) + &dhnext;
            let dhraw = tanh_backward(h, &dh);

            grads.b_h += &dhraw;
            let mut col = grads.w_xh.column_mut(pass.inputs[t]);
            col += &dhraw;
            add_outer(&mut grads.w_hh, dhraw.view(), h_prev.view());

            dhnext = self.w_hh.t().dot(&dhraw);
        }

        grads.clip(clip);
        Ok(grads)
    }

    /// Forward, backward and clip in one call.
    ///
    /// Returns `(loss, gradients, last hidden state)`.
    pub fn loss_and_gradients(
        &self,
        inputs: &[usize],
        targets: &[usize],
        hprev: &Array1<f64>,
        clip: f64,
    ) -> RnnResult<(f64, Gradients, Array1<f64>)> {
        let pass = self.forward(inputs, targets, hprev)?;
        let grads = self.backward(&pass, targets, clip)?;
        let h_last = pass.last_hidden().clone();
        Ok((pass.loss, grads, h_last))
    }

    /// Draw `n` character indices from the model, starting at `seed_ix`.
    ///
    /// Each step samples from the softmax distribution (not argmax) and feeds
    /// the draw back in. `h` is copied; the caller's state is untouched.
    ///
    /// # Errors
    /// `Numeric` if a probability vector is degenerate (NaN or zero mass).
    pub fn sample<R: Rng + ?Sized>(
        &self,
        h: &Array1<f64>,
        seed_ix: usize,
        n: usize,
        rng: &mut R,
    ) -> RnnResult<Vec<usize>> {
        self.check_index(seed_ix)?;
        self.check_hidden(h)?;

        let mut h = h.clone();
        let mut x = seed_ix;
        let mut ixes = Vec::with_capacity(n);

        for _ in 0..n {
            let (h_next, p) = self.step_unchecked(x, &h);
            let dist = WeightedIndex::<f64>::new(p.iter())
                .map_err(|e| RnnError::Numeric(format!("cannot sample from {p}: {e}")))?;
            x = dist.sample(rng);
            ixes.push(x);
            h = h_next;
        }

        Ok(ixes)
    }
}

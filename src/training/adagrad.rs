//! Adagrad parameter update.

use ndarray::{Array, Array1, Array2, Dimension, Zip};

use crate::core::{Gradients, RNN};

/// Added under the square root so untouched parameters never divide by zero.
pub const ADAGRAD_EPS: f64 = 1e-8;

/// Running sums of squared gradients, one accumulator per parameter.
#[derive(Debug, Clone)]
pub struct Adagrad {
    pub m_xh: Array2<f64>,
    pub m_hh: Array2<f64>,
    pub m_hy: Array2<f64>,
    pub m_bh: Array1<f64>,
    pub m_by: Array1<f64>,
}

impl Adagrad {
    /// Zeroed accumulators shaped like `model`.
    #[must_use]
    pub fn new(model: &RNN) -> Self {
        Self {
            m_xh: Array2::zeros(model.w_xh.dim()),
            m_hh: Array2::zeros(model.w_hh.dim()),
            m_hy: Array2::zeros(model.w_hy.dim()),
            m_bh: Array1::zeros(model.b_h.len()),
            m_by: Array1::zeros(model.b_y.len()),
        }
    }

    /// `mem += g²; param -= lr * g / sqrt(mem + eps)` for every parameter.
    pub fn update(&mut self, model: &mut RNN, grads: &Gradients, learning_rate: f64) {
        apply(&mut model.w_xh, &mut self.m_xh, &grads.w_xh, learning_rate);
        apply(&mut model.w_hh, &mut self.m_hh, &grads.w_hh, learning_rate);
        apply(&mut model.w_hy, &mut self.m_hy, &grads.w_hy, learning_rate);
        apply(&mut model.b_h, &mut self.m_bh, &grads.b_h, learning_rate);
        apply(&mut model.b_y, &mut self.m_by, &grads.b_y, learning_rate);
    }
}

fn apply<D: Dimension>(
    param: &mut Array<f64, D>,
    mem: &mut Array<f64, D>,
    grad: &Array<f64, D>,
    learning_rate: f64,
) {
    Zip::from(param)
        .and(mem)
        .and(grad)
        .for_each(|p, m, &g| {
            *m += g * g;
            *p -= learning_rate * g / (*m + ADAGRAD_EPS).sqrt();
        });
}

//! Math utilities: softmax, tanh backprop, clipping, outer-product accumulation.

use ndarray::{Array, Array1, Array2, ArrayView1, Dimension};

/// Numerically stable softmax over a score vector.
///
/// The maximum is subtracted before exponentiation; the result is identical
/// to `exp(y) / sum(exp(y))` but cannot overflow.
#[must_use]
pub fn softmax(scores: &Array1<f64>) -> Array1<f64> {
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp = scores.mapv(|v| (v - max).exp());
    let sum = exp.sum();
    exp / sum
}

/// Backprop through tanh given the activation output `h = tanh(a)`:
/// `da = (1 - h²) ⊙ dh`.
#[must_use]
pub fn tanh_backward(h: &Array1<f64>, dh: &Array1<f64>) -> Array1<f64> {
    let mut out = dh.clone();
    out.zip_mut_with(h, |d, &h| *d *= 1.0 - h * h);
    out
}

/// Clip every element into `[-limit, limit]` in place.
pub fn clip_inplace<D: Dimension>(values: &mut Array<f64, D>, limit: f64) {
    values.mapv_inplace(|v| v.clamp(-limit, limit));
}

/// Accumulate the outer product `a bᵀ` into `m`.
pub fn add_outer(m: &mut Array2<f64>, a: ArrayView1<f64>, b: ArrayView1<f64>) {
    for ((i, j), v) in m.indexed_iter_mut() {
        *v += a[i] * b[j];
    }
}

/// Largest absolute element, or 0 for an empty array.
#[must_use]
pub fn max_abs<D: Dimension>(values: &Array<f64, D>) -> f64 {
    values.iter().fold(0.0f64, |acc, v| acc.max(v.abs()))
}

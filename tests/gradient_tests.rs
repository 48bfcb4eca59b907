//! Tests for the forward pass and BPTT gradients.
//!
//! These tests verify:
//! - Analytical gradients match central finite differences
//! - Loss is non-negative for arbitrary index sequences
//! - Clipping bounds every gradient element to [-5, 5]
//! - Sampling is reproducible under a fixed seed

use approx::assert_abs_diff_eq;
use lyrics_rnn::{Gradients, RNN};
use ndarray::Array1;
use rand::rngs::StdRng;
use rand::SeedableRng;

const CLIP: f64 = 5.0;

fn seeded_model(vocab: usize, hidden: usize, seed: u64) -> RNN {
    let mut rng = StdRng::seed_from_u64(seed);
    RNN::new(vocab, hidden, &mut rng).expect("Failed to create RNN")
}

/// Scale all weights so gradients are far from zero.
fn scaled_model(vocab: usize, hidden: usize, scale: f64) -> RNN {
    let mut model = seeded_model(vocab, hidden, 42);
    model.w_xh *= scale;
    model.w_hh *= scale;
    model.w_hy *= scale;
    model.b_h.iter_mut().enumerate().for_each(|(i, b)| *b = 0.01 * i as f64);
    model.b_y.iter_mut().enumerate().for_each(|(i, b)| *b = -0.02 * i as f64);
    model
}

fn loss(model: &RNN, inputs: &[usize], targets: &[usize], hprev: &Array1<f64>) -> f64 {
    model.forward(inputs, targets, hprev).expect("forward").loss
}

// ============================================================================
// GRADIENT CHECK
// ============================================================================

/// Compare every analytical gradient element against a central difference.
#[test]
fn test_gradients_match_finite_differences() {
    let mut model = scaled_model(5, 4, 20.0);
    let inputs: [usize; 6] = [0, 3, 1, 4, 2, 2];
    let targets: [usize; 6] = [3, 1, 4, 2, 2, 0];
    let hprev = Array1::from(vec![0.1, -0.3, 0.2, 0.05]);

    let (_, grads, _) = model
        .loss_and_gradients(&inputs, &targets, &hprev, CLIP)
        .expect("loss_and_gradients");
    assert!(grads.max_abs() < CLIP, "gradient check needs unclipped gradients");

    let h = 1e-5;
    let tolerance = 1e-6;

    macro_rules! check {
        ($param:ident) => {{
            let analytic = grads.$param.clone();
            for (idx, &expected) in analytic.indexed_iter() {
                let original = model.$param[idx];
                model.$param[idx] = original + h;
                let plus = loss(&model, &inputs, &targets, &hprev);
                model.$param[idx] = original - h;
                let minus = loss(&model, &inputs, &targets, &hprev);
                model.$param[idx] = original;

                let numeric = (plus - minus) / (2.0 * h);
                assert_abs_diff_eq!(expected, numeric, epsilon = tolerance);
            }
        }};
    }

    check!(w_xh);
    check!(w_hh);
    check!(w_hy);
    check!(b_h);
    check!(b_y);
}

/// Inputs that never occur contribute nothing to their W_xh column.
#[test]
fn test_unused_input_columns_have_zero_gradient() {
    let model = seeded_model(6, 3, 1);
    let hprev = Array1::zeros(3);
    let (_, grads, _) = model
        .loss_and_gradients(&[0, 1, 0, 1], &[1, 0, 1, 0], &hprev, CLIP)
        .expect("loss_and_gradients");

    for col in 2..6 {
        assert!(grads.w_xh.column(col).iter().all(|&g| g == 0.0));
    }
    assert!(grads.w_xh.column(0).iter().any(|&g| g != 0.0));
}

// ============================================================================
// LOSS AND CLIPPING PROPERTIES
// ============================================================================

/// Cross-entropy of a valid distribution is never negative.
#[test]
fn test_loss_non_negative() {
    for seed in 0..10 {
        let model = seeded_model(7, 5, seed);
        let inputs: Vec<usize> = (0..12).map(|i| (i * 3 + seed as usize) % 7).collect();
        let targets: Vec<usize> = (0..12).map(|i| (i * 5 + 1) % 7).collect();
        let pass = model
            .forward(&inputs, &targets, &Array1::zeros(5))
            .expect("forward");
        assert!(pass.loss >= 0.0, "negative loss {}", pass.loss);
        assert!(pass.loss.is_finite());
    }
}

/// Huge weights produce huge raw gradients; clipping must bound them.
#[test]
fn test_gradient_clipping_bound() {
    let mut model = scaled_model(4, 6, 2_000.0);
    // Always predict class 0: db_y[0] sums to 25 - 6 before clipping.
    model.b_y[0] = 500.0;
    let inputs: Vec<usize> = (0..25).map(|i| i % 4).collect();
    let targets: Vec<usize> = (0..25).map(|i| (i + 1) % 4).collect();

    let (_, grads, h_last) = model
        .loss_and_gradients(&inputs, &targets, &Array1::zeros(6), CLIP)
        .expect("loss_and_gradients");

    let Gradients {
        w_xh,
        w_hh,
        w_hy,
        b_h,
        b_y,
    } = &grads;
    for g in w_xh.iter().chain(w_hh).chain(w_hy).chain(b_h).chain(b_y) {
        assert!((-CLIP..=CLIP).contains(g), "gradient {g} outside clip range");
    }
    assert_abs_diff_eq!(grads.max_abs(), CLIP, epsilon = 1e-12);
    assert!(h_last.iter().all(|v| v.abs() <= 1.0));
}

/// The returned hidden state is the last step's activation, in (-1, 1).
#[test]
fn test_last_hidden_matches_forward() {
    let model = seeded_model(3, 4, 9);
    let hprev = Array1::zeros(4);
    let pass = model.forward(&[0, 1, 2], &[1, 2, 0], &hprev).expect("forward");
    let (_, _, h_last) = model
        .loss_and_gradients(&[0, 1, 2], &[1, 2, 0], &hprev, CLIP)
        .expect("loss_and_gradients");
    assert_eq!(&h_last, pass.last_hidden());

    let (h_step, _) = model.step(2, &pass.hs[2]).expect("step");
    assert_eq!(&h_step, pass.last_hidden());
}

// ============================================================================
// SAMPLING
// ============================================================================

/// Same model state, seed index and RNG seed produce the same sequence.
#[test]
fn test_sampling_deterministic_under_seed() {
    let model = seeded_model(10, 8, 5);
    let h = Array1::from_elem(8, 0.1);

    let mut rng_a = StdRng::seed_from_u64(1234);
    let mut rng_b = StdRng::seed_from_u64(1234);
    let a = model.sample(&h, 3, 200, &mut rng_a).expect("sample");
    let b = model.sample(&h, 3, 200, &mut rng_b).expect("sample");

    assert_eq!(a, b);
    assert_eq!(a.len(), 200);
    assert!(a.iter().all(|&ix| ix < 10));
}

/// Sampling draws from the distribution rather than taking the argmax.
#[test]
fn test_sampling_is_stochastic() {
    let model = seeded_model(10, 8, 5);
    let h = Array1::zeros(8);
    let mut rng = StdRng::seed_from_u64(99);
    let draws = model.sample(&h, 0, 500, &mut rng).expect("sample");

    let mut distinct = draws.clone();
    distinct.sort_unstable();
    distinct.dedup();
    // near-uniform model over 10 chars: argmax would give one repeating cycle
    assert!(distinct.len() > 5, "only {} distinct draws", distinct.len());
}

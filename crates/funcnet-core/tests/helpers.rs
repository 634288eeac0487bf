//! Shared test helpers for the funcnet-core integration tests.
//!
//! Deterministic signal and adjacency generators so failures reproduce
//! exactly across runs.

#![allow(dead_code)]

use std::f64::consts::PI;

use funcnet_core::types::Signal;
use ndarray::{Array2, Array3};

// ---------------------------------------------------------------------------
// Random number generator (simple LCG for deterministic reproducibility)
// ---------------------------------------------------------------------------

/// Minimal linear congruential generator for reproducible test data.
pub struct Lcg {
    state: u64,
}

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        self.state
    }

    /// Uniform f64 in [0, 1).
    pub fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Uniform f64 in [lo, hi).
    pub fn next_f64_range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

// ---------------------------------------------------------------------------
// Signals
// ---------------------------------------------------------------------------

/// White-noise signal, `n_sample x n_node`.
pub fn noise_signal(n_sample: usize, n_node: usize, seed: u64) -> Signal {
    let mut rng = Lcg::new(seed);
    let data = Array2::from_shape_simple_fn((n_sample, n_node), || rng.next_f64_range(-1.0, 1.0));
    Signal::new(data).expect("noise signal is valid")
}

/// Noise signal where node 1 is node 0 delayed by `delay` samples.
pub fn delayed_pair_signal(n_sample: usize, delay: usize, seed: u64) -> Signal {
    let mut rng = Lcg::new(seed);
    let source: Vec<f64> = (0..n_sample).map(|_| rng.next_f64_range(-1.0, 1.0)).collect();
    let delayed: Vec<f64> = (0..n_sample)
        .map(|t| {
            if t >= delay {
                source[t - delay]
            } else {
                rng.next_f64_range(-1.0, 1.0)
            }
        })
        .collect();
    Signal::from_columns(&[source, delayed]).expect("delayed pair is valid")
}

/// Three nodes over one period of a sine sampled at 4 points:
/// `sin`, `2 * sin + 1` and `cos`.
pub fn quarter_period_sines() -> Signal {
    let sin: Vec<f64> = (0..4).map(|t| (2.0 * PI * t as f64 / 4.0).sin()).collect();
    let scaled: Vec<f64> = sin.iter().map(|v| 2.0 * v + 1.0).collect();
    let cos: Vec<f64> = (0..4).map(|t| (2.0 * PI * t as f64 / 4.0).cos()).collect();
    Signal::from_columns(&[sin, scaled, cos]).expect("sines are valid")
}

// ---------------------------------------------------------------------------
// Adjacency matrices
// ---------------------------------------------------------------------------

/// Random symmetric matrix with zero diagonal.
pub fn random_symmetric(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = Lcg::new(seed);
    let mut adj = Array2::zeros((n, n));
    for i in 0..n {
        for j in (i + 1)..n {
            let w = rng.next_f64_range(0.0, 1.0);
            adj[[i, j]] = w;
            adj[[j, i]] = w;
        }
    }
    adj
}

/// Random zero-diagonal matrix that is guaranteed asymmetric.
pub fn random_directed(n: usize, seed: u64) -> Array2<f64> {
    let mut rng = Lcg::new(seed);
    let mut adj = Array2::from_shape_fn((n, n), |(i, j)| {
        if i == j {
            0.0
        } else {
            rng.next_f64_range(0.0, 1.0)
        }
    });
    adj[[0, 1]] = adj[[1, 0]] + 1.0;
    adj
}

/// Stack of `batch` random symmetric matrices.
pub fn symmetric_batch(batch: usize, n: usize, seed: u64) -> Array3<f64> {
    let mut out = Array3::zeros((batch, n, n));
    for b in 0..batch {
        out.index_axis_mut(ndarray::Axis(0), b)
            .assign(&random_symmetric(n, seed.wrapping_add(b as u64)));
    }
    out
}

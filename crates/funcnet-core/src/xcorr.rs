//! Lagged cross-correlation engine.
//!
//! For every ordered pair of distinct nodes `(i, j)` the engine computes the
//! full linear cross-correlation
//!
//! ```text
//! r_ij[k] = (1 / n_sample) * sum_t x_i[t + k] * x_j[t]
//! ```
//!
//! over lags `k in [-n_sample, n_sample)`, where each `x` is the node series
//! normalised to zero mean and unit (population) variance. The computation
//! runs in the frequency domain: every node is zero-padded to `2 * n_sample`
//! so the circular correlation of the FFT equals the linear one, and the
//! cross-power spectrum `X_i * conj(X_j)` is inverse-transformed per pair.
//!
//! Cost is `O(n_node^2 * n_sample * log n_sample)` time and
//! `O(n_node^2 * n_sample)` memory for the output tensor, which is sized and
//! checked against [`EngineConfig::max_tensor_elements`] before allocation.
//!
//! Self-pairs are never evaluated: the diagonal of every lag slice is zero.

use ndarray::{Array1, Array2, Array3, Axis};
use num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use tracing::{debug, trace, warn};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::config::{DegeneracyPolicy, EngineConfig};
use crate::error::{FuncNetError, Result};
use crate::types::{LagWindow, LaggedAdjacency, PeakAdjacency, Signal};
use crate::validation;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Configurable cross-correlation engine.
///
/// Stateless apart from its configuration; a single engine can be shared
/// across threads and used on independent signals concurrently.
#[derive(Debug, Clone, Default)]
pub struct XcorrEngine {
    config: EngineConfig,
}

impl XcorrEngine {
    /// Create an engine with the given configuration.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compute the lagged cross-correlation tensor of `signal` sampled at
    /// `fs` Hz.
    ///
    /// The signal is taken by value and normalised in place; clone it first
    /// if the raw samples are still needed.
    ///
    /// The returned tensor is indexed `[lag, node_i, node_j]` with
    /// `2 * n_sample` lags in ascending order, from `-n_sample / fs` to
    /// `(n_sample - 1) / fs`.
    ///
    /// # Errors
    ///
    /// - [`FuncNetError::ParameterOutOfRange`] if `fs` is not finite and
    ///   positive.
    /// - [`FuncNetError::ResourceLimit`] if the tensor would exceed the
    ///   configured element cap.
    /// - [`FuncNetError::NumericDegeneracy`] for a constant node under
    ///   [`DegeneracyPolicy::Reject`].
    pub fn compute(&self, mut signal: Signal, fs: f64) -> Result<LaggedAdjacency> {
        validation::validate_sampling_rate(fs)?;
        let n_sample = signal.n_sample();
        let n_node = signal.n_node();
        let elements =
            validation::validate_tensor_size(n_sample, n_node, self.config.max_tensor_elements)?;

        debug!(n_sample, n_node, fs, elements, "xcorr: computing lagged tensor");

        normalize_nodes(&mut signal, self.config.degeneracy)?;

        let n_fft = 2 * n_sample;
        let mut planner = FftPlanner::<f64>::new();
        let forward = planner.plan_fft_forward(n_fft);
        let inverse = planner.plan_fft_inverse(n_fft);

        let spectra = node_spectra(&signal, forward.as_ref(), n_fft);

        let wrapped = wrapped_lags(n_sample, fs);
        let order = unwrap_order(&wrapped);
        let lags: Array1<f64> = order.iter().map(|&w| wrapped[w]).collect();

        // 1/n_fft undoes the unnormalised inverse transform.
        let scale = 1.0 / (n_fft as f64 * n_sample as f64);
        let mut tensor = Array3::<f64>::zeros((n_fft, n_node, n_node));

        let pairs: Vec<(usize, usize)> = (0..n_node)
            .flat_map(|i| (0..n_node).filter(move |&j| j != i).map(move |j| (i, j)))
            .collect();

        #[cfg(feature = "parallel")]
        {
            let scratch_len = inverse.get_inplace_scratch_len();
            let results: Vec<((usize, usize), Vec<f64>)> = pairs
                .par_iter()
                .map_init(
                    || PairBuffers::new(n_fft, scratch_len),
                    |bufs, &(i, j)| {
                        let xc = pair_magnitude(
                            inverse.as_ref(),
                            &spectra[i],
                            &spectra[j],
                            scale,
                            bufs,
                        );
                        ((i, j), xc)
                    },
                )
                .collect();
            for ((i, j), xc) in results {
                scatter_pair(&mut tensor, &order, i, j, &xc);
            }
        }

        #[cfg(not(feature = "parallel"))]
        {
            let mut bufs = PairBuffers::new(n_fft, inverse.get_inplace_scratch_len());
            for &(i, j) in &pairs {
                let xc =
                    pair_magnitude(inverse.as_ref(), &spectra[i], &spectra[j], scale, &mut bufs);
                scatter_pair(&mut tensor, &order, i, j, &xc);
            }
        }

        debug!(n_lag = n_fft, pairs = pairs.len(), "xcorr: done");

        Ok(LaggedAdjacency::from_parts_unchecked(tensor, lags))
    }
}

/// Compute the lagged cross-correlation tensor with the default
/// [`EngineConfig`].
///
/// See [`XcorrEngine::compute`].
pub fn compute_lagged_xcorr(signal: Signal, fs: f64) -> Result<LaggedAdjacency> {
    XcorrEngine::default().compute(signal, fs)
}

// ---------------------------------------------------------------------------
// Lag window reduction
// ---------------------------------------------------------------------------

/// Reduce a lagged tensor to a single adjacency matrix by taking, per node
/// pair, the peak magnitude over lags with `tau_min <= |lag| <= tau_max`.
///
/// The result is directed in general; the diagonal stays zero.
///
/// # Errors
///
/// Returns [`FuncNetError::InvalidWindow`] if the window bounds are malformed
/// or select no lag.
pub fn reduce_to_adjacency(lagged: &LaggedAdjacency, window: &LagWindow) -> Result<Array2<f64>> {
    let selected = select_lags(lagged, window)?;
    let tensor = lagged.tensor();

    let mut adj = tensor.index_axis(Axis(0), selected[0]).mapv(f64::abs);
    for &s in &selected[1..] {
        adj.zip_mut_with(&tensor.index_axis(Axis(0), s), |peak, &v| {
            let v = v.abs();
            if v.is_nan() || v > *peak {
                *peak = v;
            }
        });
    }

    debug!(
        n_node = lagged.n_node(),
        selected = selected.len(),
        "xcorr: reduced to adjacency"
    );
    Ok(adj)
}

/// Like [`reduce_to_adjacency`], but also reports the lag at which each peak
/// occurred.
///
/// Ties resolve to the earliest (most negative) lag in the window.
///
/// # Errors
///
/// Same as [`reduce_to_adjacency`].
pub fn reduce_to_peak(lagged: &LaggedAdjacency, window: &LagWindow) -> Result<PeakAdjacency> {
    let selected = select_lags(lagged, window)?;
    let tensor = lagged.tensor();
    let lags = lagged.lags();
    let n_node = lagged.n_node();

    let mut weights = tensor.index_axis(Axis(0), selected[0]).mapv(f64::abs);
    let mut delays = Array2::from_elem((n_node, n_node), lags[selected[0]]);

    for &s in &selected[1..] {
        let slice = tensor.index_axis(Axis(0), s);
        let lag = lags[s];
        ndarray::Zip::from(&mut weights)
            .and(&mut delays)
            .and(&slice)
            .for_each(|peak, delay, &v| {
                let v = v.abs();
                if !peak.is_nan() && (v.is_nan() || v > *peak) {
                    *peak = v;
                    *delay = lag;
                }
            });
    }

    Ok(PeakAdjacency { weights, delays })
}

fn select_lags(lagged: &LaggedAdjacency, window: &LagWindow) -> Result<Vec<usize>> {
    validation::validate_window(window)?;
    let lags = lagged.lags();
    let selected: Vec<usize> = lags
        .iter()
        .enumerate()
        .filter(|&(_, &l)| window.contains(l))
        .map(|(idx, _)| idx)
        .collect();

    if selected.is_empty() {
        let (lo, hi) = if lags.is_empty() {
            (f64::NAN, f64::NAN)
        } else {
            (lags[0], lags[lags.len() - 1])
        };
        return Err(FuncNetError::invalid_window(format!(
            "window [{}, {:?}] selects no lag in [{}, {}]",
            window.tau_min, window.tau_max, lo, hi,
        )));
    }
    Ok(selected)
}

// ---------------------------------------------------------------------------
// Lag axis
// ---------------------------------------------------------------------------

/// Lag axis in the natural output order of the inverse FFT:
/// `0, 1, .., n_sample - 1, -n_sample, .., -1`, divided by `fs`.
pub fn wrapped_lags(n_sample: usize, fs: f64) -> Array1<f64> {
    let n = n_sample as i64;
    (0..n).chain(-n..0).map(|k| k as f64 / fs).collect()
}

/// Permutation that sorts `lags` ascending (`order[s]` is the wrapped index
/// placed at sorted position `s`).
fn unwrap_order(lags: &Array1<f64>) -> Vec<usize> {
    let mut order: Vec<usize> = (0..lags.len()).collect();
    order.sort_by(|&a, &b| lags[a].total_cmp(&lags[b]));
    order
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

/// Normalise each node to zero mean and unit population variance.
fn normalize_nodes(signal: &mut Signal, policy: DegeneracyPolicy) -> Result<()> {
    let data = signal.data_mut();
    for (node, mut col) in data.axis_iter_mut(Axis(1)).enumerate() {
        let first = col[0];
        if col.iter().all(|&v| v == first) {
            match policy {
                DegeneracyPolicy::Reject => {
                    return Err(FuncNetError::NumericDegeneracy { node });
                }
                DegeneracyPolicy::Propagate => {
                    warn!(node, "constant node; its correlations will be non-finite");
                }
            }
        }

        let n = col.len() as f64;
        let mean = col.sum() / n;
        col.mapv_inplace(|v| v - mean);
        let std = (col.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
        col.mapv_inplace(|v| v / std);
    }
    Ok(())
}

/// Forward transform of every zero-padded node series.
fn node_spectra(signal: &Signal, forward: &dyn Fft<f64>, n_fft: usize) -> Vec<Vec<Complex<f64>>> {
    let mut scratch = vec![Complex::new(0.0, 0.0); forward.get_inplace_scratch_len()];
    (0..signal.n_node())
        .map(|node| {
            let mut buf = vec![Complex::new(0.0, 0.0); n_fft];
            for (slot, &v) in buf.iter_mut().zip(signal.node(node).iter()) {
                slot.re = v;
            }
            forward.process_with_scratch(&mut buf, &mut scratch);
            buf
        })
        .collect()
}

struct PairBuffers {
    spectrum: Vec<Complex<f64>>,
    scratch: Vec<Complex<f64>>,
}

impl PairBuffers {
    fn new(n_fft: usize, scratch_len: usize) -> Self {
        Self {
            spectrum: vec![Complex::new(0.0, 0.0); n_fft],
            scratch: vec![Complex::new(0.0, 0.0); scratch_len],
        }
    }
}

/// `|r_ij[k]|` in wrapped lag order.
fn pair_magnitude(
    inverse: &dyn Fft<f64>,
    spec_i: &[Complex<f64>],
    spec_j: &[Complex<f64>],
    scale: f64,
    bufs: &mut PairBuffers,
) -> Vec<f64> {
    for ((out, a), b) in bufs.spectrum.iter_mut().zip(spec_i).zip(spec_j) {
        *out = a * b.conj();
    }
    inverse.process_with_scratch(&mut bufs.spectrum, &mut bufs.scratch);
    bufs.spectrum.iter().map(|c| (c.re * scale).abs()).collect()
}

fn scatter_pair(tensor: &mut Array3<f64>, order: &[usize], i: usize, j: usize, xc: &[f64]) {
    trace!(i, j, "xcorr: pair");
    for (s, &w) in order.iter().enumerate() {
        tensor[[s, i, j]] = xc[w];
    }
}

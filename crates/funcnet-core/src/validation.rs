//! Eager input validation.
//!
//! Every check runs before any allocation or transform so callers get a
//! precise [`FuncNetError`] instead of NaN-filled output or an oversized
//! allocation.

use ndarray::{ArrayView1, ArrayView2, ArrayView3};

use crate::error::{FuncNetError, Result};
use crate::types::{LagBound, LagWindow};

/// Minimum number of nodes in a signal or adjacency matrix.
pub const MIN_NODES: usize = 2;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Validate a `[n_sample, n_node]` signal.
///
/// 1. `n_node >= 2`.
/// 2. `n_sample >= 1`.
/// 3. Every sample is finite.
///
/// Variance is not checked here; see
/// [`DegeneracyPolicy`](crate::config::DegeneracyPolicy).
pub fn validate_signal(signal: &ArrayView2<'_, f64>) -> Result<()> {
    let (n_sample, n_node) = signal.dim();
    if n_node < MIN_NODES {
        return Err(FuncNetError::invalid_shape(format!(
            "signal has {} node(s), need at least {}",
            n_node, MIN_NODES,
        )));
    }
    if n_sample == 0 {
        return Err(FuncNetError::invalid_shape("signal has no samples"));
    }

    if let Some(((t, j), v)) = signal.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(FuncNetError::ParameterOutOfRange {
            name: format!("signal[{t}, {j}]"),
            value: v.to_string(),
            expected: "finite sample".into(),
        });
    }

    Ok(())
}

/// Validate a sampling frequency: finite and strictly positive.
pub fn validate_sampling_rate(fs: f64) -> Result<()> {
    if !fs.is_finite() || fs <= 0.0 {
        return Err(FuncNetError::ParameterOutOfRange {
            name: "fs".into(),
            value: fs.to_string(),
            expected: "finite value > 0".into(),
        });
    }
    Ok(())
}

/// Check that the lagged tensor for this signal fits under `limit` elements
/// and return its size.
///
/// The tensor holds `2 * n_sample * n_node^2` values.
pub fn validate_tensor_size(n_sample: usize, n_node: usize, limit: usize) -> Result<usize> {
    let requested = n_sample
        .checked_mul(2)
        .and_then(|n_lag| n_lag.checked_mul(n_node))
        .and_then(|v| v.checked_mul(n_node))
        .unwrap_or(usize::MAX);
    if requested > limit {
        return Err(FuncNetError::ResourceLimit { requested, limit });
    }
    Ok(requested)
}

// ---------------------------------------------------------------------------
// Lag window / lagged tensor
// ---------------------------------------------------------------------------

/// Validate the bounds of a lag window.
///
/// `tau_min` must not be NaN and `tau_max`, when finite, must be a number no
/// smaller than `tau_min`. Whether any lag is actually selected is checked at
/// reduction time.
pub fn validate_window(window: &LagWindow) -> Result<()> {
    if window.tau_min.is_nan() {
        return Err(FuncNetError::invalid_window("tau_min is NaN"));
    }
    if let LagBound::Finite(max) = window.tau_max {
        if max.is_nan() {
            return Err(FuncNetError::invalid_window("tau_max is NaN"));
        }
        if max < window.tau_min {
            return Err(FuncNetError::invalid_window(format!(
                "tau_max {} is below tau_min {}",
                max, window.tau_min,
            )));
        }
    }
    Ok(())
}

/// Validate a `[lag, node, node]` tensor against its lag axis.
pub fn validate_lagged(tensor: &ArrayView3<'_, f64>, lags: &ArrayView1<'_, f64>) -> Result<()> {
    let (n_lag, rows, cols) = tensor.dim();
    if rows != cols {
        return Err(FuncNetError::invalid_shape(format!(
            "lagged tensor trailing axes {}x{} are not square",
            rows, cols,
        )));
    }
    if lags.len() != n_lag {
        return Err(FuncNetError::invalid_shape(format!(
            "lags length {} does not match tensor lag axis {}",
            lags.len(),
            n_lag,
        )));
    }
    for (i, pair) in lags.windows(2).into_iter().enumerate() {
        let ascending = pair[0] < pair[1];
        if !ascending {
            return Err(FuncNetError::invalid_shape(format!(
                "lags not strictly ascending at position {} ({} then {})",
                i + 1,
                pair[0],
                pair[1],
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Adjacency shape
// ---------------------------------------------------------------------------

/// Validate a `[..batch, n, n]` shape and return `n`.
pub fn validate_adjacency_shape(shape: &[usize]) -> Result<usize> {
    let ndim = shape.len();
    if ndim < 2 {
        return Err(FuncNetError::invalid_shape(format!(
            "adjacency needs at least 2 axes, got {}",
            ndim,
        )));
    }
    let (rows, cols) = (shape[ndim - 2], shape[ndim - 1]);
    if rows != cols {
        return Err(FuncNetError::invalid_shape(format!(
            "adjacency trailing axes {}x{} are not square",
            rows, cols,
        )));
    }
    if rows < MIN_NODES {
        return Err(FuncNetError::invalid_shape(format!(
            "adjacency has {} node(s), need at least {}",
            rows, MIN_NODES,
        )));
    }
    Ok(rows)
}

//! Core data types for functional-network estimation.
//!
//! Provides [`Signal`] for the multivariate input, [`LaggedAdjacency`] for the
//! full cross-correlation tensor, [`LagWindow`] for lag selection, and
//! [`EdgeVector`] for the compact graph representation.

use std::fmt;

use ndarray::{Array1, Array2, Array3, ArrayD, ArrayView1, ArrayView2, ArrayView3, ArrayViewD};
use serde::{Deserialize, Serialize};

use crate::error::{FuncNetError, Result};
use crate::validation;

// ---------------------------------------------------------------------------
// Signal
// ---------------------------------------------------------------------------

/// Multivariate time series laid out as `[n_sample, n_node]`.
///
/// Row `t` holds one sample of every node; column `j` is the full series of
/// node `j`. Construction checks shape (`n_node >= 2`, `n_sample >= 1`) and
/// finiteness. Variance is checked later by the engine, which owns the
/// policy for constant channels.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    data: Array2<f64>,
}

impl Signal {
    /// Wrap an existing `[n_sample, n_node]` array.
    ///
    /// # Errors
    ///
    /// Returns [`FuncNetError::InvalidInputShape`] for fewer than two nodes or
    /// no samples, and [`FuncNetError::ParameterOutOfRange`] for NaN/Inf
    /// samples.
    pub fn new(data: Array2<f64>) -> Result<Self> {
        validation::validate_signal(&data.view())?;
        Ok(Self { data })
    }

    /// Build a signal from sample rows (`rows[t][node]`).
    ///
    /// # Errors
    ///
    /// Returns [`FuncNetError::InvalidInputShape`] if the rows are ragged, in
    /// addition to the checks of [`Signal::new`].
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self> {
        let n_sample = rows.len();
        let n_node = rows.first().map_or(0, Vec::len);
        if let Some((t, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != n_node) {
            return Err(FuncNetError::invalid_shape(format!(
                "row {} has {} nodes, expected {} (non-rectangular signal)",
                t,
                row.len(),
                n_node,
            )));
        }
        let flat: Vec<f64> = rows.iter().flatten().copied().collect();
        Self::new(Array2::from_shape_vec((n_sample, n_node), flat)?)
    }

    /// Build a signal from per-node series (`columns[node][t]`).
    ///
    /// # Errors
    ///
    /// Same as [`Signal::from_rows`].
    pub fn from_columns(columns: &[Vec<f64>]) -> Result<Self> {
        let n_node = columns.len();
        let n_sample = columns.first().map_or(0, Vec::len);
        if let Some((j, col)) = columns.iter().enumerate().find(|(_, c)| c.len() != n_sample) {
            return Err(FuncNetError::invalid_shape(format!(
                "node {} has {} samples, expected {} (non-rectangular signal)",
                j,
                col.len(),
                n_sample,
            )));
        }
        let data = Array2::from_shape_fn((n_sample, n_node), |(t, j)| columns[j][t]);
        Self::new(data)
    }

    /// Number of samples (time axis length).
    #[inline]
    pub fn n_sample(&self) -> usize {
        self.data.nrows()
    }

    /// Number of nodes (channels).
    #[inline]
    pub fn n_node(&self) -> usize {
        self.data.ncols()
    }

    /// Borrow the underlying `[n_sample, n_node]` array.
    #[inline]
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// Series of a single node.
    #[inline]
    pub fn node(&self, node: usize) -> ArrayView1<'_, f64> {
        self.data.column(node)
    }

    /// Consume the signal and return the underlying array.
    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut Array2<f64> {
        &mut self.data
    }
}

// ---------------------------------------------------------------------------
// LaggedAdjacency
// ---------------------------------------------------------------------------

/// Cross-correlation magnitudes indexed `[lag, node_i, node_j]` plus the
/// ascending lag axis in physical time units.
#[derive(Debug, Clone, PartialEq)]
pub struct LaggedAdjacency {
    tensor: Array3<f64>,
    lags: Array1<f64>,
}

impl LaggedAdjacency {
    /// Pair a tensor with its lag axis.
    ///
    /// # Errors
    ///
    /// Returns [`FuncNetError::InvalidInputShape`] if the trailing axes are not
    /// square, `lags.len()` differs from the leading axis, or the lags are
    /// not strictly ascending.
    pub fn new(tensor: Array3<f64>, lags: Array1<f64>) -> Result<Self> {
        validation::validate_lagged(&tensor.view(), &lags.view())?;
        Ok(Self { tensor, lags })
    }

    /// Construction path for the engine, which produces valid parts.
    pub(crate) fn from_parts_unchecked(tensor: Array3<f64>, lags: Array1<f64>) -> Self {
        debug_assert_eq!(tensor.shape()[0], lags.len());
        Self { tensor, lags }
    }

    /// Number of lags.
    #[inline]
    pub fn n_lag(&self) -> usize {
        self.lags.len()
    }

    /// Number of nodes.
    #[inline]
    pub fn n_node(&self) -> usize {
        self.tensor.shape()[1]
    }

    /// Borrow the `[lag, node_i, node_j]` tensor.
    #[inline]
    pub fn tensor(&self) -> ArrayView3<'_, f64> {
        self.tensor.view()
    }

    /// Borrow the ascending lag axis.
    #[inline]
    pub fn lags(&self) -> ArrayView1<'_, f64> {
        self.lags.view()
    }

    /// Adjacency slice at lag index `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx >= n_lag()`.
    pub fn at_lag_index(&self, idx: usize) -> ArrayView2<'_, f64> {
        self.tensor.index_axis(ndarray::Axis(0), idx)
    }

    /// Index of the zero lag, if present.
    pub fn zero_lag_index(&self) -> Option<usize> {
        self.lags.iter().position(|&l| l == 0.0)
    }

    /// Decompose into `(tensor, lags)`.
    pub fn into_parts(self) -> (Array3<f64>, Array1<f64>) {
        (self.tensor, self.lags)
    }
}

// ---------------------------------------------------------------------------
// LagWindow
// ---------------------------------------------------------------------------

/// Upper bound of a lag window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LagBound {
    /// Inclusive finite bound in physical time units.
    Finite(f64),
    /// No upper bound.
    #[default]
    Unbounded,
}

impl LagBound {
    /// Whether `value` lies at or below this bound.
    #[inline]
    pub fn admits(&self, value: f64) -> bool {
        match *self {
            LagBound::Finite(max) => value <= max,
            LagBound::Unbounded => true,
        }
    }
}

/// Inclusive window `[tau_min, tau_max]` on absolute lag.
///
/// A lag `l` is selected when `tau_min <= |l| <= tau_max`. The default
/// window `[0, Unbounded]` selects every lag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LagWindow {
    /// Shortest absolute lag to consider.
    pub tau_min: f64,
    /// Longest absolute lag to consider.
    pub tau_max: LagBound,
}

impl Default for LagWindow {
    fn default() -> Self {
        Self {
            tau_min: 0.0,
            tau_max: LagBound::Unbounded,
        }
    }
}

impl LagWindow {
    /// Finite window `[tau_min, tau_max]`.
    pub fn new(tau_min: f64, tau_max: f64) -> Self {
        Self {
            tau_min,
            tau_max: LagBound::Finite(tau_max),
        }
    }

    /// Window `[tau_min, Unbounded]`.
    pub fn at_least(tau_min: f64) -> Self {
        Self {
            tau_min,
            tau_max: LagBound::Unbounded,
        }
    }

    /// Window that selects only lags with `|l| == tau`.
    pub fn exactly(tau: f64) -> Self {
        Self::new(tau, tau)
    }

    /// Whether the lag `lag` falls inside the window.
    #[inline]
    pub fn contains(&self, lag: f64) -> bool {
        let mag = lag.abs();
        mag >= self.tau_min && self.tau_max.admits(mag)
    }
}

// ---------------------------------------------------------------------------
// PeakAdjacency
// ---------------------------------------------------------------------------

/// Peak cross-correlation magnitude per node pair together with the lag at
/// which it occurred.
#[derive(Debug, Clone, PartialEq)]
pub struct PeakAdjacency {
    /// Peak magnitude, `[n_node, n_node]`.
    pub weights: Array2<f64>,
    /// Lag (physical units) of the peak, `[n_node, n_node]`.
    pub delays: Array2<f64>,
}

// ---------------------------------------------------------------------------
// GraphLayout / EdgeVector
// ---------------------------------------------------------------------------

/// Whether a compact edge vector stores one or both triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphLayout {
    /// Strict upper triangle only, `n(n-1)/2` entries.
    Undirected,
    /// Strict upper triangle followed by strict lower triangle, `n(n-1)`
    /// entries.
    Directed,
}

impl GraphLayout {
    /// Number of compact entries for a graph of `n_node` nodes.
    #[inline]
    ///
    /// Saturates at `usize::MAX`; see [`GraphLayout::checked_edge_count`].
    pub fn edge_count(self, n_node: usize) -> usize {
        self.checked_edge_count(n_node).unwrap_or(usize::MAX)
    }

    /// Number of compact entries for a graph of `n_node` nodes, or `None` if
    /// it does not fit in a `usize`.
    pub fn checked_edge_count(self, n_node: usize) -> Option<usize> {
        let prev = n_node.saturating_sub(1);
        match self {
            // One of two consecutive integers is even.
            GraphLayout::Undirected if n_node % 2 == 0 => (n_node / 2).checked_mul(prev),
            GraphLayout::Undirected => n_node.checked_mul(prev / 2),
            GraphLayout::Directed => n_node.checked_mul(prev),
        }
    }

    /// `true` for [`GraphLayout::Undirected`].
    #[inline]
    pub fn is_undirected(self) -> bool {
        matches!(self, GraphLayout::Undirected)
    }
}

impl fmt::Display for GraphLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GraphLayout::Undirected => write!(f, "undirected"),
            GraphLayout::Directed => write!(f, "directed"),
        }
    }
}

/// Compact edge weights with their layout tag.
///
/// `values` has shape `[..batch, n_conn]`; the layout is required to invert
/// the transform and always travels with the values.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeVector {
    values: ArrayD<f64>,
    layout: GraphLayout,
}

impl EdgeVector {
    /// Tag `values` with `layout`.
    ///
    /// # Errors
    ///
    /// Returns [`FuncNetError::InvalidInputShape`] if `values` is zero-dimensional.
    pub fn new(values: ArrayD<f64>, layout: GraphLayout) -> Result<Self> {
        if values.ndim() == 0 {
            return Err(FuncNetError::invalid_shape(
                "edge vector needs at least one axis",
            ));
        }
        Ok(Self { values, layout })
    }

    /// Single (unbatched) edge vector.
    pub fn from_vec(values: Vec<f64>, layout: GraphLayout) -> Self {
        Self {
            values: Array1::from(values).into_dyn(),
            layout,
        }
    }

    /// Layout tag.
    #[inline]
    pub fn layout(&self) -> GraphLayout {
        self.layout
    }

    /// Borrow the `[..batch, n_conn]` values.
    #[inline]
    pub fn values(&self) -> ArrayViewD<'_, f64> {
        self.values.view()
    }

    /// Length of the trailing edge axis.
    #[inline]
    pub fn n_conn(&self) -> usize {
        self.values.shape().last().copied().unwrap_or(0)
    }

    /// Leading batch axes (empty for a single graph).
    #[inline]
    pub fn batch_shape(&self) -> &[usize] {
        let shape = self.values.shape();
        &shape[..shape.len() - 1]
    }

    /// Decompose into `(values, layout)`.
    pub fn into_parts(self) -> (ArrayD<f64>, GraphLayout) {
        (self.values, self.layout)
    }
}

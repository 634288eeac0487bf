//! Error types for the functional-network crate.
//!
//! Every failure is a local, synchronous precondition violation reported at
//! the call that detected it. All errors implement `std::error::Error` via
//! `thiserror`.

use crate::types::GraphLayout;

/// Primary error type for cross-correlation and codec operations.
#[derive(Debug, thiserror::Error)]
pub enum FuncNetError {
    /// The input array has the wrong number of axes, too few nodes or
    /// samples, or ragged rows.
    #[error("invalid input shape: {0}")]
    InvalidInputShape(String),

    /// A node's samples have zero variance, so normalisation is undefined.
    #[error("node {node} has zero variance (constant channel); normalisation is undefined")]
    NumericDegeneracy {
        /// Column index of the constant node.
        node: usize,
    },

    /// The lag window is malformed or selects no lag.
    #[error("invalid lag window: {0}")]
    InvalidWindow(String),

    /// The compact edge vector length does not correspond to any node count
    /// under the triangular-number inversion for its layout.
    #[error(
        "cannot reconstruct {layout} adjacency from {len} edges (recovered n_node={recovered} expects {expected} edges)"
    )]
    AmbiguousReconstruction {
        /// Length of the trailing edge axis.
        len: usize,
        /// Layout tag carried by the edge vector.
        layout: GraphLayout,
        /// Node count produced by the ceiling-based inversion.
        recovered: usize,
        /// Edge count that `recovered` nodes would actually require.
        expected: usize,
    },

    /// A scalar parameter is outside its valid range.
    #[error("parameter out of range: {name} = {value} (expected {expected})")]
    ParameterOutOfRange {
        /// Name of the parameter.
        name: String,
        /// The invalid value, rendered as a string.
        value: String,
        /// Human-readable description of the valid range.
        expected: String,
    },

    /// The requested output would exceed the configured allocation limit.
    #[error("lagged tensor of {requested} elements exceeds limit of {limit}")]
    ResourceLimit {
        /// Number of elements the computation would allocate.
        requested: usize,
        /// Configured maximum.
        limit: usize,
    },

    /// An `ndarray` reshape failed.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}

impl FuncNetError {
    /// Shorthand for [`FuncNetError::InvalidInputShape`].
    pub fn invalid_shape(msg: impl Into<String>) -> Self {
        Self::InvalidInputShape(msg.into())
    }

    /// Shorthand for [`FuncNetError::InvalidWindow`].
    pub fn invalid_window(msg: impl Into<String>) -> Self {
        Self::InvalidWindow(msg.into())
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, FuncNetError>;

//! Conversion between dense adjacency tensors and compact edge vectors.
//!
//! # Layout
//!
//! For `n` nodes the strict upper triangle is enumerated row-major
//! (`(0,1), (0,2), .., (0,n-1), (1,2), ..`) and the strict lower triangle the
//! same way (`(1,0), (2,0), (2,1), (3,0), ..`).
//!
//! | Layout       | Contents                 | Length     |
//! |--------------|--------------------------|------------|
//! | `Undirected` | upper                    | `n(n-1)/2` |
//! | `Directed`   | upper, then lower        | `n(n-1)`   |
//!
//! Both directions accept any number of leading batch axes:
//! `[..batch, n, n]` maps to `[..batch, n_conn]` and back.

use ndarray::{ArrayBase, ArrayD, ArrayViewD, Data, Dimension, Ix2, IxDyn};
use tracing::debug;

use crate::error::{FuncNetError, Result};
use crate::types::{EdgeVector, GraphLayout};
use crate::validation::{self, MIN_NODES};

// ---------------------------------------------------------------------------
// Index helpers
// ---------------------------------------------------------------------------

/// Strict upper-triangle coordinates of an `n x n` matrix, row-major.
pub fn triu_indices(n: usize) -> Vec<(usize, usize)> {
    (0..n)
        .flat_map(|i| (i + 1..n).map(move |j| (i, j)))
        .collect()
}

/// Strict lower-triangle coordinates of an `n x n` matrix, row-major.
pub fn tril_indices(n: usize) -> Vec<(usize, usize)> {
    (0..n).flat_map(|i| (0..i).map(move |j| (i, j))).collect()
}

/// Recover the node count from a compact vector length.
///
/// Uses `ceil(sqrt(2 * len))` for undirected and `ceil(sqrt(len))` for
/// directed vectors, then checks that the recovered count really produces
/// `len` edges.
///
/// # Errors
///
/// Returns [`FuncNetError::AmbiguousReconstruction`] when `len` is not an
/// edge count of any graph with at least two nodes.
pub fn recover_node_count(len: usize, layout: GraphLayout) -> Result<usize> {
    let radicand = match layout {
        GraphLayout::Undirected => 2.0 * len as f64,
        GraphLayout::Directed => len as f64,
    };
    let recovered = radicand.sqrt().ceil() as usize;
    match layout.checked_edge_count(recovered) {
        Some(expected) if recovered >= MIN_NODES && expected == len => Ok(recovered),
        expected => Err(FuncNetError::AmbiguousReconstruction {
            len,
            layout,
            recovered,
            expected: expected.unwrap_or(usize::MAX),
        }),
    }
}

/// Exact symmetry test on the trailing two axes of every batch entry.
///
/// No tolerance is applied, so any NaN entry makes the tensor asymmetric.
/// An empty batch is symmetric.
pub fn is_symmetric(adj: &ArrayViewD<'_, f64>) -> bool {
    let nd = adj.ndim();
    if nd < 2 {
        return false;
    }
    let mut transposed = adj.view();
    transposed.swap_axes(nd - 2, nd - 1);
    *adj == transposed
}

// ---------------------------------------------------------------------------
// Dense -> compact
// ---------------------------------------------------------------------------

/// Flatten an adjacency tensor `[..batch, n, n]` into a compact edge vector
/// `[..batch, n_conn]`.
///
/// The layout is [`GraphLayout::Undirected`] if every batch entry is exactly
/// symmetric, otherwise [`GraphLayout::Directed`]. Diagonal entries are
/// dropped.
///
/// # Errors
///
/// Returns [`FuncNetError::InvalidInputShape`] if `adj` has fewer than two
/// axes, non-square trailing axes, or fewer than two nodes.
pub fn adjacency_to_edges<S, D>(adj: &ArrayBase<S, D>) -> Result<EdgeVector>
where
    S: Data<Elem = f64>,
    D: Dimension,
{
    let adj = adj.view().into_dyn();
    let shape = adj.shape().to_vec();
    let n = validation::validate_adjacency_shape(&shape)?;
    let batch_shape = &shape[..shape.len() - 2];

    let layout = if is_symmetric(&adj) {
        GraphLayout::Undirected
    } else {
        GraphLayout::Directed
    };

    let mut pairs = triu_indices(n);
    if layout == GraphLayout::Directed {
        pairs.extend(tril_indices(n));
    }
    let n_conn = pairs.len();

    // Logical (row-major) order regardless of the input's memory layout.
    let dense: Vec<f64> = adj.iter().copied().collect();
    let mut flat = Vec::with_capacity(dense.len() / (n * n) * n_conn);
    for mat in dense.chunks_exact(n * n) {
        flat.extend(pairs.iter().map(|&(i, j)| mat[i * n + j]));
    }

    let mut out_shape = batch_shape.to_vec();
    out_shape.push(n_conn);
    debug!(%layout, n_node = n, n_conn, batch = ?batch_shape, "codec: adjacency -> edges");

    EdgeVector::new(ArrayD::from_shape_vec(IxDyn(&out_shape), flat)?, layout)
}

// ---------------------------------------------------------------------------
// Compact -> dense
// ---------------------------------------------------------------------------

/// Rebuild the adjacency tensor `[..batch, n, n]` from a compact edge vector.
///
/// Undirected vectors are mirrored into both triangles; directed vectors fill
/// the upper triangle from the first half and the lower triangle from the
/// second. The diagonal is zero.
///
/// # Errors
///
/// Returns [`FuncNetError::AmbiguousReconstruction`] if the edge axis length
/// does not match any node count for the layout.
pub fn edges_to_adjacency(edges: &EdgeVector) -> Result<ArrayD<f64>> {
    let layout = edges.layout();
    let len = edges.n_conn();
    let n = recover_node_count(len, layout)?;
    let batch_shape = edges.batch_shape().to_vec();

    let upper = triu_indices(n);
    let lower = tril_indices(n);

    let compact: Vec<f64> = edges.values().iter().copied().collect();
    let mut dense = vec![0.0f64; compact.len() / len * n * n];

    for (cfg, mat) in compact.chunks_exact(len).zip(dense.chunks_exact_mut(n * n)) {
        match layout {
            GraphLayout::Undirected => {
                for (&(i, j), &w) in upper.iter().zip(cfg) {
                    mat[i * n + j] = w;
                    mat[j * n + i] = w;
                }
            }
            GraphLayout::Directed => {
                let (head, tail) = cfg.split_at(upper.len());
                for (&(i, j), &w) in upper.iter().zip(head) {
                    mat[i * n + j] = w;
                }
                for (&(i, j), &w) in lower.iter().zip(tail) {
                    mat[i * n + j] = w;
                }
            }
        }
    }

    let mut out_shape = batch_shape;
    out_shape.extend([n, n]);
    debug!(%layout, n_node = n, len, "codec: edges -> adjacency");

    Ok(ArrayD::from_shape_vec(IxDyn(&out_shape), dense)?)
}

/// [`edges_to_adjacency`] for a single, unbatched edge vector.
///
/// # Errors
///
/// Returns [`FuncNetError::InvalidInputShape`] if `edges` carries batch axes,
/// plus the errors of [`edges_to_adjacency`].
pub fn edges_to_matrix(edges: &EdgeVector) -> Result<ndarray::Array2<f64>> {
    if !edges.batch_shape().is_empty() {
        return Err(FuncNetError::invalid_shape(format!(
            "expected a single edge vector, got batch shape {:?}",
            edges.batch_shape(),
        )));
    }
    Ok(edges_to_adjacency(edges)?.into_dimensionality::<Ix2>()?)
}

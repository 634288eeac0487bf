//! Integration tests for the adjacency <-> edge-vector codec.

mod helpers;

use funcnet_core::codec::{
    adjacency_to_edges, edges_to_adjacency, edges_to_matrix, recover_node_count,
};
use funcnet_core::error::FuncNetError;
use funcnet_core::types::{EdgeVector, GraphLayout};
use ndarray::{array, Array2, ArrayD, Axis, IxDyn};
use proptest::prelude::*;

use helpers::{random_directed, random_symmetric, symmetric_batch};

// ---------------------------------------------------------------------------
// Concrete cases
// ---------------------------------------------------------------------------

#[test]
fn test_two_node_symmetric() {
    let edges = adjacency_to_edges(&array![[0.0, 1.0], [1.0, 0.0]]).unwrap();
    assert_eq!(edges.layout(), GraphLayout::Undirected);
    assert_eq!(edges.values().to_owned(), array![1.0].into_dyn());
}

#[test]
fn test_two_node_directed() {
    let edges = adjacency_to_edges(&array![[0.0, 2.0], [3.0, 0.0]]).unwrap();
    assert_eq!(edges.layout(), GraphLayout::Directed);
    assert_eq!(edges.values().to_owned(), array![2.0, 3.0].into_dyn());
}

#[test]
fn test_undirected_four_node_order() {
    let adj = array![
        [0.0, 1.0, 2.0, 3.0],
        [1.0, 0.0, 4.0, 5.0],
        [2.0, 4.0, 0.0, 6.0],
        [3.0, 5.0, 6.0, 0.0],
    ];
    let edges = adjacency_to_edges(&adj).unwrap();
    assert_eq!(edges.layout(), GraphLayout::Undirected);
    assert_eq!(
        edges.values().iter().copied().collect::<Vec<_>>(),
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]
    );
}

#[test]
fn test_reconstruct_mirrors_undirected() {
    let edges = EdgeVector::from_vec(vec![1.0, 2.0, 3.0], GraphLayout::Undirected);
    let adj = edges_to_matrix(&edges).unwrap();
    assert_eq!(adj, array![[0.0, 1.0, 2.0], [1.0, 0.0, 3.0], [2.0, 3.0, 0.0]]);
}

#[test]
fn test_reconstruct_directed_halves() {
    let edges = EdgeVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], GraphLayout::Directed);
    let adj = edges_to_matrix(&edges).unwrap();
    assert_eq!(adj, array![[0.0, 1.0, 2.0], [4.0, 0.0, 3.0], [5.0, 6.0, 0.0]]);
}

#[test]
fn test_layout_tag_decides_reconstruction() {
    // The same six values read as a 4-node undirected graph.
    let edges = EdgeVector::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], GraphLayout::Undirected);
    let adj = edges_to_matrix(&edges).unwrap();
    assert_eq!(adj.dim(), (4, 4));
    assert_eq!(adj, adj.t());
}

#[test]
fn test_ambiguous_lengths_rejected() {
    for (len, layout) in [
        (2, GraphLayout::Undirected),
        (4, GraphLayout::Undirected),
        (3, GraphLayout::Directed),
        (7, GraphLayout::Directed),
        (0, GraphLayout::Undirected),
    ] {
        let edges = EdgeVector::from_vec(vec![0.5; len], layout);
        match edges_to_adjacency(&edges) {
            Err(FuncNetError::AmbiguousReconstruction { len: l, layout: lay, .. }) => {
                assert_eq!(l, len);
                assert_eq!(lay, layout);
            }
            other => panic!("len {len} {layout}: expected AmbiguousReconstruction, got {other:?}"),
        }
    }
}

#[test]
fn test_nested_batch_shape() {
    let flat = symmetric_batch(6, 5, 99);
    let nested = flat.clone().into_shape_with_order((2, 3, 5, 5)).unwrap();

    let edges = adjacency_to_edges(&nested).unwrap();
    assert_eq!(edges.layout(), GraphLayout::Undirected);
    assert_eq!(edges.values().shape(), &[2, 3, 10]);

    let back = edges_to_adjacency(&edges).unwrap();
    assert_eq!(back, nested.into_dyn());
}

#[test]
fn test_batch_entries_encoded_independently() {
    let batch = symmetric_batch(3, 4, 1);
    let edges = adjacency_to_edges(&batch).unwrap();
    for b in 0..3 {
        let single = adjacency_to_edges(&batch.index_axis(Axis(0), b)).unwrap();
        assert_eq!(
            edges.values().index_axis(Axis(0), b).to_owned(),
            single.values().to_owned()
        );
    }
}

#[test]
fn test_diagonal_is_discarded() {
    let mut adj = random_symmetric(4, 8);
    adj[[2, 2]] = 9.0;
    let edges = adjacency_to_edges(&adj).unwrap();
    let back = edges_to_matrix(&edges).unwrap();
    assert_eq!(back[[2, 2]], 0.0);
    adj[[2, 2]] = 0.0;
    assert_eq!(back, adj);
}

#[test]
fn test_recover_node_count_matches_layout() {
    assert_eq!(recover_node_count(45, GraphLayout::Undirected).unwrap(), 10);
    assert_eq!(recover_node_count(90, GraphLayout::Directed).unwrap(), 10);
}

#[test]
fn test_recover_node_count_extreme_lengths() {
    for layout in [GraphLayout::Undirected, GraphLayout::Directed] {
        match recover_node_count(usize::MAX, layout) {
            Err(FuncNetError::AmbiguousReconstruction { len, .. }) => assert_eq!(len, usize::MAX),
            other => panic!("expected AmbiguousReconstruction, got {other:?}"),
        }
    }
}

#[test]
fn test_rejects_zero_dim_edge_values() {
    let err = EdgeVector::new(ArrayD::zeros(IxDyn(&[])), GraphLayout::Directed).unwrap_err();
    assert!(matches!(err, FuncNetError::InvalidInputShape(_)), "{err}");
}

// ---------------------------------------------------------------------------
// Property-based round trips
// ---------------------------------------------------------------------------

fn matrix_strategy() -> impl Strategy<Value = (usize, Vec<f64>)> {
    (2usize..12).prop_flat_map(|n| (Just(n), prop::collection::vec(-1e6f64..1e6, n * n)))
}

proptest! {
    #[test]
    fn prop_undirected_roundtrip((n, values) in matrix_strategy()) {
        let mut adj = Array2::from_shape_vec((n, n), values).unwrap();
        for i in 0..n {
            adj[[i, i]] = 0.0;
            for j in 0..i {
                adj[[i, j]] = adj[[j, i]];
            }
        }

        let edges = adjacency_to_edges(&adj).unwrap();
        prop_assert_eq!(edges.layout(), GraphLayout::Undirected);
        prop_assert_eq!(edges.n_conn(), n * (n - 1) / 2);
        prop_assert_eq!(edges_to_matrix(&edges).unwrap(), adj);
    }

    #[test]
    fn prop_directed_roundtrip((n, values) in matrix_strategy()) {
        let mut adj = Array2::from_shape_vec((n, n), values).unwrap();
        for i in 0..n {
            adj[[i, i]] = 0.0;
        }
        adj[[0, 1]] = adj[[1, 0]] + 1.0;

        let edges = adjacency_to_edges(&adj).unwrap();
        prop_assert_eq!(edges.layout(), GraphLayout::Directed);
        prop_assert_eq!(edges.n_conn(), n * (n - 1));
        prop_assert_eq!(edges_to_matrix(&edges).unwrap(), adj);
    }

    #[test]
    fn prop_directed_batch_roundtrip(n in 2usize..8, batch in 1usize..5, seed in any::<u64>()) {
        let mats: Vec<Array2<f64>> =
            (0..batch).map(|b| random_directed(n, seed.wrapping_add(b as u64))).collect();
        let views: Vec<_> = mats.iter().map(|m| m.view()).collect();
        let stacked = ndarray::stack(Axis(0), &views).unwrap();

        let edges = adjacency_to_edges(&stacked).unwrap();
        prop_assert_eq!(edges.layout(), GraphLayout::Directed);
        prop_assert_eq!(edges.batch_shape(), &[batch][..]);
        prop_assert_eq!(edges_to_adjacency(&edges).unwrap(), stacked.into_dyn());
    }
}

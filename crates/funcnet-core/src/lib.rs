//! Functional networks from multivariate time series.
//!
//! This crate estimates a directed, weighted graph between the channels of a
//! multivariate signal from their lagged cross-correlation, and converts
//! between dense adjacency matrices and compact edge vectors.
//!
//! # Components
//!
//! | Module | Role |
//! |--------|------|
//! | [`xcorr`] | FFT cross-correlation over all lags and lag-window reduction |
//! | [`codec`] | adjacency `[.., n, n]` <-> edge vector `[.., n_conn]` |
//! | [`pipeline`] | both in sequence with a fixed [`PipelineConfig`] |
//!
//! # Example
//!
//! ```rust
//! use funcnet_core::codec::{adjacency_to_edges, edges_to_adjacency};
//! use funcnet_core::types::{LagWindow, Signal};
//! use funcnet_core::xcorr::{compute_lagged_xcorr, reduce_to_adjacency};
//!
//! let signal = Signal::from_columns(&[
//!     vec![0.0, 1.0, 0.0, -1.0],
//!     vec![1.0, 0.0, -1.0, 0.0],
//!     vec![0.5, 0.2, -0.9, 0.1],
//! ])
//! .unwrap();
//!
//! let lagged = compute_lagged_xcorr(signal, 4.0).unwrap();
//! assert_eq!(lagged.n_lag(), 8);
//!
//! let adj = reduce_to_adjacency(&lagged, &LagWindow::new(0.0, 0.5)).unwrap();
//! let edges = adjacency_to_edges(&adj).unwrap();
//! let back = edges_to_adjacency(&edges).unwrap();
//! assert_eq!(back, adj.into_dyn());
//! ```

#![warn(missing_docs)]

pub mod codec;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod validation;
pub mod xcorr;

pub use codec::{adjacency_to_edges, edges_to_adjacency, edges_to_matrix};
pub use config::{DegeneracyPolicy, EngineConfig, PipelineConfig};
pub use error::{FuncNetError, Result};
pub use pipeline::{NetworkEstimate, NetworkPipeline};
pub use types::{
    EdgeVector, GraphLayout, LagBound, LagWindow, LaggedAdjacency, PeakAdjacency, Signal,
};
pub use xcorr::{compute_lagged_xcorr, reduce_to_adjacency, reduce_to_peak, XcorrEngine};

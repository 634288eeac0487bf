//! End-to-end functional-network estimation.
//!
//! Chains the engine, the lag-window reduction and the codec:
//!
//! ```text
//! Signal -> LaggedAdjacency -> Array2 adjacency -> EdgeVector
//! ```

use ndarray::Array2;
use tracing::info;

use crate::codec;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::types::{EdgeVector, LagWindow, LaggedAdjacency, PeakAdjacency, Signal};
use crate::xcorr::{self, XcorrEngine};

/// Output of a [`NetworkPipeline`] run.
#[derive(Debug, Clone)]
pub struct NetworkEstimate {
    /// Full lagged cross-correlation tensor.
    pub lagged: LaggedAdjacency,
    /// Peak magnitude per node pair within the configured window.
    pub adjacency: Array2<f64>,
    /// Compact form of `adjacency`.
    pub edges: EdgeVector,
}

impl NetworkEstimate {
    /// Peak magnitudes and their lags within `window`.
    pub fn peaks(&self, window: &LagWindow) -> Result<PeakAdjacency> {
        xcorr::reduce_to_peak(&self.lagged, window)
    }
}

/// Signal-to-graph pipeline with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct NetworkPipeline {
    config: PipelineConfig,
    engine: XcorrEngine,
}

impl NetworkPipeline {
    /// Build a pipeline, validating the sampling rate and window up front.
    ///
    /// # Errors
    ///
    /// Returns the first invalid setting in `config`.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            engine: XcorrEngine::new(config.engine),
            config,
        })
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run the full pipeline on `signal`, consuming it.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`XcorrEngine::compute`],
    /// [`xcorr::reduce_to_adjacency`] and [`codec::adjacency_to_edges`].
    pub fn run(&self, signal: Signal) -> Result<NetworkEstimate> {
        let n_node = signal.n_node();
        let n_sample = signal.n_sample();

        let lagged = self.engine.compute(signal, self.config.sampling_rate)?;
        let adjacency = xcorr::reduce_to_adjacency(&lagged, &self.config.window)?;
        let edges = codec::adjacency_to_edges(&adjacency)?;

        info!(
            n_node,
            n_sample,
            layout = %edges.layout(),
            n_conn = edges.n_conn(),
            "pipeline: network estimated"
        );

        Ok(NetworkEstimate {
            lagged,
            adjacency,
            edges,
        })
    }

    /// Peak lags of an estimate within this pipeline's window.
    ///
    /// # Errors
    ///
    /// See [`xcorr::reduce_to_peak`].
    pub fn peaks(&self, estimate: &NetworkEstimate) -> Result<PeakAdjacency> {
        estimate.peaks(&self.config.window)
    }
}

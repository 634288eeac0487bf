//! Engine and pipeline configuration.
//!
//! All types are serde-serialisable with `#[serde(default)]`, so a partial
//! JSON document only needs to name the fields it overrides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::types::LagWindow;
use crate::validation;

/// Default cap on lagged-tensor elements (`2^27`, 1 GiB of `f64`).
pub const DEFAULT_MAX_TENSOR_ELEMENTS: usize = 1 << 27;

/// What the engine does with a zero-variance node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DegeneracyPolicy {
    /// Fail with [`FuncNetError::NumericDegeneracy`](crate::error::FuncNetError::NumericDegeneracy).
    #[default]
    Reject,
    /// Divide by the zero standard deviation anyway. Rows and columns of the
    /// constant node become non-finite.
    Propagate,
}

/// Settings for [`XcorrEngine`](crate::xcorr::XcorrEngine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Largest `n_lag * n_node * n_node` tensor the engine will allocate.
    pub max_tensor_elements: usize,
    /// Handling of constant channels.
    pub degeneracy: DegeneracyPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tensor_elements: DEFAULT_MAX_TENSOR_ELEMENTS,
            degeneracy: DegeneracyPolicy::Reject,
        }
    }
}

impl EngineConfig {
    /// Override the tensor element cap.
    pub fn with_max_tensor_elements(mut self, max: usize) -> Self {
        self.max_tensor_elements = max;
        self
    }

    /// Override the degeneracy policy.
    pub fn with_degeneracy(mut self, policy: DegeneracyPolicy) -> Self {
        self.degeneracy = policy;
        self
    }
}

/// Settings for [`NetworkPipeline`](crate::pipeline::NetworkPipeline).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Sampling frequency of the input signal (Hz).
    pub sampling_rate: f64,
    /// Lag window applied when reducing to an adjacency matrix.
    pub window: LagWindow,
    /// Engine settings.
    pub engine: EngineConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 1.0,
            window: LagWindow::default(),
            engine: EngineConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Config with the given sampling rate and defaults elsewhere.
    pub fn new(sampling_rate: f64) -> Self {
        Self {
            sampling_rate,
            ..Self::default()
        }
    }

    /// Override the lag window.
    pub fn with_window(mut self, window: LagWindow) -> Self {
        self.window = window;
        self
    }

    /// Override the engine settings.
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    /// Check the sampling rate and window bounds.
    ///
    /// # Errors
    ///
    /// Returns the first violation found.
    pub fn validate(&self) -> Result<()> {
        validation::validate_sampling_rate(self.sampling_rate)?;
        validation::validate_window(&self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::LagBound;

    #[test]
    fn defaults() {
        let cfg = PipelineConfig::default();
        assert_eq!(cfg.sampling_rate, 1.0);
        assert_eq!(cfg.window.tau_min, 0.0);
        assert_eq!(cfg.window.tau_max, LagBound::Unbounded);
        assert_eq!(cfg.engine.degeneracy, DegeneracyPolicy::Reject);
        assert_eq!(cfg.engine.max_tensor_elements, DEFAULT_MAX_TENSOR_ELEMENTS);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn builders() {
        let cfg = PipelineConfig::new(256.0)
            .with_window(LagWindow::new(0.0, 0.5))
            .with_engine(
                EngineConfig::default()
                    .with_max_tensor_elements(1024)
                    .with_degeneracy(DegeneracyPolicy::Propagate),
            );
        assert_eq!(cfg.sampling_rate, 256.0);
        assert_eq!(cfg.window.tau_max, LagBound::Finite(0.5));
        assert_eq!(cfg.engine.max_tensor_elements, 1024);
        assert_eq!(cfg.engine.degeneracy, DegeneracyPolicy::Propagate);
    }

    #[test]
    fn invalid_sampling_rate_rejected() {
        assert!(PipelineConfig::new(0.0).validate().is_err());
        assert!(PipelineConfig::new(-2.0).validate().is_err());
        assert!(PipelineConfig::new(f64::NAN).validate().is_err());
    }
}

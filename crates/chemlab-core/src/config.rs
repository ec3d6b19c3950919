use crate::position::ProximityThreshold;
use serde::{Deserialize, Serialize};

/// Tunables for a [`Workspace`](crate::workspace::Workspace).
///
/// Every field has a default, so a data file only needs to list what it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkspaceConfig {
    /// Items within this distance (inclusive) belong to the same cluster.
    pub cluster_threshold: f64,
    /// Radius of the ring on which co-produced compounds are spread around
    /// their cluster's centroid. Positive so products never overlap.
    pub product_spread: f64,
    /// Maximum per-axis offset applied to constituents released by
    /// breaking a compound.
    pub break_jitter: f64,
    /// Seed for the jitter RNG.
    pub rng_seed: u64,
    /// Events buffered before a delivery is forced mid-operation.
    pub event_buffer_capacity: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            cluster_threshold: 50.0,
            product_spread: 10.0,
            break_jitter: 20.0,
            rng_seed: 0,
            event_buffer_capacity: 1024,
        }
    }
}

impl WorkspaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.threshold()?;
        if !(self.product_spread.is_finite() && self.product_spread > 0.0) {
            return Err(ConfigError::InvalidSpread(self.product_spread));
        }
        if !(self.break_jitter.is_finite() && self.break_jitter >= 0.0) {
            return Err(ConfigError::InvalidJitter(self.break_jitter));
        }
        if self.event_buffer_capacity == 0 {
            return Err(ConfigError::ZeroEventCapacity);
        }
        Ok(())
    }

    pub fn threshold(&self) -> Result<ProximityThreshold, ConfigError> {
        ProximityThreshold::new(self.cluster_threshold)
            .ok_or(ConfigError::InvalidThreshold(self.cluster_threshold))
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("cluster threshold must be finite and positive, got {0}")]
    InvalidThreshold(f64),
    #[error("product spread must be finite and positive, got {0}")]
    InvalidSpread(f64),
    #[error("break jitter must be finite and non-negative, got {0}")]
    InvalidJitter(f64),
    #[error("event buffer capacity must be at least 1")]
    ZeroEventCapacity,
}

//! Initialization errors.
//!
//! Everything that can go wrong in this crate goes wrong while building a
//! flock or engine. Once a `StepEngine` exists, stepping cannot fail.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("population size must be at least 2, got {got}")]
    PopulationTooSmall { got: usize },

    #[error("spatial scale must be finite and greater than zero, got {got}")]
    InvalidSpatialScale { got: f64 },

    #[error("boid {index} has a non-finite position or velocity")]
    NonFiniteState { index: usize },

    #[error("invalid value for `{name}`: {value}")]
    InvalidRuleParameter { name: &'static str, value: f64 },

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for vibrational statistical mechanics

use thiserror::Error;

/// Result type for statmech operations
pub type Result<T> = std::result::Result<T, StatMechError>;

/// Errors raised while evaluating vibrational contributions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatMechError {
    /// A mode softer than the allowed tolerance, i.e. a dynamically unstable structure
    #[error(
        "Negative frequency {frequency} cm^-1 at volume index {volume_index} exceeds tolerance \
         {tolerance} cm^-1"
    )]
    NegativeFrequency {
        volume_index: usize,
        frequency: f64,
        tolerance: f64,
    },

    /// q-point weights are negative or do not sum to a positive value
    #[error("Invalid q-point weights: {0}")]
    InvalidQWeights(String),

    /// Density-of-states curve is malformed
    #[error("Invalid density of states at volume index {volume_index}: {reason}")]
    InvalidDos { volume_index: usize, reason: String },

    /// Spectrum dimensions do not match the volume or q-point count
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

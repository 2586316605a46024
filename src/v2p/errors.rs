/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for volume-to-pressure remapping

use thiserror::Error;

/// Result type for v2p operations
pub type Result<T> = std::result::Result<T, V2pError>;

/// Errors raised while resampling (T, V) fields onto pressures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum V2pError {
    #[error(
        "Pressure {pressure:.6e} at temperature index {temperature_index} lies outside \
         [{min:.6e}, {max:.6e}]"
    )]
    PressureOutOfRange {
        temperature_index: usize,
        pressure: f64,
        min: f64,
        max: f64,
    },

    #[error(
        "Pressure does not decrease with volume at temperature index {temperature_index}, \
         volume index {volume_index}"
    )]
    NonMonotonicPressure {
        temperature_index: usize,
        volume_index: usize,
    },

    #[error("Four-point interpolation needs at least 4 volumes, got {0}")]
    TooFewVolumes(usize),

    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

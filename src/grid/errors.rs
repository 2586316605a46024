/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for dense-grid construction

use thiserror::Error;

use crate::eos::EosError;

/// Result type for grid operations
pub type Result<T> = std::result::Result<T, GridError>;

/// Errors raised while building the dense volume grid
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// The requested pressure range cannot be bracketed within the
    /// largest allowed volume ratio
    #[error(
        "Cannot bracket pressures [{requested_min:.6e}, {requested_max:.6e}] at temperature index \
         {temperature_index}: volume ratio {ratio:.4} (max {max_ratio:.4}) only reaches \
         [{achieved_min:.6e}, {achieved_max:.6e}]"
    )]
    GridRange {
        temperature_index: usize,
        ratio: f64,
        max_ratio: f64,
        requested_min: f64,
        requested_max: f64,
        achieved_min: f64,
        achieved_max: f64,
    },

    /// EOS fit failed for one temperature row
    #[error("EOS fit failed at temperature index {temperature_index}: {source}")]
    Eos {
        temperature_index: usize,
        #[source]
        source: EosError,
    },

    /// Inconsistent input shapes or volumes
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// Invalid refinement parameters
    #[error("Invalid grid parameters: {0}")]
    InvalidParameters(String),
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for equation-of-state fitting

use thiserror::Error;

/// Result type for EOS operations
pub type Result<T> = std::result::Result<T, EosError>;

/// EOS fitting errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EosError {
    /// Fewer samples than polynomial coefficients
    #[error("Insufficient data: {samples} samples cannot determine an order-{order} fit ({required} needed)")]
    InsufficientData {
        samples: usize,
        order: usize,
        required: usize,
    },

    /// Least-squares solve is singular or ill-conditioned, or the
    /// equilibrium-volume refinement did not converge
    #[error("Fit diverged: {0}")]
    FitDivergence(String),

    /// Non-positive or non-finite volume
    #[error("Invalid volume {0}: volumes must be finite and positive")]
    InvalidVolume(f64),

    /// Non-finite energy sample
    #[error("Invalid energy {0}: energies must be finite")]
    InvalidEnergy(f64),

    /// Unsupported polynomial order
    #[error("Unsupported Birch-Murnaghan order {0}: expected 3, 4 or 5")]
    InvalidOrder(usize),

    /// Volumes, energies and weights differ in length
    #[error("Length mismatch: {volumes} volumes, {values} values, {weights} weights")]
    LengthMismatch {
        volumes: usize,
        values: usize,
        weights: usize,
    },
}

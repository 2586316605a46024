/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for derived thermodynamic fields

use thiserror::Error;

use crate::utils::UtilsError;
use crate::v2p::V2pError;

/// Result type for thermodynamics operations
pub type Result<T> = std::result::Result<T, ThermodynamicsError>;

/// Errors raised while deriving thermodynamic fields
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ThermodynamicsError {
    #[error("Field shapes disagree: {0}")]
    ShapeMismatch(String),

    #[error("Differentiation failed: {0}")]
    Derivative(#[from] UtilsError),

    #[error("Pressure remapping failed: {0}")]
    V2p(#[from] V2pError),
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for the utils module

use thiserror::Error;

/// Errors that can occur in the utils module
#[derive(Error, Debug, Clone, PartialEq)]
pub enum UtilsError {
    /// The linear system is singular or too ill-conditioned to trust
    #[error("Singular system: {0}")]
    Singular(String),

    /// Array arguments have inconsistent shapes
    #[error("Dimension mismatch: {0}")]
    DimensionMismatch(String),

    /// Math-related errors
    #[error("Math error: {0}")]
    Math(String),
}

/// A specialized Result type for utils operations
pub type Result<T> = std::result::Result<T, UtilsError>;

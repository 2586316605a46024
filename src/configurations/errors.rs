/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error types for multi-configuration aggregation

use thiserror::Error;

use crate::eos::EosError;
use crate::statmech::StatMechError;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigurationError>;

/// Errors raised while combining configurations into one free energy
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    #[error("Invalid degeneracy {degeneracy} for configuration {index}: must be positive")]
    InvalidDegeneracy { index: usize, degeneracy: f64 },

    #[error("No configurations were given")]
    NoConfigurations,

    #[error("Volume count mismatch: {0}")]
    VolumeCountMismatch(String),

    #[error("Invalid volumes: {0}")]
    InvalidVolumes(String),

    #[error("Input does not match the calculation mode: {0}")]
    ModeMismatch(String),

    #[error("Configuration {0} has no phonon spectrum")]
    MissingSpectrum(String),

    #[error("Statistical mechanics error: {0}")]
    StatMech(#[from] StatMechError),

    #[error("Calibration fit failed: {0}")]
    Eos(#[from] EosError),
}

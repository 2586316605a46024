/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Error type for end-to-end QHA runs

use thiserror::Error;

use crate::configurations::ConfigurationError;
use crate::eos::EosError;
use crate::grid::GridError;
use crate::input::InputError;
use crate::statmech::StatMechError;
use crate::thermodynamics::ThermodynamicsError;
use crate::v2p::V2pError;

/// Result type for calculator operations
pub type Result<T> = std::result::Result<T, CalculatorError>;

/// Any failure of a pipeline stage
#[derive(Error, Debug)]
pub enum CalculatorError {
    #[error("Input error: {0}")]
    Input(#[from] InputError),

    #[error("Equation of state error: {0}")]
    Eos(#[from] EosError),

    #[error("Grid error: {0}")]
    Grid(#[from] GridError),

    #[error("Statistical mechanics error: {0}")]
    StatMech(#[from] StatMechError),

    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    #[error("Pressure remapping error: {0}")]
    V2p(#[from] V2pError),

    #[error("Thermodynamics error: {0}")]
    Thermodynamics(#[from] ThermodynamicsError),
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Dense volume grid construction
//!
//! Interpolates and extrapolates coarse (T, V) free energies onto an evenly
//! spaced volume grid wide enough to bracket the requested pressures.

mod errors;
mod refine;

pub use errors::{GridError, Result};
pub use refine::{DenseGrid, PressureBracket, RefineGrid, DEFAULT_MAX_RATIO, DEFAULT_RATIO_STEP};

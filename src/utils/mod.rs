/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Utility functions for QHA calculations
//!
//! This module provides physical constants, unit conversions, numerical
//! helpers and the small dense linear algebra used by the EOS fitter.

pub mod constants;
pub mod conversions;
pub mod errors;
pub mod linear_algebra;
pub mod math;
pub mod parallel;

pub use conversions::*;
pub use errors::{Result, UtilsError};
pub use parallel::Target;

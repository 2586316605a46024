/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Equation-of-state fitting
//!
//! Birch–Murnaghan fits of order 3, 4 and 5 in Eulerian strain, with
//! iterative refinement of the equilibrium volume and analytic pressure and
//! bulk modulus.

mod birch_murnaghan;
mod errors;
mod polynomial;
pub mod strain;

pub use birch_murnaghan::{
    EosFit, EosFitter, DEFAULT_CONDITION_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE,
};
pub use errors::{EosError, Result};
pub use polynomial::StrainPolynomial;
pub use strain::{eulerian_strain, volume_from_strain};

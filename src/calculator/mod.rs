/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! End-to-end QHA calculation
//!
//! [`Calculator`] runs every stage from the parsed input to the sampled
//! (T, P) tables collected in [`ThermodynamicResults`].

mod errors;
mod pipeline;
mod results;

pub use errors::{CalculatorError, Result};
pub use pipeline::Calculator;
pub use results::{EosParameters, ThermodynamicResults, VolumeTables};

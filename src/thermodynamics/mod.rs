/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Thermodynamic fields derived from the free energy
//!
//! [`VolumeFields`] holds the state functions on the (T, V) grid.
//! [`PressureFields`] resamples them onto (T, P) and adds the response
//! functions that need derivatives at constant pressure.

mod errors;
mod fields;

pub use errors::{Result, ThermodynamicsError};
pub use fields::{PressureFields, VolumeFields};

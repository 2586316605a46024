/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Volume to pressure remapping
//!
//! Resamples fields computed on a (T, V) grid onto a (T, P) grid by
//! inverting the pressure-volume relation of every temperature row.

mod errors;
mod mapper;

pub use errors::{Result, V2pError};
pub use mapper::PressureMapper;

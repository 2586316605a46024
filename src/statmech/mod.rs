/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Vibrational statistical mechanics
//!
//! Harmonic vibrational free energy from normal-mode frequencies or a phonon
//! density of states. Entropy and heat capacity follow from it downstream.

mod errors;
pub mod oscillator;
mod spectrum;

pub use errors::{Result, StatMechError};
pub use oscillator::ho_free_energy;
pub use spectrum::{
    normalized_weights, PhononDos, StatMech, VibrationalSpectrum, DEFAULT_FREQUENCY_TOLERANCE,
};

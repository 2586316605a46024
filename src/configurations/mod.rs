/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Multi-configuration free energies
//!
//! A system is a single configuration, several configurations sharing one
//! phonon spectrum, or several configurations with their own spectra. All
//! three are reduced to one effective free energy on the volumes of the
//! first configuration.

mod aggregator;
mod errors;
mod model;

pub use aggregator::{
    boltzmann_free_energy, calibrate_on_reference, AggregatedFreeEnergy, ConfigurationAggregator,
};
pub use errors::{ConfigurationError, Result};
pub use model::{CalculationMode, Configuration, ConfigurationSpectrum, Configurations};

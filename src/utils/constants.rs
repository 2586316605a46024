/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Physical constants used in QHA calculations
//!
//! Values from CODATA 2018.

/// Bohr radius in metres
pub const BOHR_RADIUS_M: f64 = 5.291_772_109_03e-11;

/// One Angstrom in metres
pub const ANGSTROM_M: f64 = 1e-10;

/// Rydberg energy in eV
pub const RYDBERG_EV: f64 = 13.605_693_122_994;

/// Hartree energy in eV
pub const HARTREE_EV: f64 = 27.211_386_245_988;

/// Elementary charge, i.e. joules per eV
pub const ELECTRON_VOLT_J: f64 = 1.602_176_634e-19;

/// Boltzmann constant in eV/K
pub const BOLTZMANN_EV: f64 = 8.617_333_262e-5;

/// Planck constant times speed of light in eV·cm (converts cm⁻¹ to eV)
pub const HC_EV_CM: f64 = 1.239_841_984e-4;

/// Avogadro constant in 1/mol
pub const AVOGADRO: f64 = 6.022_140_76e23;

/// Rydberg energy in joules
pub const RYDBERG_J: f64 = RYDBERG_EV * ELECTRON_VOLT_J;

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! # qha-rs
//!
//! Thermodynamic properties of crystalline solids in the quasi-harmonic
//! approximation.
//!
//! Static energies and phonon spectra sampled at a handful of volumes are
//! turned into free energies on a temperature grid, fitted with a
//! Birch-Murnaghan equation of state, refined onto a dense volume grid and
//! finally remapped onto a temperature-pressure grid. Multi-configuration
//! systems are combined through a Boltzmann sum over configurations.
//!
//! ```no_run
//! use qha_rs::calculator::Calculator;
//! use qha_rs::input::{read_input, Settings};
//!
//! # fn main() -> anyhow::Result<()> {
//! let settings = Settings::from_file("settings.json")?;
//! let input = read_input("input.txt")?;
//! let results = Calculator::new(&settings)?.run(&input)?;
//! println!("volume ratio {}", results.volume_ratio);
//! # Ok(())
//! # }
//! ```

pub mod calculator;
pub mod cli;
pub mod configurations;
pub mod eos;
pub mod grid;
pub mod input;
pub mod statmech;
pub mod thermodynamics;
pub mod utils;
pub mod v2p;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

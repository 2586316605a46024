/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration data and the calculation modes that combine them

use std::fmt;

use serde::{Deserialize, Serialize};

use super::errors::{ConfigurationError, Result};
use crate::input::QhaInput;
use crate::statmech::VibrationalSpectrum;
use crate::utils::math::is_strictly_increasing;

/// How configurations and phonon spectra are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationMode {
    /// One configuration with its own spectrum
    Single,
    /// Several configurations sharing one spectrum
    SamePhononDos,
    /// Several configurations, each with its own spectrum
    DifferentPhononDos,
}

impl fmt::Display for CalculationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CalculationMode::Single => "single",
            CalculationMode::SamePhononDos => "same_phonon_dos",
            CalculationMode::DifferentPhononDos => "different_phonon_dos",
        };
        write!(f, "{}", name)
    }
}

/// Static energies of one atomic configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Configuration {
    pub name: String,
    /// Statistical weight in the Boltzmann sum
    pub degeneracy: f64,
    /// Strictly increasing volumes in bohr³
    pub volumes: Vec<f64>,
    /// Static energy at each volume
    pub static_energies: Vec<f64>,
}

impl Configuration {
    pub fn new(name: impl Into<String>, degeneracy: f64, volumes: Vec<f64>, static_energies: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            degeneracy,
            volumes,
            static_energies,
        }
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if !(self.degeneracy.is_finite() && self.degeneracy > 0.0) {
            return Err(ConfigurationError::InvalidDegeneracy {
                index,
                degeneracy: self.degeneracy,
            });
        }
        if self.volumes.len() != self.static_energies.len() {
            return Err(ConfigurationError::VolumeCountMismatch(format!(
                "configuration '{}' has {} volumes but {} static energies",
                self.name,
                self.volumes.len(),
                self.static_energies.len()
            )));
        }
        if self.volumes.iter().any(|v| !(v.is_finite() && *v > 0.0))
            || !is_strictly_increasing(&self.volumes)
        {
            return Err(ConfigurationError::InvalidVolumes(format!(
                "volumes of configuration '{}' must be positive and strictly increasing",
                self.name
            )));
        }
        Ok(())
    }
}

/// A configuration paired with its own phonon spectrum
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigurationSpectrum {
    pub configuration: Configuration,
    pub spectrum: VibrationalSpectrum,
}

/// The system to aggregate, tagged by which object supplies the
/// vibrational free energy
#[derive(Debug, Clone, PartialEq)]
pub enum Configurations {
    Single {
        configuration: Configuration,
        spectrum: VibrationalSpectrum,
    },
    SamePhononDos {
        configurations: Vec<Configuration>,
        spectrum: VibrationalSpectrum,
    },
    DifferentPhononDos {
        members: Vec<ConfigurationSpectrum>,
    },
}

impl Configurations {
    /// Select the variant for `mode` from parsed input
    ///
    /// Spectra are taken from each configuration, falling back to the shared
    /// spectrum where the mode allows one.
    pub fn from_input(mode: CalculationMode, input: &QhaInput) -> Result<Self> {
        let first = input
            .configurations
            .first()
            .ok_or(ConfigurationError::NoConfigurations)?;

        let configuration_of = |c: &crate::input::ConfigurationInput| {
            Configuration::new(
                c.name.clone(),
                c.degeneracy,
                c.volumes.clone(),
                c.static_energies.clone(),
            )
        };

        match mode {
            CalculationMode::Single => {
                if input.configurations.len() > 1 {
                    return Err(ConfigurationError::ModeMismatch(format!(
                        "single mode expects one configuration, got {}",
                        input.configurations.len()
                    )));
                }
                let spectrum = first
                    .spectrum
                    .clone()
                    .or_else(|| input.shared_spectrum.clone())
                    .ok_or_else(|| ConfigurationError::MissingSpectrum(first.name.clone()))?;
                Ok(Configurations::Single {
                    configuration: configuration_of(first),
                    spectrum,
                })
            }
            CalculationMode::SamePhononDos => {
                let spectrum = input
                    .shared_spectrum
                    .clone()
                    .or_else(|| first.spectrum.clone())
                    .ok_or_else(|| ConfigurationError::MissingSpectrum(first.name.clone()))?;
                Ok(Configurations::SamePhononDos {
                    configurations: input.configurations.iter().map(configuration_of).collect(),
                    spectrum,
                })
            }
            CalculationMode::DifferentPhononDos => {
                let members = input
                    .configurations
                    .iter()
                    .map(|c| {
                        let spectrum = c
                            .spectrum
                            .clone()
                            .ok_or_else(|| ConfigurationError::MissingSpectrum(c.name.clone()))?;
                        Ok(ConfigurationSpectrum {
                            configuration: configuration_of(c),
                            spectrum,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(Configurations::DifferentPhononDos { members })
            }
        }
    }

    pub fn mode(&self) -> CalculationMode {
        match self {
            Configurations::Single { .. } => CalculationMode::Single,
            Configurations::SamePhononDos { .. } => CalculationMode::SamePhononDos,
            Configurations::DifferentPhononDos { .. } => CalculationMode::DifferentPhononDos,
        }
    }

    /// Number of configurations
    pub fn len(&self) -> usize {
        match self {
            Configurations::Single { .. } => 1,
            Configurations::SamePhononDos { configurations, .. } => configurations.len(),
            Configurations::DifferentPhononDos { members } => members.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Volumes every configuration is aggregated on: those of the first one
    pub fn reference_volumes(&self) -> Result<&[f64]> {
        match self {
            Configurations::Single { configuration, .. } => Ok(&configuration.volumes),
            Configurations::SamePhononDos { configurations, .. } => configurations
                .first()
                .map(|c| c.volumes.as_slice())
                .ok_or(ConfigurationError::NoConfigurations),
            Configurations::DifferentPhononDos { members } => members
                .first()
                .map(|m| m.configuration.volumes.as_slice())
                .ok_or(ConfigurationError::NoConfigurations),
        }
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! QHA input data model

use std::fs;
use std::path::Path;

use log::warn;
use serde::{Deserialize, Serialize};

use super::errors::{InputError, Result};
use crate::statmech::VibrationalSpectrum;
use crate::utils::math::{is_strictly_decreasing, is_strictly_increasing};

/// Deviation of the q-point weight sum from one that triggers a warning
const WEIGHT_SUM_TOLERANCE: f64 = 1e-6;

fn default_degeneracy() -> f64 {
    1.0
}

fn default_formula_unit_number() -> usize {
    1
}

/// Static energies and, optionally, the phonon spectrum of one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationInput {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_degeneracy")]
    pub degeneracy: f64,
    /// Volumes in bohr³, increasing or decreasing
    pub volumes: Vec<f64>,
    /// Static energies in Rydberg per cell
    pub static_energies: Vec<f64>,
    #[serde(default)]
    pub spectrum: Option<VibrationalSpectrum>,
}

impl ConfigurationInput {
    /// Sort the volume axis into increasing order
    ///
    /// Static energies and the spectrum follow the volumes. Input that is
    /// neither increasing nor decreasing is rejected.
    pub fn normalize(&mut self) -> Result<()> {
        if self.volumes.len() != self.static_energies.len() {
            return Err(InputError::InvalidFormat(format!(
                "configuration '{}' has {} volumes but {} static energies",
                self.name,
                self.volumes.len(),
                self.static_energies.len()
            )));
        }
        if let Some(spectrum) = &self.spectrum {
            if spectrum.volume_count() != self.volumes.len() {
                return Err(InputError::InvalidFormat(format!(
                    "configuration '{}' has {} volumes but its spectrum covers {}",
                    self.name,
                    self.volumes.len(),
                    spectrum.volume_count()
                )));
            }
        }

        if is_strictly_increasing(&self.volumes) {
            return Ok(());
        }
        if !is_strictly_decreasing(&self.volumes) {
            return Err(InputError::NonMonotonicVolumes(format!(
                "volumes of configuration '{}' are neither increasing nor decreasing",
                self.name
            )));
        }

        let order: Vec<usize> = (0..self.volumes.len()).rev().collect();
        self.volumes.reverse();
        self.static_energies.reverse();
        if let Some(spectrum) = &mut self.spectrum {
            spectrum.permute_volumes(&order);
        }
        Ok(())
    }
}

/// Parsed QHA input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QhaInput {
    /// Formula units per cell, used for per-mole heat capacities
    #[serde(default = "default_formula_unit_number")]
    pub formula_unit_number: usize,
    pub configurations: Vec<ConfigurationInput>,
    /// Spectrum shared by configurations without one of their own
    #[serde(default)]
    pub shared_spectrum: Option<VibrationalSpectrum>,
}

impl QhaInput {
    /// Parse a JSON document and normalise it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut input: QhaInput = serde_json::from_str(json)?;
        input.normalize()?;
        Ok(input)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Sort every volume axis into increasing order and check q-point weights
    pub fn normalize(&mut self) -> Result<()> {
        if self.configurations.is_empty() {
            return Err(InputError::InvalidFormat("no configurations".to_string()));
        }
        if self.formula_unit_number == 0 {
            return Err(InputError::InvalidFormat(
                "formula_unit_number must be positive".to_string(),
            ));
        }

        // Decreasing input is reversed; the shared spectrum follows the
        // ordering of the first configuration.
        let reversed = self
            .configurations
            .first()
            .map(|c| is_strictly_decreasing(&c.volumes) && c.volumes.len() > 1)
            .unwrap_or(false);

        for configuration in &mut self.configurations {
            configuration.normalize()?;
            if let Some(spectrum) = &configuration.spectrum {
                check_weights(&configuration.name, spectrum)?;
            }
        }

        if let Some(spectrum) = &mut self.shared_spectrum {
            let n = spectrum.volume_count();
            if n != self.configurations[0].volumes.len() {
                return Err(InputError::InvalidFormat(format!(
                    "shared spectrum covers {} volumes, configurations have {}",
                    n,
                    self.configurations[0].volumes.len()
                )));
            }
            if reversed {
                let order: Vec<usize> = (0..n).rev().collect();
                spectrum.permute_volumes(&order);
            }
            check_weights("shared", spectrum)?;
        }
        Ok(())
    }
}

fn check_weights(owner: &str, spectrum: &VibrationalSpectrum) -> Result<()> {
    if let VibrationalSpectrum::Modes { q_weights, .. } = spectrum {
        if q_weights.iter().any(|w| !(w.is_finite() && *w >= 0.0)) {
            return Err(InputError::InvalidFormat(format!(
                "{} spectrum has negative q-point weights",
                owner
            )));
        }
        let total: f64 = q_weights.iter().sum();
        if !(total > 0.0) {
            return Err(InputError::InvalidFormat(format!(
                "{} spectrum has q-point weights summing to zero",
                owner
            )));
        }
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            warn!(
                "q-point weights of the {} spectrum sum to {:.6}; they will be renormalised",
                owner, total
            );
        }
    }
    Ok(())
}

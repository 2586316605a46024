/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Sampled output of a QHA run

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::input::PropertyId;
use crate::utils::EnergyUnit;

/// Equation-of-state parameters at one sampled temperature
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EosParameters {
    /// Kelvin
    pub temperature: f64,
    /// Å³
    pub equilibrium_volume: f64,
    /// Reported energy unit
    pub equilibrium_energy: f64,
    /// GPa
    pub bulk_modulus: f64,
    pub bulk_modulus_derivative: f64,
}

/// Fitted (T, V) fields on the dense volume grid
///
/// Rows are the sampled temperatures, columns every dense volume.
#[derive(Debug, Clone)]
pub struct VolumeTables {
    /// Dense volumes in bohr³
    pub volumes_bohr3: Vec<f64>,
    /// The same volumes in Å³
    pub volumes: Vec<f64>,
    /// Helmholtz free energy in the reported energy unit
    pub free_energy: Array2<f64>,
    /// GPa
    pub pressure: Array2<f64>,
    /// Reported energy unit per kelvin
    pub entropy: Array2<f64>,
}

/// Property tables on the sampled (T, P) grid
///
/// Every table has shape `(temperatures.len(), pressures.len())`.
#[derive(Debug, Clone)]
pub struct ThermodynamicResults {
    /// Sampled temperatures in K
    pub temperatures: Vec<f64>,
    /// Sampled pressures in GPa
    pub pressures: Vec<f64>,
    pub energy_unit: EnergyUnit,
    /// Volume expansion ratio of the dense grid
    pub volume_ratio: f64,
    pub eos: Vec<EosParameters>,
    /// F, P and S before the pressure remap
    pub volume_tables: VolumeTables,
    tables: BTreeMap<PropertyId, Array2<f64>>,
}

impl ThermodynamicResults {
    pub(crate) fn new(
        temperatures: Vec<f64>,
        pressures: Vec<f64>,
        energy_unit: EnergyUnit,
        volume_ratio: f64,
        eos: Vec<EosParameters>,
        tables: BTreeMap<PropertyId, Array2<f64>>,
        volume_tables: VolumeTables,
    ) -> Self {
        Self {
            temperatures,
            pressures,
            energy_unit,
            volume_ratio,
            eos,
            volume_tables,
            tables,
        }
    }

    /// Table of `property`, if it was requested
    pub fn get(&self, property: PropertyId) -> Option<&Array2<f64>> {
        self.tables.get(&property)
    }

    /// Requested properties with their tables, in [`PropertyId`] order
    pub fn tables(&self) -> impl Iterator<Item = (PropertyId, &Array2<f64>)> {
        self.tables.iter().map(|(&p, table)| (p, table))
    }

    /// Unit label of a property's table
    pub fn unit_label(&self, property: PropertyId) -> String {
        match property {
            PropertyId::F | PropertyId::G | PropertyId::H | PropertyId::U => {
                self.energy_unit.to_string()
            }
            PropertyId::V => "A^3".to_string(),
            PropertyId::Bt | PropertyId::Bs => "GPa".to_string(),
            PropertyId::Cv | PropertyId::Cp => "J/(mol K)".to_string(),
            PropertyId::Alpha => "1/K".to_string(),
            PropertyId::Btp | PropertyId::Gamma => "1".to_string(),
        }
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Unit conversion utilities
//!
//! Input energies are Rydberg per cell and volumes bohr³, so the pipeline
//! works in Ry, bohr³ and Ry/bohr³ throughout. [`EnergyUnit`] only selects the
//! unit energies are reported in; everything user-facing is converted at the
//! edges with the functions here.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::constants::*;
use super::errors::UtilsError;

/// Energy unit of reported free energies, enthalpies and internal energies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnergyUnit {
    /// Rydberg
    #[default]
    Ry,
    /// Hartree
    Ha,
    /// Electronvolt
    Ev,
}

impl EnergyUnit {
    /// Size of one unit in eV
    pub fn in_ev(self) -> f64 {
        match self {
            EnergyUnit::Ry => RYDBERG_EV,
            EnergyUnit::Ha => HARTREE_EV,
            EnergyUnit::Ev => 1.0,
        }
    }

    /// Boltzmann constant in this unit per kelvin
    pub fn boltzmann(self) -> f64 {
        BOLTZMANN_EV / self.in_ev()
    }

    /// h·c in this unit times cm, so that `hc() * ω[cm⁻¹]` is an energy
    pub fn hc(self) -> f64 {
        HC_EV_CM / self.in_ev()
    }

    /// Express an energy given in Rydberg in this unit
    pub fn from_ry(self, ry: f64) -> f64 {
        match self {
            EnergyUnit::Ry => ry,
            EnergyUnit::Ha => ev_to_ha(ry_to_ev(ry)),
            EnergyUnit::Ev => ry_to_ev(ry),
        }
    }
}

impl fmt::Display for EnergyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnergyUnit::Ry => "ry",
            EnergyUnit::Ha => "ha",
            EnergyUnit::Ev => "ev",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for EnergyUnit {
    type Err = UtilsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ry" => Ok(EnergyUnit::Ry),
            "ha" => Ok(EnergyUnit::Ha),
            "ev" => Ok(EnergyUnit::Ev),
            other => Err(UtilsError::Math(format!("unknown energy unit '{}'", other))),
        }
    }
}

/// Convert energy from Rydberg to eV
pub fn ry_to_ev(ry: f64) -> f64 {
    ry * RYDBERG_EV
}

/// Convert energy from eV to Hartree
pub fn ev_to_ha(ev: f64) -> f64 {
    ev / HARTREE_EV
}

/// Convert volume from bohr³ to Å³
pub fn b3_to_a3(b3: f64) -> f64 {
    b3 * (BOHR_RADIUS_M / ANGSTROM_M).powi(3)
}

/// Convert volume from Å³ to bohr³
pub fn a3_to_b3(a3: f64) -> f64 {
    a3 * (ANGSTROM_M / BOHR_RADIUS_M).powi(3)
}

/// Convert pressure from GPa to Ry/bohr³
pub fn gpa_to_ry_b3(gpa: f64) -> f64 {
    gpa * 1e9 / RYDBERG_J * BOHR_RADIUS_M.powi(3)
}

/// Convert pressure from Ry/bohr³ to GPa
pub fn ry_b3_to_gpa(ry_b3: f64) -> f64 {
    ry_b3 / 1e9 * RYDBERG_J / BOHR_RADIUS_M.powi(3)
}

/// Convert an energy per formula unit in Rydberg to J/mol
pub fn ry_to_j_mol(ry: f64) -> f64 {
    ry * AVOGADRO * RYDBERG_J
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_volume_conversions() {
        let volume = 270.0;
        assert_relative_eq!(a3_to_b3(b3_to_a3(volume)), volume, epsilon = 1e-10);
        assert_relative_eq!(b3_to_a3(1.0), 0.148_184_711_4, epsilon = 1e-9);
    }

    #[test]
    fn test_pressure_conversions() {
        // One Ry/bohr³ is about 14710.5 GPa
        assert_relative_eq!(ry_b3_to_gpa(1.0), 14_710.507_848, max_relative = 1e-8);
        assert_relative_eq!(gpa_to_ry_b3(ry_b3_to_gpa(0.25)), 0.25, epsilon = 1e-14);
    }

    #[test]
    fn test_energy_unit_consistency() {
        for unit in [EnergyUnit::Ry, EnergyUnit::Ha, EnergyUnit::Ev] {
            assert_relative_eq!(
                unit.boltzmann() * unit.in_ev(),
                BOLTZMANN_EV,
                max_relative = 1e-14
            );
            assert_relative_eq!(unit.from_ry(1.0) * unit.in_ev(), RYDBERG_EV, max_relative = 1e-14);
        }
        assert_eq!(EnergyUnit::Ry.from_ry(-3.5), -3.5);
        assert_relative_eq!(EnergyUnit::Ha.from_ry(2.0), 1.0, max_relative = 1e-8);
        assert_relative_eq!(ry_to_j_mol(1.0) / 1000.0, 1312.749_7, max_relative = 1e-6);
    }

    #[test]
    fn test_energy_unit_parsing() {
        assert_eq!("Ry".parse::<EnergyUnit>().unwrap(), EnergyUnit::Ry);
        assert_eq!("ev".parse::<EnergyUnit>().unwrap(), EnergyUnit::Ev);
        assert!("kcal".parse::<EnergyUnit>().is_err());
        assert_eq!(EnergyUnit::Ha.to_string(), "ha");
    }
}

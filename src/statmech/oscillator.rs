/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Free energy of a single quantum harmonic oscillator
//!
//! Frequencies are wavenumbers in cm⁻¹ and temperatures in kelvin. Energies
//! come out in the requested [`EnergyUnit`].
//!
//! Non-positive frequencies (acoustic modes at Γ, or soft modes that were
//! explicitly tolerated) contribute nothing. At `T = 0` only the zero-point
//! energy survives.

use crate::utils::EnergyUnit;

/// Helmholtz free energy `½ħω + k_B T ln(1 − e^(−ħω/k_B T))`
pub fn ho_free_energy(unit: EnergyUnit, temperature: f64, frequency: f64) -> f64 {
    if frequency <= 0.0 {
        return 0.0;
    }
    let hw = unit.hc() * frequency;
    if temperature <= 0.0 {
        return 0.5 * hw;
    }
    let kt = unit.boltzmann() * temperature;
    0.5 * hw + kt * (-(-hw / kt).exp()).ln_1p()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const UNIT: EnergyUnit = EnergyUnit::Ry;

    #[test]
    fn test_zero_temperature_limit() {
        let w = 400.0;
        let zpe = 0.5 * UNIT.hc() * w;
        assert_eq!(ho_free_energy(UNIT, 0.0, w), zpe);

        // Very cold but finite temperatures approach the same limit without overflow
        assert_relative_eq!(ho_free_energy(UNIT, 1e-3, w), zpe, max_relative = 1e-12);
    }

    #[test]
    fn test_non_positive_frequencies_contribute_nothing() {
        for w in [0.0, -5.0] {
            assert_eq!(ho_free_energy(UNIT, 300.0, w), 0.0);
            assert_eq!(ho_free_energy(UNIT, 0.0, w), 0.0);
        }
    }

    #[test]
    fn test_entropy_and_heat_capacity_from_free_energy() {
        let (t, w) = (500.0, 250.0);
        let kb = UNIT.boltzmann();
        let x = UNIT.hc() * w / (kb * t);
        let h = 1e-2;

        // S = −∂F/∂T
        let s = -(ho_free_energy(UNIT, t + h, w) - ho_free_energy(UNIT, t - h, w)) / (2.0 * h);
        let expected_s = kb * (x / x.exp_m1() - (-(-x).exp()).ln_1p());
        assert_relative_eq!(s, expected_s, max_relative = 1e-6);

        // Cv = −T ∂²F/∂T²
        let second = (ho_free_energy(UNIT, t + h, w) - 2.0 * ho_free_energy(UNIT, t, w)
            + ho_free_energy(UNIT, t - h, w))
            / (h * h);
        let expected_cv = kb * x * x * (-x).exp() / (-(-x).exp_m1()).powi(2);
        assert_relative_eq!(-t * second, expected_cv, max_relative = 1e-4);
    }

    #[test]
    fn test_classical_limit() {
        // kT ≫ ħω: F → kT ln(ħω / kT)
        let (t, w) = (1e5, 10.0);
        let kt = UNIT.boltzmann() * t;
        let hw = UNIT.hc() * w;
        assert_relative_eq!(ho_free_energy(UNIT, t, w), kt * (hw / kt).ln(), max_relative = 1e-4);
    }

    #[test]
    fn test_units_scale_consistently() {
        let (t, w) = (300.0, 600.0);
        let ry = ho_free_energy(EnergyUnit::Ry, t, w) * EnergyUnit::Ry.in_ev();
        let ev = ho_free_energy(EnergyUnit::Ev, t, w);
        let ha = ho_free_energy(EnergyUnit::Ha, t, w) * EnergyUnit::Ha.in_ev();
        assert_relative_eq!(ry, ev, max_relative = 1e-12);
        assert_relative_eq!(ha, ev, max_relative = 1e-12);
    }
}

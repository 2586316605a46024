/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Birch–Murnaghan equation of state
//!
//! The energy is fitted as a polynomial of degree 3, 4 or 5 in Eulerian
//! strain. Pressure, bulk modulus and its pressure derivative follow by
//! differentiating that polynomial analytically:
//!
//! ```text
//! P   = E'(f) (2f + 1) / (3V)
//! B   = g / (9V),           g = (2f + 1)² E'' + 5 (2f + 1) E'
//! B'  = 1 + (2f + 1) g' / (3g)
//! g'  = (2f + 1)² E''' + 9 (2f + 1) E'' + 10 E'
//! ```
//!
//! where primes on `E` are strain derivatives.

use log::debug;

use super::errors::{EosError, Result};
use super::polynomial::StrainPolynomial;
use super::strain::volume_from_strain;

/// Iteration cap for the Newton search of the energy minimum in strain
const MINIMUM_SEARCH_ITERATIONS: usize = 100;

/// Strain step below which the minimum search has converged
const MINIMUM_SEARCH_TOLERANCE: f64 = 1e-12;

/// Default cap on equilibrium-volume refinement iterations
pub const DEFAULT_MAX_ITERATIONS: usize = 100;

/// Default relative tolerance on the equilibrium volume
pub const DEFAULT_TOLERANCE: f64 = 1e-8;

/// Default largest acceptable condition number of the normal equations
pub const DEFAULT_CONDITION_THRESHOLD: f64 = 1e12;

/// Fits Birch–Murnaghan equations of state to (volume, energy) samples
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EosFitter {
    order: usize,
    max_iterations: usize,
    tolerance: f64,
    condition_threshold: f64,
}

impl EosFitter {
    /// Create a fitter for a Birch–Murnaghan order of 3, 4 or 5
    pub fn new(order: usize) -> Result<Self> {
        if !(3..=5).contains(&order) {
            return Err(EosError::InvalidOrder(order));
        }
        Ok(Self {
            order,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            tolerance: DEFAULT_TOLERANCE,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
        })
    }

    /// Set the cap on equilibrium-volume refinement iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations.max(1);
        self
    }

    /// Set the relative convergence tolerance on the equilibrium volume
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the largest acceptable condition number of the least-squares solve
    pub fn with_condition_threshold(mut self, condition_threshold: f64) -> Self {
        self.condition_threshold = condition_threshold;
        self
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    pub fn condition_threshold(&self) -> f64 {
        self.condition_threshold
    }

    /// Fit with uniform weights
    pub fn fit(&self, volumes: &[f64], energies: &[f64]) -> Result<EosFit> {
        self.fit_weighted(volumes, energies, None)
    }

    /// Fit with optional per-sample weights
    ///
    /// The strain reference starts at the sampled volume of lowest energy.
    /// Each iteration fits the polynomial, locates its minimum in strain and
    /// moves the reference there, until the equilibrium volume changes by
    /// less than `tolerance` relative to itself.
    ///
    /// # Errors
    ///
    /// * [`EosError::InsufficientData`] with fewer than `order + 1` samples
    /// * [`EosError::FitDivergence`] if the least-squares solve is
    ///   ill-conditioned, the fitted curve has no minimum, or the
    ///   refinement does not converge within `max_iterations`
    pub fn fit_weighted(
        &self,
        volumes: &[f64],
        energies: &[f64],
        weights: Option<&[f64]>,
    ) -> Result<EosFit> {
        if volumes.len() < self.order + 1 {
            return Err(EosError::InsufficientData {
                samples: volumes.len(),
                order: self.order,
                required: self.order + 1,
            });
        }

        let mut reference = volumes
            .iter()
            .zip(energies.iter())
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(&v, _)| v)
            .ok_or(EosError::InsufficientData {
                samples: 0,
                order: self.order,
                required: self.order + 1,
            })?;

        for iteration in 1..=self.max_iterations {
            let polynomial = StrainPolynomial::fit(
                reference,
                volumes,
                energies,
                weights,
                self.order,
                self.condition_threshold,
            )?;

            let strain = minimum_strain(&polynomial)?;
            let equilibrium_volume = volume_from_strain(reference, strain);
            if !(equilibrium_volume.is_finite() && equilibrium_volume > 0.0) {
                return Err(EosError::FitDivergence(format!(
                    "equilibrium volume {} is not physical",
                    equilibrium_volume
                )));
            }

            if (equilibrium_volume - reference).abs() <= self.tolerance * equilibrium_volume {
                debug!(
                    "BM{} fit converged after {} iteration(s): V0 = {:.6}",
                    self.order, iteration, equilibrium_volume
                );
                return Ok(EosFit {
                    order: self.order,
                    polynomial,
                    equilibrium_volume,
                    iterations: iteration,
                });
            }
            reference = equilibrium_volume;
        }

        Err(EosError::FitDivergence(format!(
            "equilibrium volume did not converge within {} iterations (last estimate {:.6})",
            self.max_iterations, reference
        )))
    }
}

/// Newton search for `E'(f) = 0` starting at zero strain
fn minimum_strain(polynomial: &StrainPolynomial) -> Result<f64> {
    let mut strain = 0.0;
    for _ in 0..MINIMUM_SEARCH_ITERATIONS {
        let slope = polynomial.derivative_at_strain(1, strain);
        let curvature = polynomial.derivative_at_strain(2, strain);
        if !(curvature > 0.0) {
            return Err(EosError::FitDivergence(format!(
                "fitted energy has no minimum near f = {:.4e} (curvature {:.4e})",
                strain, curvature
            )));
        }

        let step = slope / curvature;
        strain -= step;
        // 2f + 1 must stay positive for the volume to exist
        if !strain.is_finite() || 2.0 * strain + 1.0 <= 0.0 {
            return Err(EosError::FitDivergence(format!(
                "minimum search left the physical strain range (f = {:.4e})",
                strain
            )));
        }
        if step.abs() <= MINIMUM_SEARCH_TOLERANCE * (1.0 + strain.abs()) {
            return Ok(strain);
        }
    }

    Err(EosError::FitDivergence(format!(
        "minimum search did not converge within {} steps",
        MINIMUM_SEARCH_ITERATIONS
    )))
}

/// Converged Birch–Murnaghan fit
///
/// Energies are in the unit of the fitted samples, volumes in the unit of
/// the fitted volumes, and pressures and bulk moduli in energy per volume.
#[derive(Debug, Clone, PartialEq)]
pub struct EosFit {
    order: usize,
    polynomial: StrainPolynomial,
    equilibrium_volume: f64,
    iterations: usize,
}

impl EosFit {
    /// Birch–Murnaghan order of the fit
    pub fn order(&self) -> usize {
        self.order
    }

    /// Underlying polynomial in strain about the converged reference volume
    pub fn polynomial(&self) -> &StrainPolynomial {
        &self.polynomial
    }

    /// Polynomial coefficients in ascending powers of strain
    pub fn coefficients(&self) -> &[f64] {
        self.polynomial.coefficients()
    }

    /// Number of refinement iterations used
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn equilibrium_volume(&self) -> f64 {
        self.equilibrium_volume
    }

    pub fn equilibrium_energy(&self) -> f64 {
        self.energy_at(self.equilibrium_volume)
    }

    /// Bulk modulus at the equilibrium volume
    pub fn bulk_modulus(&self) -> f64 {
        self.bulk_modulus_at(self.equilibrium_volume)
    }

    /// Pressure derivative of the bulk modulus at the equilibrium volume
    pub fn bulk_modulus_derivative(&self) -> f64 {
        self.bulk_modulus_derivative_at(self.equilibrium_volume)
    }

    /// Fitted energy at `volume`
    pub fn energy_at(&self, volume: f64) -> f64 {
        self.polynomial.value_at(volume)
    }

    /// `P = −dE/dV` at `volume`
    pub fn pressure_at(&self, volume: f64) -> f64 {
        let f = self.polynomial.strain(volume);
        let d1 = self.polynomial.derivative_at_strain(1, f);
        d1 * (2.0 * f + 1.0) / (3.0 * volume)
    }

    /// Isothermal bulk modulus `B = −V dP/dV` at `volume`
    pub fn bulk_modulus_at(&self, volume: f64) -> f64 {
        let f = self.polynomial.strain(volume);
        self.curvature_term(f) / (9.0 * volume)
    }

    /// `dB/dP` at `volume`
    pub fn bulk_modulus_derivative_at(&self, volume: f64) -> f64 {
        let f = self.polynomial.strain(volume);
        let s = 2.0 * f + 1.0;
        let d1 = self.polynomial.derivative_at_strain(1, f);
        let d2 = self.polynomial.derivative_at_strain(2, f);
        let d3 = self.polynomial.derivative_at_strain(3, f);
        let g = self.curvature_term(f);
        let dg = s * s * d3 + 9.0 * s * d2 + 10.0 * d1;
        1.0 + s * dg / (3.0 * g)
    }

    /// Differences between the samples and the fitted curve
    pub fn residuals(&self, volumes: &[f64], energies: &[f64]) -> Vec<f64> {
        volumes
            .iter()
            .zip(energies.iter())
            .map(|(&v, &e)| e - self.energy_at(v))
            .collect()
    }

    fn curvature_term(&self, f: f64) -> f64 {
        let s = 2.0 * f + 1.0;
        let d1 = self.polynomial.derivative_at_strain(1, f);
        let d2 = self.polynomial.derivative_at_strain(2, f);
        s * s * d2 + 5.0 * s * d1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::strain::eulerian_strain;
    use approx::assert_relative_eq;
    use rstest::rstest;

    const V0: f64 = 270.0;
    const B0: f64 = 6.8e-3;

    fn bm3_energy(v: f64, b0_prime: f64) -> f64 {
        let f = eulerian_strain(V0, v);
        -100.0 + 4.5 * B0 * V0 * f * f * (1.0 + (b0_prime - 4.0) * f)
    }

    fn sample_volumes() -> Vec<f64> {
        (0..8).map(|i| 240.0 + 10.0 * i as f64).collect()
    }

    #[rstest]
    #[case(3)]
    #[case(4)]
    #[case(5)]
    fn test_recovers_bm3_parameters(#[case] order: usize) {
        let volumes = sample_volumes();
        let energies: Vec<f64> = volumes.iter().map(|&v| bm3_energy(v, 4.5)).collect();
        let fit = EosFitter::new(order).unwrap().fit(&volumes, &energies).unwrap();

        assert_relative_eq!(fit.equilibrium_volume(), V0, max_relative = 1e-7);
        assert_relative_eq!(fit.equilibrium_energy(), -100.0, epsilon = 1e-9);
        assert_relative_eq!(fit.bulk_modulus(), B0, max_relative = 1e-5);
        assert_relative_eq!(fit.bulk_modulus_derivative(), 4.5, max_relative = 1e-3);
        assert_eq!(fit.coefficients().len(), order + 1);
        assert!(fit.residuals(&volumes, &energies).iter().all(|r| r.abs() < 1e-9));
    }

    #[test]
    fn test_bulk_modulus_matches_finite_difference() {
        // Quadratic in volume, centred on V0
        let energy = |v: f64| -50.0 + 0.5 * B0 * (v - V0).powi(2) / V0;
        let volumes = [262.0, 265.2, 268.4, 271.6, 274.8, 278.0];
        let energies: Vec<f64> = volumes.iter().map(|&v| energy(v)).collect();
        let fit = EosFitter::new(3).unwrap().fit(&volumes, &energies).unwrap();

        let h = 0.5;
        let v0 = fit.equilibrium_volume();
        let reference = v0 * (energy(v0 + h) - 2.0 * energy(v0) + energy(v0 - h)) / (h * h);
        assert_relative_eq!(fit.bulk_modulus(), reference, max_relative = 1e-2);
        assert_relative_eq!(v0, V0, max_relative = 1e-3);
    }

    #[test]
    fn test_pressure_is_minus_energy_slope() {
        let volumes = sample_volumes();
        let energies: Vec<f64> = volumes.iter().map(|&v| bm3_energy(v, 4.2)).collect();
        let fit = EosFitter::new(3).unwrap().fit(&volumes, &energies).unwrap();

        let (v, h) = (250.0, 1e-3);
        let slope = (fit.energy_at(v + h) - fit.energy_at(v - h)) / (2.0 * h);
        assert_relative_eq!(fit.pressure_at(v), -slope, max_relative = 1e-6);

        let dp = (fit.pressure_at(v + h) - fit.pressure_at(v - h)) / (2.0 * h);
        assert_relative_eq!(fit.bulk_modulus_at(v), -v * dp, max_relative = 1e-6);

        let db = (fit.bulk_modulus_at(v + h) - fit.bulk_modulus_at(v - h)) / (2.0 * h);
        assert_relative_eq!(fit.bulk_modulus_derivative_at(v), db / dp, max_relative = 1e-5);

        assert!(fit.pressure_at(250.0) > 0.0);
        assert!(fit.pressure_at(290.0) < 0.0);
        assert!(fit.pressure_at(fit.equilibrium_volume()).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_order() {
        assert_eq!(EosFitter::new(2), Err(EosError::InvalidOrder(2)));
        assert_eq!(EosFitter::new(6), Err(EosError::InvalidOrder(6)));
    }

    #[test]
    fn test_insufficient_data() {
        let fitter = EosFitter::new(4).unwrap();
        let result = fitter.fit(&[250.0, 260.0, 270.0, 280.0], &[1.0, 0.5, 0.4, 0.6]);
        assert!(matches!(
            result,
            Err(EosError::InsufficientData { samples: 4, required: 5, .. })
        ));
    }

    #[test]
    fn test_degenerate_volumes_diverge() {
        let fitter = EosFitter::new(3).unwrap();
        let result = fitter.fit(&[270.0; 5], &[1.0, 1.1, 0.9, 1.0, 1.05]);
        assert!(matches!(result, Err(EosError::FitDivergence(_))));
    }

    #[test]
    fn test_iteration_cap_is_honoured() {
        // Minimum between samples needs at least two reference updates
        let volumes: Vec<f64> = (0..7).map(|i| 243.0 + 10.0 * i as f64).collect();
        let energies: Vec<f64> = volumes.iter().map(|&v| bm3_energy(v, 4.0)).collect();

        let capped = EosFitter::new(3).unwrap().with_max_iterations(1);
        assert!(matches!(
            capped.fit(&volumes, &energies),
            Err(EosError::FitDivergence(_))
        ));

        let fit = EosFitter::new(3).unwrap().fit(&volumes, &energies).unwrap();
        assert!(fit.iterations() >= 2);
        assert_relative_eq!(fit.equilibrium_volume(), V0, max_relative = 1e-7);
    }

    #[test]
    fn test_no_minimum_is_rejected() {
        // Energy strictly decreasing with volume: convex in strain nowhere near zero slope
        let volumes = sample_volumes();
        let energies: Vec<f64> = volumes.iter().map(|&v| -1e-3 * v - 1e-8 * v * v).collect();
        let result = EosFitter::new(3).unwrap().fit(&volumes, &energies);
        assert!(matches!(result, Err(EosError::FitDivergence(_))));
    }
}

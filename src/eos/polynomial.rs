/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Polynomials in Eulerian strain
//!
//! `y(V) = Σₖ aₖ fᵏ` with `f` the strain of `V` relative to a fixed reference
//! volume. Because changing the reference volume maps `f` affinely onto
//! itself, the space of fitted curves does not depend on that choice; only
//! the coefficients do.

use faer::Mat;

use super::errors::{EosError, Result};
use super::strain::eulerian_strain;
use crate::utils::linear_algebra::weighted_least_squares;
use crate::utils::UtilsError;

/// Least-squares polynomial in Eulerian strain about a reference volume
#[derive(Debug, Clone, PartialEq)]
pub struct StrainPolynomial {
    reference_volume: f64,
    coefficients: Vec<f64>,
    condition_number: f64,
}

impl StrainPolynomial {
    /// Fit `values` sampled at `volumes` with a polynomial of degree `degree`
    ///
    /// # Arguments
    ///
    /// * `reference_volume` - Volume at which the strain is zero
    /// * `volumes` - Sampled volumes
    /// * `values` - Sampled values, one per volume
    /// * `weights` - Per-sample least-squares weights, or `None` for uniform
    /// * `degree` - Polynomial degree; at least `degree + 1` samples are needed
    /// * `condition_threshold` - Largest acceptable normal-matrix condition number
    pub fn fit(
        reference_volume: f64,
        volumes: &[f64],
        values: &[f64],
        weights: Option<&[f64]>,
        degree: usize,
        condition_threshold: f64,
    ) -> Result<Self> {
        let uniform;
        let weights = match weights {
            Some(w) => w,
            None => {
                uniform = vec![1.0; volumes.len()];
                &uniform[..]
            }
        };

        if values.len() != volumes.len() || weights.len() != volumes.len() {
            return Err(EosError::LengthMismatch {
                volumes: volumes.len(),
                values: values.len(),
                weights: weights.len(),
            });
        }
        if !(reference_volume.is_finite() && reference_volume > 0.0) {
            return Err(EosError::InvalidVolume(reference_volume));
        }
        if let Some(&v) = volumes.iter().find(|v| !(v.is_finite() && **v > 0.0)) {
            return Err(EosError::InvalidVolume(v));
        }
        if let Some(&e) = values.iter().find(|e| !e.is_finite()) {
            return Err(EosError::InvalidEnergy(e));
        }
        if volumes.len() < degree + 1 {
            return Err(EosError::InsufficientData {
                samples: volumes.len(),
                order: degree,
                required: degree + 1,
            });
        }

        let strains: Vec<f64> = volumes
            .iter()
            .map(|&v| eulerian_strain(reference_volume, v))
            .collect();
        let design = Mat::<f64>::from_fn(strains.len(), degree + 1, |i, k| {
            strains[i].powi(k as i32)
        });

        let solution = weighted_least_squares(&design, values, weights, condition_threshold)
            .map_err(|e| match e {
                UtilsError::Singular(msg) => EosError::FitDivergence(msg),
                other => EosError::FitDivergence(other.to_string()),
            })?;

        Ok(Self {
            reference_volume,
            coefficients: solution.coefficients,
            condition_number: solution.condition_number,
        })
    }

    /// Volume at which the strain is zero
    pub fn reference_volume(&self) -> f64 {
        self.reference_volume
    }

    /// Coefficients in ascending powers of strain
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Condition number of the least-squares solve
    pub fn condition_number(&self) -> f64 {
        self.condition_number
    }

    /// Polynomial degree
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Strain of `volume` relative to the reference volume
    pub fn strain(&self, volume: f64) -> f64 {
        eulerian_strain(self.reference_volume, volume)
    }

    /// `n`-th derivative with respect to strain, evaluated at `strain`
    pub fn derivative_at_strain(&self, n: usize, strain: f64) -> f64 {
        // Horner on the n-times differentiated coefficients
        let mut result = 0.0;
        for k in (n..self.coefficients.len()).rev() {
            let falling: f64 = ((k - n + 1)..=k).map(|m| m as f64).product();
            result = result * strain + self.coefficients[k] * falling;
        }
        result
    }

    /// Polynomial value at `strain`
    pub fn value_at_strain(&self, strain: f64) -> f64 {
        self.derivative_at_strain(0, strain)
    }

    /// Polynomial value at `volume`
    pub fn value_at(&self, volume: f64) -> f64 {
        self.value_at_strain(self.strain(volume))
    }
}

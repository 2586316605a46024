/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Linear algebra utilities using the Faer library
//!
//! The EOS fits only ever need small dense systems (at most 6×6 normal
//! matrices), so the decomposition is written out directly on `faer::Mat`
//! storage with partial pivoting, and the condition number is estimated in
//! the 1-norm from the explicit inverse.

use faer::Mat;

use super::errors::{Result, UtilsError};

/// Pivots smaller than this (relative to the largest diagonal entry) are
/// treated as exact singularity
const PIVOT_EPSILON: f64 = 1e-14;

/// Solution of a weighted linear least-squares problem
#[derive(Debug, Clone)]
pub struct LeastSquaresSolution {
    /// Fitted coefficients, one per design-matrix column
    pub coefficients: Vec<f64>,
    /// 1-norm condition number of the equilibrated normal matrix
    pub condition_number: f64,
}

/// LU decomposition with partial pivoting, stored compactly
#[derive(Debug, Clone)]
pub struct LuDecomposition {
    lu: Mat<f64>,
    permutation: Vec<usize>,
}

impl LuDecomposition {
    /// Factorise a square matrix
    pub fn new(a: &Mat<f64>) -> Result<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(UtilsError::DimensionMismatch(format!(
                "LU decomposition needs a square matrix, got {}x{}",
                n,
                a.ncols()
            )));
        }

        let mut lu = a.clone();
        let mut permutation: Vec<usize> = (0..n).collect();
        let scale = (0..n)
            .map(|i| a[(i, i)].abs())
            .fold(0.0_f64, f64::max)
            .max(f64::MIN_POSITIVE);

        for k in 0..n {
            // Find pivot
            let mut pivot_row = k;
            let mut pivot_val = lu[(k, k)].abs();
            for i in (k + 1)..n {
                let val = lu[(i, k)].abs();
                if val > pivot_val {
                    pivot_row = i;
                    pivot_val = val;
                }
            }

            if pivot_val <= PIVOT_EPSILON * scale {
                return Err(UtilsError::Singular(format!(
                    "zero pivot in column {} of {}x{} matrix",
                    k, n, n
                )));
            }

            if pivot_row != k {
                permutation.swap(k, pivot_row);
                for j in 0..n {
                    let temp = lu[(k, j)];
                    lu[(k, j)] = lu[(pivot_row, j)];
                    lu[(pivot_row, j)] = temp;
                }
            }

            for i in (k + 1)..n {
                let multiplier = lu[(i, k)] / lu[(k, k)];
                lu[(i, k)] = multiplier;
                for j in (k + 1)..n {
                    let updated = lu[(i, j)] - multiplier * lu[(k, j)];
                    lu[(i, j)] = updated;
                }
            }
        }

        Ok(Self { lu, permutation })
    }

    /// Solve `A x = b`
    pub fn solve(&self, b: &[f64]) -> Vec<f64> {
        let n = self.lu.nrows();
        let mut x: Vec<f64> = self.permutation.iter().map(|&p| b[p]).collect();

        // Forward substitution with the unit lower triangle
        for i in 0..n {
            for k in 0..i {
                x[i] -= self.lu[(i, k)] * x[k];
            }
        }

        // Backward substitution with the upper triangle
        for i in (0..n).rev() {
            for k in (i + 1)..n {
                x[i] -= self.lu[(i, k)] * x[k];
            }
            x[i] /= self.lu[(i, i)];
        }

        x
    }

    /// Explicit inverse, column by column
    pub fn inverse(&self) -> Mat<f64> {
        let n = self.lu.nrows();
        let mut inverse = Mat::<f64>::zeros(n, n);
        let mut unit = vec![0.0; n];
        for j in 0..n {
            unit.iter_mut().for_each(|u| *u = 0.0);
            unit[j] = 1.0;
            for (i, value) in self.solve(&unit).into_iter().enumerate() {
                inverse[(i, j)] = value;
            }
        }
        inverse
    }
}

/// Maximum absolute column sum
pub fn one_norm(a: &Mat<f64>) -> f64 {
    (0..a.ncols())
        .map(|j| (0..a.nrows()).map(|i| a[(i, j)].abs()).sum::<f64>())
        .fold(0.0, f64::max)
}

/// Solve `min Σ w_i (X_i · c − y_i)²` through the normal equations
///
/// The normal matrix is symmetrically equilibrated by its diagonal before
/// factorisation, which removes the column-scale disparity of Vandermonde
/// designs in small strain. The solve fails with [`UtilsError::Singular`]
/// if the equilibrated matrix is singular or its condition number exceeds
/// `condition_threshold`.
pub fn weighted_least_squares(
    design: &Mat<f64>,
    rhs: &[f64],
    weights: &[f64],
    condition_threshold: f64,
) -> Result<LeastSquaresSolution> {
    let (rows, cols) = (design.nrows(), design.ncols());
    if rhs.len() != rows || weights.len() != rows {
        return Err(UtilsError::DimensionMismatch(format!(
            "design has {} rows but {} values and {} weights were given",
            rows,
            rhs.len(),
            weights.len()
        )));
    }

    let mut normal = Mat::<f64>::zeros(cols, cols);
    let mut moment = vec![0.0; cols];
    for r in 0..rows {
        let w = weights[r];
        for i in 0..cols {
            moment[i] += w * design[(r, i)] * rhs[r];
            for j in 0..cols {
                let updated = normal[(i, j)] + w * design[(r, i)] * design[(r, j)];
                normal[(i, j)] = updated;
            }
        }
    }

    let scaling: Vec<f64> = (0..cols)
        .map(|i| {
            let d = normal[(i, i)];
            if d > 0.0 {
                1.0 / d.sqrt()
            } else {
                1.0
            }
        })
        .collect();
    for i in 0..cols {
        moment[i] *= scaling[i];
        for j in 0..cols {
            let scaled = normal[(i, j)] * scaling[i] * scaling[j];
            normal[(i, j)] = scaled;
        }
    }

    let lu = LuDecomposition::new(&normal)?;
    let condition_number = one_norm(&normal) * one_norm(&lu.inverse());
    if !condition_number.is_finite() || condition_number > condition_threshold {
        return Err(UtilsError::Singular(format!(
            "normal matrix condition number {:.3e} exceeds threshold {:.3e}",
            condition_number, condition_threshold
        )));
    }

    let coefficients = lu
        .solve(&moment)
        .into_iter()
        .zip(scaling.iter())
        .map(|(z, s)| z * s)
        .collect();

    Ok(LeastSquaresSolution {
        coefficients,
        condition_number,
    })
}

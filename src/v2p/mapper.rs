/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Resampling of (T, V) fields onto a pressure grid
//!
//! For every temperature row the pressure `P(V)` must fall strictly as the
//! volume grows. Each target pressure is located between two neighbouring
//! pressures and a cubic Lagrange polynomial in `P` through the four
//! surrounding samples is evaluated there. The stencils depend only on the
//! pressure field, so they are computed once and reused for every property.

use ndarray::{Array2, ArrayView1};

use super::errors::{Result, V2pError};
use crate::utils::math::{find_bracket, lagrange4_weights};
use crate::utils::parallel::{map_rows, stack_rows};
use crate::utils::Target;

/// Volume indices and Lagrange weights for one target pressure
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stencil {
    indices: [usize; 4],
    weights: [f64; 4],
}

impl Stencil {
    fn apply(&self, row: ArrayView1<f64>) -> f64 {
        self.indices
            .iter()
            .zip(self.weights.iter())
            .map(|(&i, &w)| w * row[i])
            .sum()
    }
}

/// Maps (T, V) fields onto (T, P) for a fixed pressure field
#[derive(Debug, Clone)]
pub struct PressureMapper {
    stencils: Vec<Vec<Stencil>>,
    target_pressures: Vec<f64>,
    volume_count: usize,
    target: Target,
}

impl PressureMapper {
    /// Precompute interpolation stencils
    ///
    /// # Arguments
    ///
    /// * `pressures` - `P(T, V)` on increasing volumes, shape `(temperatures, volumes)`
    /// * `target_pressures` - Pressures to resample onto, same unit as `pressures`
    /// * `target` - Row evaluation backend
    ///
    /// # Errors
    ///
    /// [`V2pError::NonMonotonicPressure`] if a row does not strictly decrease,
    /// [`V2pError::PressureOutOfRange`] if a target lies outside a row's
    /// `[P(V_max), P(V_min)]`.
    pub fn new(pressures: &Array2<f64>, target_pressures: &[f64], target: Target) -> Result<Self> {
        let (n_temperatures, n_volumes) = pressures.dim();
        if n_volumes < 4 {
            return Err(V2pError::TooFewVolumes(n_volumes));
        }

        let stencils = map_rows(target, n_temperatures, |t| {
            row_stencils(t, pressures.row(t), target_pressures)
        })?;

        Ok(Self {
            stencils,
            target_pressures: target_pressures.to_vec(),
            volume_count: n_volumes,
            target,
        })
    }

    pub fn target_pressures(&self) -> &[f64] {
        &self.target_pressures
    }

    pub fn temperature_count(&self) -> usize {
        self.stencils.len()
    }

    /// Resample `field`, shape `(temperatures, volumes)`, onto the target pressures
    pub fn map(&self, field: &Array2<f64>) -> Result<Array2<f64>> {
        if field.dim() != (self.stencils.len(), self.volume_count) {
            return Err(V2pError::ShapeMismatch(format!(
                "field has shape {:?}, expected ({}, {})",
                field.dim(),
                self.stencils.len(),
                self.volume_count
            )));
        }

        let rows = map_rows(self.target, self.stencils.len(), |t| -> Result<Vec<f64>> {
            let row = field.row(t);
            Ok(self.stencils[t].iter().map(|s| s.apply(row)).collect())
        })?;
        stack_rows(rows, self.target_pressures.len()).map_err(|e| V2pError::ShapeMismatch(e.to_string()))
    }

    /// Volume at each (T, P), interpolated from the volume grid
    pub fn volumes(&self, volumes: &[f64]) -> Result<Array2<f64>> {
        if volumes.len() != self.volume_count {
            return Err(V2pError::ShapeMismatch(format!(
                "{} volumes given, expected {}",
                volumes.len(),
                self.volume_count
            )));
        }
        let broadcast = Array2::from_shape_fn((self.stencils.len(), self.volume_count), |(_, v)| volumes[v]);
        self.map(&broadcast)
    }
}

fn row_stencils(temperature_index: usize, row: ArrayView1<f64>, targets: &[f64]) -> Result<Vec<Stencil>> {
    let n = row.len();
    if let Some(v) = (1..n).find(|&v| !(row[v] < row[v - 1])) {
        return Err(V2pError::NonMonotonicPressure {
            temperature_index,
            volume_index: v,
        });
    }

    // Increasing pressure order: position k holds volume index n - 1 - k
    let increasing: Vec<f64> = row.iter().rev().copied().collect();
    let (min, max) = (increasing[0], increasing[n - 1]);

    targets
        .iter()
        .map(|&pressure| {
            if !(pressure >= min && pressure <= max) {
                return Err(V2pError::PressureOutOfRange {
                    temperature_index,
                    pressure,
                    min,
                    max,
                });
            }
            let j = find_bracket(&increasing, pressure);
            let start = j.saturating_sub(1).min(n - 4);
            let nodes = [
                increasing[start],
                increasing[start + 1],
                increasing[start + 2],
                increasing[start + 3],
            ];
            let weights = lagrange4_weights(pressure, nodes);
            let indices = [
                n - 1 - start,
                n - 2 - start,
                n - 3 - start,
                n - 4 - start,
            ];
            Ok(Stencil { indices, weights })
        })
        .collect()
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Equation-of-state refinement onto a dense volume grid
//!
//! Each temperature row of the coarse free energy is fitted once with the
//! Birch–Murnaghan fitter. The volume range `[V_min / r, V_max · r]` is then
//! widened by multiplying `r` with a fixed step until every row's fitted
//! pressure covers the requested pressure bracket, and all fits are
//! evaluated on the resulting evenly spaced grid.

use log::{debug, info};
use ndarray::{Array1, Array2};

use super::errors::{GridError, Result};
use crate::eos::{EosFit, EosFitter};
use crate::utils::math::{is_strictly_increasing, linspace};
use crate::utils::parallel::{map_rows, stack_rows};
use crate::utils::Target;

/// Default multiplicative step of the volume ratio
pub const DEFAULT_RATIO_STEP: f64 = 1.05;

/// Default largest volume ratio tried
pub const DEFAULT_MAX_RATIO: f64 = 1.45;

/// Pressure interval that every temperature row must cover, in energy per
/// volume of the fitted data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PressureBracket {
    pub min: f64,
    pub max: f64,
}

impl PressureBracket {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

/// Builds dense (T, V) fields from coarse free energies
#[derive(Debug, Clone)]
pub struct RefineGrid {
    fitter: EosFitter,
    dense_volume_count: usize,
    initial_ratio: Option<f64>,
    ratio_step: f64,
    max_ratio: f64,
    target: Target,
}

/// Free energy, pressure and bulk modulus on the dense volume grid
#[derive(Debug, Clone)]
pub struct DenseGrid {
    /// Evenly spaced increasing volumes
    pub volumes: Array1<f64>,
    /// Fitted free energy, shape `(temperatures, volumes)`
    pub free_energies: Array2<f64>,
    /// `−∂F/∂V` from the fit, same shape
    pub pressures: Array2<f64>,
    /// Isothermal bulk modulus from the fit, same shape
    pub bulk_moduli: Array2<f64>,
    /// One fit per temperature row
    pub fits: Vec<EosFit>,
    /// Volume ratio the grid was built with
    pub ratio: f64,
}

impl RefineGrid {
    pub fn new(fitter: EosFitter, dense_volume_count: usize) -> Self {
        Self {
            fitter,
            dense_volume_count,
            initial_ratio: None,
            ratio_step: DEFAULT_RATIO_STEP,
            max_ratio: DEFAULT_MAX_RATIO,
            target: Target::default(),
        }
    }

    /// Start the search from `ratio` instead of 1
    pub fn with_initial_ratio(mut self, ratio: Option<f64>) -> Self {
        self.initial_ratio = ratio;
        self
    }

    pub fn with_ratio_step(mut self, step: f64) -> Self {
        self.ratio_step = step;
        self
    }

    pub fn with_max_ratio(mut self, max_ratio: f64) -> Self {
        self.max_ratio = max_ratio;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Fit every row of `free_energies` and evaluate it on a dense grid that
    /// brackets `bracket`
    ///
    /// # Arguments
    ///
    /// * `volumes` - Strictly increasing coarse volumes
    /// * `free_energies` - Free energy, shape `(temperatures, volumes.len())`
    /// * `bracket` - Pressure interval every row must cover
    pub fn refine(
        &self,
        volumes: &[f64],
        free_energies: &Array2<f64>,
        bracket: PressureBracket,
    ) -> Result<DenseGrid> {
        self.validate(volumes, free_energies)?;

        let (n_temperatures, _) = free_energies.dim();
        info!(
            "Fitting BM{} equations of state for {} temperatures",
            self.fitter.order(),
            n_temperatures
        );

        let fits = map_rows(self.target, n_temperatures, |t| {
            let row = free_energies.row(t).to_vec();
            self.fitter
                .fit(volumes, &row)
                .map_err(|source| GridError::Eos {
                    temperature_index: t,
                    source,
                })
        })?;

        let v_min = volumes[0];
        let v_max = volumes[volumes.len() - 1];
        let ratio = self.find_ratio(&fits, v_min, v_max, bracket)?;
        debug!("Volume ratio {:.4} gives dense range [{:.4}, {:.4}]", ratio, v_min / ratio, v_max * ratio);

        let dense = linspace(v_min / ratio, v_max * ratio, self.dense_volume_count);
        let n = dense.len();
        let evaluate = |field: fn(&EosFit, f64) -> f64| -> Result<Array2<f64>> {
            let rows = map_rows(self.target, n_temperatures, |t| -> Result<Vec<f64>> {
                Ok(dense.iter().map(|&v| field(&fits[t], v)).collect())
            })?;
            stack_rows(rows, n).map_err(|e| GridError::ShapeMismatch(e.to_string()))
        };

        let free_energies = evaluate(EosFit::energy_at)?;
        let pressures = evaluate(EosFit::pressure_at)?;
        let bulk_moduli = evaluate(EosFit::bulk_modulus_at)?;

        Ok(DenseGrid {
            volumes: Array1::from(dense),
            free_energies,
            pressures,
            bulk_moduli,
            fits,
            ratio,
        })
    }

    fn validate(&self, volumes: &[f64], free_energies: &Array2<f64>) -> Result<()> {
        if free_energies.ncols() != volumes.len() {
            return Err(GridError::ShapeMismatch(format!(
                "{} volumes but free energies have {} columns",
                volumes.len(),
                free_energies.ncols()
            )));
        }
        if free_energies.nrows() == 0 {
            return Err(GridError::ShapeMismatch("no temperature rows".to_string()));
        }
        if !is_strictly_increasing(volumes) {
            return Err(GridError::ShapeMismatch(
                "volumes must be strictly increasing".to_string(),
            ));
        }
        if self.dense_volume_count < 4 {
            return Err(GridError::InvalidParameters(format!(
                "dense grid needs at least 4 volumes, got {}",
                self.dense_volume_count
            )));
        }
        if !(self.ratio_step > 1.0) {
            return Err(GridError::InvalidParameters(format!(
                "volume ratio step must exceed 1, got {}",
                self.ratio_step
            )));
        }
        if let Some(ratio) = self.initial_ratio {
            if !(ratio >= 1.0) {
                return Err(GridError::InvalidParameters(format!(
                    "initial volume ratio must be at least 1, got {}",
                    ratio
                )));
            }
        }
        Ok(())
    }

    /// Smallest ratio in the sequence `r₀ · stepᵏ` at which every fit covers
    /// the bracket
    fn find_ratio(
        &self,
        fits: &[EosFit],
        v_min: f64,
        v_max: f64,
        bracket: PressureBracket,
    ) -> Result<f64> {
        let mut ratio = self.initial_ratio.unwrap_or(1.0);
        loop {
            let uncovered = fits.iter().enumerate().find_map(|(t, fit)| {
                // Pressure falls with volume: the largest volume gives the lowest pressure
                let low = fit.pressure_at(v_max * ratio);
                let high = fit.pressure_at(v_min / ratio);
                if low <= bracket.min && high >= bracket.max {
                    None
                } else {
                    Some((t, low, high))
                }
            });

            let (temperature_index, achieved_min, achieved_max) = match uncovered {
                None => return Ok(ratio),
                Some(row) => row,
            };

            let next = ratio * self.ratio_step;
            if next > self.max_ratio * (1.0 + 1e-12) {
                return Err(GridError::GridRange {
                    temperature_index,
                    ratio,
                    max_ratio: self.max_ratio,
                    requested_min: bracket.min,
                    requested_max: bracket.max,
                    achieved_min,
                    achieved_max,
                });
            }
            debug!(
                "Volume ratio {:.4} misses the pressure bracket at temperature index {}",
                ratio, temperature_index
            );
            ratio = next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eos::eulerian_strain;
    use approx::assert_relative_eq;

    const V0: f64 = 270.0;
    const B0: f64 = 6.8e-3;

    fn coarse_volumes() -> Vec<f64> {
        (0..7).map(|i| 240.0 + 10.0 * i as f64).collect()
    }

    /// BM3 rows whose equilibrium volume grows with the row index
    fn coarse_energies(volumes: &[f64], rows: usize) -> Array2<f64> {
        Array2::from_shape_fn((rows, volumes.len()), |(t, j)| {
            let v0 = V0 * (1.0 + 0.01 * t as f64);
            let f = eulerian_strain(v0, volumes[j]);
            -10.0 + 4.5 * B0 * v0 * f * f
        })
    }

    fn refiner() -> RefineGrid {
        RefineGrid::new(EosFitter::new(3).unwrap(), 101).with_target(Target::Serial)
    }

    #[test]
    fn test_no_expansion_when_bracket_is_covered() {
        let volumes = coarse_volumes();
        let energies = coarse_energies(&volumes, 3);
        let grid = refiner()
            .refine(&volumes, &energies, PressureBracket::new(0.0, 1e-4))
            .unwrap();

        assert_eq!(grid.ratio, 1.0);
        assert_eq!(grid.volumes.len(), 101);
        assert_relative_eq!(grid.volumes[0], 240.0);
        assert_relative_eq!(grid.volumes[100], 300.0);
        assert_eq!(grid.free_energies.dim(), (3, 101));
        assert_eq!(grid.fits.len(), 3);

        // Dense values reproduce the coarse samples where the grids coincide
        assert_relative_eq!(grid.free_energies[[1, 50]], energies[[1, 3]], epsilon = 1e-9);
        for t in 0..3 {
            let row = grid.pressures.row(t);
            assert!(row.windows(2).into_iter().all(|w| w[1] < w[0]));
        }
    }

    #[test]
    fn test_ratio_expands_for_negative_pressures() {
        let volumes = coarse_volumes();
        let energies = coarse_energies(&volumes, 2);
        // At the largest coarse volume both rows only reach about -5.5e-4
        let bracket = PressureBracket::new(-8e-4, 0.0);
        let grid = refiner().refine(&volumes, &energies, bracket).unwrap();

        assert!(grid.ratio > 1.0);
        for t in 0..2 {
            let last = grid.pressures[[t, grid.volumes.len() - 1]];
            assert!(last <= bracket.min);
        }
        // The previous ratio in the sequence was not enough
        let previous = grid.ratio / DEFAULT_RATIO_STEP;
        let v_max = *volumes.last().unwrap();
        assert!(grid.fits.iter().any(|fit| fit.pressure_at(v_max * previous) > bracket.min));
    }

    #[test]
    fn test_grid_range_error() {
        let volumes = coarse_volumes();
        let energies = coarse_energies(&volumes, 2);
        let result = refiner()
            .with_max_ratio(1.1)
            .refine(&volumes, &energies, PressureBracket::new(0.0, 1.0));
        match result {
            Err(GridError::GridRange {
                max_ratio,
                requested_max,
                ..
            }) => {
                assert_eq!(max_ratio, 1.1);
                assert_eq!(requested_max, 1.0);
            }
            other => panic!("expected GridRange, got {:?}", other),
        }
    }

    #[test]
    fn test_initial_ratio_is_respected() {
        let volumes = coarse_volumes();
        let energies = coarse_energies(&volumes, 1);
        let grid = refiner()
            .with_initial_ratio(Some(1.2))
            .refine(&volumes, &energies, PressureBracket::new(0.0, 0.0))
            .unwrap();
        assert_eq!(grid.ratio, 1.2);
        assert_relative_eq!(grid.volumes[0], 200.0, max_relative = 1e-12);
        assert_relative_eq!(grid.volumes[100], 360.0, max_relative = 1e-12);
    }

    #[test]
    fn test_shape_validation() {
        let volumes = coarse_volumes();
        let energies = Array2::<f64>::zeros((2, 5));
        assert!(matches!(
            refiner().refine(&volumes, &energies, PressureBracket::new(0.0, 0.0)),
            Err(GridError::ShapeMismatch(_))
        ));

        let mut reversed = volumes.clone();
        reversed.reverse();
        let energies = coarse_energies(&volumes, 1);
        assert!(matches!(
            refiner().refine(&reversed, &energies, PressureBracket::new(0.0, 0.0)),
            Err(GridError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_eos_error_carries_temperature_index() {
        let volumes = coarse_volumes();
        let mut energies = coarse_energies(&volumes, 3);
        energies.row_mut(2).assign(&Array1::from(volumes.iter().map(|v| -1e-3 * v).collect::<Vec<_>>()));
        match refiner().refine(&volumes, &energies, PressureBracket::new(0.0, 0.0)) {
            Err(GridError::Eos { temperature_index, .. }) => assert_eq!(temperature_index, 2),
            other => panic!("expected Eos error, got {:?}", other),
        }
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Vibrational spectra and their thermodynamic sums
//!
//! A spectrum is either an explicit set of normal-mode frequencies on a
//! weighted q-point mesh, or a phonon density of states per volume. Both are
//! reduced to a per-(T, V) free energy by summing or integrating the single
//! oscillator free energy of [`super::oscillator`].

use log::warn;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use super::errors::{Result, StatMechError};
use super::oscillator::ho_free_energy;
use crate::utils::math::{is_strictly_increasing, trapezoid};
use crate::utils::parallel::{map_rows, stack_rows};
use crate::utils::{EnergyUnit, Target};

/// Default tolerance for negative frequencies, in cm⁻¹
pub const DEFAULT_FREQUENCY_TOLERANCE: f64 = 1e-2;

/// Phonon density of states at one volume
///
/// `densities` is the number of modes per unit frequency, so its integral over
/// `frequencies` is the number of modes per cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhononDos {
    /// Strictly increasing frequencies in cm⁻¹
    pub frequencies: Vec<f64>,
    /// Mode density at each frequency, in modes per cm⁻¹
    pub densities: Vec<f64>,
}

/// Vibrational spectrum over all volumes of one configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VibrationalSpectrum {
    /// Normal-mode frequencies on a weighted q-point mesh
    Modes {
        /// Weight of each q-point; normalised to unit sum before use
        q_weights: Vec<f64>,
        /// Frequencies in cm⁻¹, indexed `[volume][q-point][mode]`
        frequencies: Vec<Vec<Vec<f64>>>,
    },
    /// One density-of-states curve per volume
    Dos { curves: Vec<PhononDos> },
}

impl VibrationalSpectrum {
    /// Number of volumes the spectrum covers
    pub fn volume_count(&self) -> usize {
        match self {
            VibrationalSpectrum::Modes { frequencies, .. } => frequencies.len(),
            VibrationalSpectrum::Dos { curves } => curves.len(),
        }
    }

    /// Lowest frequency present at each volume
    ///
    /// For a DOS only bins with non-zero density count.
    pub fn lowest_frequencies(&self) -> Vec<f64> {
        match self {
            VibrationalSpectrum::Modes { frequencies, .. } => frequencies
                .iter()
                .map(|volume| {
                    volume
                        .iter()
                        .flatten()
                        .copied()
                        .fold(f64::INFINITY, f64::min)
                })
                .collect(),
            VibrationalSpectrum::Dos { curves } => curves
                .iter()
                .map(|curve| {
                    curve
                        .frequencies
                        .iter()
                        .zip(curve.densities.iter())
                        .filter(|&(_, &g)| g != 0.0)
                        .map(|(&w, _)| w)
                        .fold(f64::INFINITY, f64::min)
                })
                .collect(),
        }
    }

    /// Reorder volumes, e.g. after sorting the volume axis
    pub fn permute_volumes(&mut self, order: &[usize]) {
        match self {
            VibrationalSpectrum::Modes { frequencies, .. } => {
                *frequencies = order.iter().map(|&i| frequencies[i].clone()).collect();
            }
            VibrationalSpectrum::Dos { curves } => {
                *curves = order.iter().map(|&i| curves[i].clone()).collect();
            }
        }
    }
}

/// Evaluates vibrational thermodynamics of a spectrum on a temperature grid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatMech {
    unit: EnergyUnit,
    frequency_tolerance: f64,
    ignore_negative_frequencies: bool,
    target: Target,
}

impl StatMech {
    pub fn new(unit: EnergyUnit) -> Self {
        Self {
            unit,
            frequency_tolerance: DEFAULT_FREQUENCY_TOLERANCE,
            ignore_negative_frequencies: false,
            target: Target::default(),
        }
    }

    /// Frequencies above `-tolerance` are treated as stable
    pub fn with_frequency_tolerance(mut self, tolerance: f64) -> Self {
        self.frequency_tolerance = tolerance.abs();
        self
    }

    /// Accept unstable modes, dropping them from every sum
    pub fn with_ignore_negative_frequencies(mut self, ignore: bool) -> Self {
        self.ignore_negative_frequencies = ignore;
        self
    }

    pub fn with_target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    pub fn unit(&self) -> EnergyUnit {
        self.unit
    }

    /// Check shapes, q-point weights, DOS curves and mode stability
    pub fn validate(&self, spectrum: &VibrationalSpectrum, volume_count: usize) -> Result<()> {
        if spectrum.volume_count() != volume_count {
            return Err(StatMechError::ShapeMismatch(format!(
                "spectrum covers {} volumes, expected {}",
                spectrum.volume_count(),
                volume_count
            )));
        }

        match spectrum {
            VibrationalSpectrum::Modes {
                q_weights,
                frequencies,
            } => {
                normalized_weights(q_weights)?;
                for (v, volume) in frequencies.iter().enumerate() {
                    if volume.len() != q_weights.len() {
                        return Err(StatMechError::ShapeMismatch(format!(
                            "volume index {} has {} q-points but {} weights were given",
                            v,
                            volume.len(),
                            q_weights.len()
                        )));
                    }
                    if let Some(&w) = volume.iter().flatten().find(|w| !w.is_finite()) {
                        return Err(StatMechError::ShapeMismatch(format!(
                            "non-finite frequency {} at volume index {}",
                            w, v
                        )));
                    }
                }
            }
            VibrationalSpectrum::Dos { curves } => {
                for (v, curve) in curves.iter().enumerate() {
                    validate_dos(v, curve)?;
                }
            }
        }

        for (volume_index, lowest) in spectrum.lowest_frequencies().into_iter().enumerate() {
            if lowest < -self.frequency_tolerance {
                if self.ignore_negative_frequencies {
                    warn!(
                        "Ignoring negative frequency {:.4} cm^-1 at volume index {}",
                        lowest, volume_index
                    );
                } else {
                    return Err(StatMechError::NegativeFrequency {
                        volume_index,
                        frequency: lowest,
                        tolerance: self.frequency_tolerance,
                    });
                }
            }
        }
        Ok(())
    }

    /// Vibrational Helmholtz free energy, shape `(temperatures, volumes)`
    pub fn free_energy(&self, spectrum: &VibrationalSpectrum, temperatures: &[f64]) -> Result<Array2<f64>> {
        let n_volumes = spectrum.volume_count();
        self.validate(spectrum, n_volumes)?;
        let unit = self.unit;

        let rows = match spectrum {
            VibrationalSpectrum::Modes {
                q_weights,
                frequencies,
            } => {
                let weights = normalized_weights(q_weights)?;
                map_rows(self.target, temperatures.len(), |t| -> Result<Vec<f64>> {
                    let temperature = temperatures[t];
                    Ok(frequencies
                        .iter()
                        .map(|volume| {
                            volume
                                .iter()
                                .zip(weights.iter())
                                .map(|(modes, w)| {
                                    w * modes
                                        .iter()
                                        .map(|&omega| ho_free_energy(unit, temperature, omega))
                                        .sum::<f64>()
                                })
                                .sum()
                        })
                        .collect())
                })?
            }
            VibrationalSpectrum::Dos { curves } => {
                map_rows(self.target, temperatures.len(), |t| -> Result<Vec<f64>> {
                    let temperature = temperatures[t];
                    Ok(curves
                        .iter()
                        .map(|curve| {
                            let integrand: Vec<f64> = curve
                                .frequencies
                                .iter()
                                .zip(curve.densities.iter())
                                .map(|(&omega, &g)| g * ho_free_energy(unit, temperature, omega))
                                .collect();
                            trapezoid(&curve.frequencies, &integrand)
                        })
                        .collect())
                })?
            }
        };

        stack_rows(rows, n_volumes).map_err(|e| StatMechError::ShapeMismatch(e.to_string()))
    }
}

/// q-point weights scaled to unit sum
pub fn normalized_weights(q_weights: &[f64]) -> Result<Vec<f64>> {
    if q_weights.is_empty() {
        return Err(StatMechError::InvalidQWeights("no q-points".to_string()));
    }
    if let Some(&w) = q_weights.iter().find(|w| !(w.is_finite() && **w >= 0.0)) {
        return Err(StatMechError::InvalidQWeights(format!(
            "weight {} is negative or not finite",
            w
        )));
    }
    let total: f64 = q_weights.iter().sum();
    if !(total > 0.0) {
        return Err(StatMechError::InvalidQWeights(
            "weights sum to zero".to_string(),
        ));
    }
    Ok(q_weights.iter().map(|w| w / total).collect())
}

fn validate_dos(volume_index: usize, curve: &PhononDos) -> Result<()> {
    let invalid = |reason: String| StatMechError::InvalidDos {
        volume_index,
        reason,
    };
    if curve.frequencies.len() != curve.densities.len() {
        return Err(invalid(format!(
            "{} frequencies but {} densities",
            curve.frequencies.len(),
            curve.densities.len()
        )));
    }
    if curve.frequencies.len() < 2 {
        return Err(invalid("at least two points are needed".to_string()));
    }
    if !is_strictly_increasing(&curve.frequencies) {
        return Err(invalid("frequencies must be strictly increasing".to_string()));
    }
    if let Some(&g) = curve.densities.iter().find(|g| !(g.is_finite() && **g >= 0.0)) {
        return Err(invalid(format!("density {} is negative or not finite", g)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::math::linspace;
    use approx::assert_relative_eq;

    fn einstein_modes(omega: f64) -> VibrationalSpectrum {
        VibrationalSpectrum::Modes {
            q_weights: vec![1.0, 3.0],
            frequencies: vec![
                vec![vec![0.0, omega, omega], vec![omega, omega, omega]],
                vec![vec![0.0, 2.0 * omega, omega], vec![omega, omega, omega]],
            ],
        }
    }

    #[test]
    fn test_mode_sum_uses_normalized_weights() {
        let stat = StatMech::new(EnergyUnit::Ry).with_target(Target::Serial);
        let temperatures = [0.0, 300.0];
        let f = stat.free_energy(&einstein_modes(300.0), &temperatures).unwrap();
        assert_eq!(f.dim(), (2, 2));

        let single = |t: f64, w: f64| ho_free_energy(EnergyUnit::Ry, t, w);
        for (i, &t) in temperatures.iter().enumerate() {
            let v0 = 0.25 * 2.0 * single(t, 300.0) + 0.75 * 3.0 * single(t, 300.0);
            let v1 = 0.25 * (single(t, 600.0) + single(t, 300.0)) + 0.75 * 3.0 * single(t, 300.0);
            assert_relative_eq!(f[[i, 0]], v0, max_relative = 1e-12);
            assert_relative_eq!(f[[i, 1]], v1, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_dos_matches_equivalent_modes() {
        // A narrow box of unit area around 500 cm^-1 behaves like one mode at 500 cm^-1
        let frequencies = linspace(499.0, 501.0, 2001);
        let densities = vec![0.5; frequencies.len()];
        let dos = VibrationalSpectrum::Dos {
            curves: vec![PhononDos {
                frequencies,
                densities,
            }],
        };
        let modes = VibrationalSpectrum::Modes {
            q_weights: vec![1.0],
            frequencies: vec![vec![vec![500.0]]],
        };

        let stat = StatMech::new(EnergyUnit::Ev);
        let temperatures = [10.0, 300.0, 1000.0];
        let from_dos = stat.free_energy(&dos, &temperatures).unwrap();
        let from_modes = stat.free_energy(&modes, &temperatures).unwrap();
        for t in 0..3 {
            assert_relative_eq!(from_dos[[t, 0]], from_modes[[t, 0]], max_relative = 1e-5);
        }
    }

    #[test]
    fn test_negative_frequency_handling() {
        let spectrum = VibrationalSpectrum::Modes {
            q_weights: vec![1.0],
            frequencies: vec![vec![vec![-50.0, 200.0]], vec![vec![-0.001, 200.0]]],
        };
        let strict = StatMech::new(EnergyUnit::Ry);
        match strict.free_energy(&spectrum, &[100.0]) {
            Err(StatMechError::NegativeFrequency {
                volume_index,
                frequency,
                ..
            }) => {
                assert_eq!(volume_index, 0);
                assert_eq!(frequency, -50.0);
            }
            other => panic!("expected NegativeFrequency, got {:?}", other),
        }

        let lenient = strict.with_ignore_negative_frequencies(true);
        let f = lenient.free_energy(&spectrum, &[100.0]).unwrap();
        let expected = ho_free_energy(EnergyUnit::Ry, 100.0, 200.0);
        assert_relative_eq!(f[[0, 0]], expected, max_relative = 1e-12);
        assert_relative_eq!(f[[0, 1]], expected, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_inputs() {
        assert!(matches!(
            normalized_weights(&[1.0, -1.0]),
            Err(StatMechError::InvalidQWeights(_))
        ));
        assert!(matches!(
            normalized_weights(&[0.0, 0.0]),
            Err(StatMechError::InvalidQWeights(_))
        ));

        let stat = StatMech::new(EnergyUnit::Ry);
        let spectrum = einstein_modes(100.0);
        assert!(matches!(
            stat.validate(&spectrum, 3),
            Err(StatMechError::ShapeMismatch(_))
        ));

        let bad_dos = VibrationalSpectrum::Dos {
            curves: vec![PhononDos {
                frequencies: vec![1.0, 0.5],
                densities: vec![1.0, 1.0],
            }],
        };
        assert!(matches!(
            stat.free_energy(&bad_dos, &[100.0]),
            Err(StatMechError::InvalidDos { volume_index: 0, .. })
        ));
    }

    #[test]
    fn test_permute_volumes() {
        let mut spectrum = einstein_modes(100.0);
        spectrum.permute_volumes(&[1, 0]);
        assert_eq!(spectrum.lowest_frequencies(), vec![0.0, 0.0]);
        if let VibrationalSpectrum::Modes { frequencies, .. } = &spectrum {
            assert_eq!(frequencies[0][0][1], 200.0);
        }
    }

    #[test]
    fn test_serde_tagging() {
        let json = r#"{"kind": "modes", "q_weights": [1.0], "frequencies": [[[100.0, 200.0]]]}"#;
        let spectrum: VibrationalSpectrum = serde_json::from_str(json).unwrap();
        assert_eq!(spectrum.volume_count(), 1);
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Boltzmann aggregation of configurations
//!
//! Every variant reduces to one free energy per configuration on the
//! reference volumes, `F_i(T, V) = E_i(V) + F_vib,i(T, V)`, which are then
//! combined as
//!
//! ```text
//! F(T, V) = −k_B T ln Σᵢ gᵢ exp(−F_i(T, V) / k_B T)
//! ```
//!
//! evaluated as a log-sum-exp shifted by the smallest `F_i`. The variants
//! only differ in where `F_vib,i` comes from.

use log::{debug, info};
use ndarray::{Array2, Axis};

use super::errors::{ConfigurationError, Result};
use super::model::{Configuration, Configurations};
use crate::eos::{StrainPolynomial, DEFAULT_CONDITION_THRESHOLD};
use crate::statmech::{StatMech, VibrationalSpectrum};

/// Relative tolerance under which two volume sets are considered identical
const SAME_VOLUMES_TOLERANCE: f64 = 1e-8;

/// `−k_B T ln Σᵢ gᵢ exp(−Eᵢ / k_B T)`
///
/// At `k_B T = 0` the sum is dominated by its smallest term and the result
/// is `min Eᵢ`.
pub fn boltzmann_free_energy(energies: &[f64], degeneracies: &[f64], kt: f64) -> f64 {
    let minimum = energies.iter().copied().fold(f64::INFINITY, f64::min);
    if kt <= 0.0 {
        return minimum;
    }
    let sum: f64 = energies
        .iter()
        .zip(degeneracies.iter())
        .map(|(&e, &g)| g * (-(e - minimum) / kt).exp())
        .sum();
    minimum - kt * sum.ln()
}

/// Re-evaluate `energies` sampled at `volumes` on `reference_volumes`
///
/// Identical volume sets are returned unchanged; otherwise an order-`order`
/// polynomial in Eulerian strain is fitted and evaluated.
pub fn calibrate_on_reference(
    reference_volumes: &[f64],
    volumes: &[f64],
    energies: &[f64],
    order: usize,
    condition_threshold: f64,
) -> Result<Vec<f64>> {
    if same_volumes(reference_volumes, volumes) {
        return Ok(energies.to_vec());
    }
    let polynomial = StrainPolynomial::fit(
        volumes[0],
        volumes,
        energies,
        None,
        order,
        condition_threshold,
    )?;
    Ok(reference_volumes.iter().map(|&v| polynomial.value_at(v)).collect())
}

fn same_volumes(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b.iter())
            .all(|(x, y)| (x - y).abs() <= SAME_VOLUMES_TOLERANCE * x.abs().max(y.abs()))
}

/// Effective free energy on the reference volumes
#[derive(Debug, Clone)]
pub struct AggregatedFreeEnergy {
    /// Volumes of the first configuration
    pub volumes: Vec<f64>,
    /// Free energy, shape `(temperatures, volumes)`
    pub free_energies: Array2<f64>,
}

/// Combines configurations into one free energy per (T, V)
#[derive(Debug, Clone, Copy)]
pub struct ConfigurationAggregator {
    stat: StatMech,
    order: usize,
    condition_threshold: f64,
    static_only: bool,
}

impl ConfigurationAggregator {
    /// `order` is the polynomial order used to calibrate configurations
    /// sampled at different volumes
    pub fn new(stat: StatMech, order: usize) -> Self {
        Self {
            stat,
            order,
            condition_threshold: DEFAULT_CONDITION_THRESHOLD,
            static_only: false,
        }
    }

    /// Leave out the vibrational term entirely
    pub fn with_static_only(mut self, static_only: bool) -> Self {
        self.static_only = static_only;
        self
    }

    pub fn with_condition_threshold(mut self, condition_threshold: f64) -> Self {
        self.condition_threshold = condition_threshold;
        self
    }

    /// Free energy of `configurations` on `temperatures`
    pub fn free_energies(
        &self,
        configurations: &Configurations,
        temperatures: &[f64],
    ) -> Result<AggregatedFreeEnergy> {
        info!(
            "Computing free energies for {} configuration(s) in {} mode",
            configurations.len(),
            configurations.mode()
        );

        let reference = configurations.reference_volumes()?.to_vec();
        let free_energies = match configurations {
            Configurations::Single {
                configuration,
                spectrum,
            } => {
                configuration.validate(0)?;
                self.configuration_free_energy(configuration, spectrum, temperatures)?
            }
            Configurations::SamePhononDos {
                configurations,
                spectrum,
            } => {
                let fields = self.same_dos_fields(configurations, spectrum, &reference, temperatures)?;
                let degeneracies: Vec<f64> = configurations.iter().map(|c| c.degeneracy).collect();
                self.aggregate(&fields, &degeneracies, temperatures)
            }
            Configurations::DifferentPhononDos { members } => {
                if members.is_empty() {
                    return Err(ConfigurationError::NoConfigurations);
                }
                let mut fields = Vec::with_capacity(members.len());
                for (index, member) in members.iter().enumerate() {
                    let configuration = &member.configuration;
                    configuration.validate(index)?;
                    check_volume_count(configuration, reference.len())?;
                    let own = self.configuration_free_energy(configuration, &member.spectrum, temperatures)?;
                    fields.push(self.calibrate_field(&reference, configuration, own)?);
                }
                let degeneracies: Vec<f64> =
                    members.iter().map(|m| m.configuration.degeneracy).collect();
                self.aggregate(&fields, &degeneracies, temperatures)
            }
        };

        Ok(AggregatedFreeEnergy {
            volumes: reference,
            free_energies,
        })
    }

    /// `E(V) + F_vib(T, V)` on the configuration's own volumes
    fn configuration_free_energy(
        &self,
        configuration: &Configuration,
        spectrum: &VibrationalSpectrum,
        temperatures: &[f64],
    ) -> Result<Array2<f64>> {
        let n_volumes = configuration.volumes.len();
        let mut field = if self.static_only {
            Array2::<f64>::zeros((temperatures.len(), n_volumes))
        } else {
            self.stat.validate(spectrum, n_volumes)?;
            self.stat.free_energy(spectrum, temperatures)?
        };
        for mut row in field.axis_iter_mut(Axis(0)) {
            row.iter_mut()
                .zip(configuration.static_energies.iter())
                .for_each(|(f, &e)| *f += e);
        }
        Ok(field)
    }

    fn same_dos_fields(
        &self,
        configurations: &[Configuration],
        spectrum: &VibrationalSpectrum,
        reference: &[f64],
        temperatures: &[f64],
    ) -> Result<Vec<Array2<f64>>> {
        if configurations.is_empty() {
            return Err(ConfigurationError::NoConfigurations);
        }
        let n_volumes = reference.len();
        let vibrational = if self.static_only {
            Array2::<f64>::zeros((temperatures.len(), n_volumes))
        } else {
            self.stat.validate(spectrum, n_volumes)?;
            self.stat.free_energy(spectrum, temperatures)?
        };

        configurations
            .iter()
            .enumerate()
            .map(|(index, configuration)| {
                configuration.validate(index)?;
                check_volume_count(configuration, n_volumes)?;
                let static_energies = calibrate_on_reference(
                    reference,
                    &configuration.volumes,
                    &configuration.static_energies,
                    self.order,
                    self.condition_threshold,
                )?;
                let mut field = vibrational.clone();
                for mut row in field.axis_iter_mut(Axis(0)) {
                    row.iter_mut()
                        .zip(static_energies.iter())
                        .for_each(|(f, &e)| *f += e);
                }
                Ok(field)
            })
            .collect()
    }

    /// Move every temperature row of `field` onto the reference volumes
    fn calibrate_field(
        &self,
        reference: &[f64],
        configuration: &Configuration,
        field: Array2<f64>,
    ) -> Result<Array2<f64>> {
        if same_volumes(reference, &configuration.volumes) {
            return Ok(field);
        }
        debug!(
            "Calibrating configuration '{}' onto the reference volumes",
            configuration.name
        );
        let mut calibrated = Array2::<f64>::zeros((field.nrows(), reference.len()));
        for (row, mut out) in field.axis_iter(Axis(0)).zip(calibrated.axis_iter_mut(Axis(0))) {
            let values = calibrate_on_reference(
                reference,
                &configuration.volumes,
                &row.to_vec(),
                self.order,
                self.condition_threshold,
            )?;
            out.iter_mut().zip(values).for_each(|(o, v)| *o = v);
        }
        Ok(calibrated)
    }

    fn aggregate(&self, fields: &[Array2<f64>], degeneracies: &[f64], temperatures: &[f64]) -> Array2<f64> {
        let k = self.stat.unit().boltzmann();
        let n_volumes = fields.first().map(|f| f.ncols()).unwrap_or(0);
        let mut energies = vec![0.0; fields.len()];
        Array2::from_shape_fn((temperatures.len(), n_volumes), |(t, v)| {
            for (e, field) in energies.iter_mut().zip(fields.iter()) {
                *e = field[[t, v]];
            }
            boltzmann_free_energy(&energies, degeneracies, k * temperatures[t])
        })
    }
}

fn check_volume_count(configuration: &Configuration, expected: usize) -> Result<()> {
    if configuration.volumes.len() != expected {
        return Err(ConfigurationError::VolumeCountMismatch(format!(
            "configuration '{}' has {} volumes, the reference has {}",
            configuration.name,
            configuration.volumes.len(),
            expected
        )));
    }
    Ok(())
}

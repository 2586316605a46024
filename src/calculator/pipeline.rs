/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! The QHA pipeline
//!
//! 1. Vibrational and static energies of every configuration are aggregated
//!    into `F(T, V)` on the input volumes.
//! 2. Each temperature row is fitted with a Birch-Murnaghan EOS and evaluated
//!    on a dense volume grid wide enough for the requested pressures.
//! 3. State functions are derived on (T, V), remapped onto (T, P), and the
//!    constant-pressure response functions are formed there.
//! 4. The requested properties are sampled and converted to output units.
//!
//! Energies stay in Rydberg and pressures in Ry/bohr³ until step 4; the
//! configured [`crate::utils::EnergyUnit`] only affects reported energies.

use std::collections::BTreeMap;

use log::{debug, info};
use ndarray::Array2;

use super::errors::Result;
use super::results::{EosParameters, ThermodynamicResults, VolumeTables};
use crate::configurations::{ConfigurationAggregator, Configurations};
use crate::eos::EosFitter;
use crate::grid::{DenseGrid, PressureBracket, RefineGrid};
use crate::input::{PropertyId, QhaInput, Settings};
use crate::statmech::StatMech;
use crate::thermodynamics::{PressureFields, VolumeFields};
use crate::utils::{b3_to_a3, gpa_to_ry_b3, ry_b3_to_gpa, ry_to_j_mol, EnergyUnit};
use crate::v2p::PressureMapper;

/// Runs the full calculation for one set of [`Settings`]
#[derive(Debug, Clone, Copy)]
pub struct Calculator<'a> {
    settings: &'a Settings,
}

impl<'a> Calculator<'a> {
    /// Validate `settings` and build a calculator around them
    pub fn new(settings: &'a Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &Settings {
        self.settings
    }

    /// Compute every requested property for `input`
    pub fn run(&self, input: &QhaInput) -> Result<ThermodynamicResults> {
        let settings = self.settings;
        let temperatures = settings.temperatures();

        let configurations = Configurations::from_input(settings.mode, input)?;
        let stat = StatMech::new(EnergyUnit::Ry)
            .with_frequency_tolerance(settings.frequency_tolerance)
            .with_ignore_negative_frequencies(settings.ignore_negative_frequencies)
            .with_target(settings.target);
        let aggregated = ConfigurationAggregator::new(stat, settings.order)
            .with_static_only(settings.static_only)
            .with_condition_threshold(settings.condition_threshold)
            .free_energies(&configurations, &temperatures)?;

        let fitter = EosFitter::new(settings.order)?
            .with_max_iterations(settings.eos_max_iterations)
            .with_tolerance(settings.eos_tolerance)
            .with_condition_threshold(settings.condition_threshold);
        let (low, high) = settings.pressure_bracket();
        let bracket = PressureBracket::new(gpa_to_ry_b3(low), gpa_to_ry_b3(high));
        let dense = RefineGrid::new(fitter, settings.dense_volume_count())
            .with_initial_ratio(settings.volume_ratio)
            .with_ratio_step(settings.volume_ratio_step)
            .with_max_ratio(settings.max_volume_ratio)
            .with_target(settings.target)
            .refine(&aggregated.volumes, &aggregated.free_energies, bracket)?;
        info!(
            "Dense grid of {} volumes spans [{:.4}, {:.4}] bohr^3 (ratio {:.4})",
            dense.volumes.len(),
            dense.volumes[0],
            dense.volumes[dense.volumes.len() - 1],
            dense.ratio
        );

        let volume_fields = VolumeFields::from_dense(
            &temperatures,
            dense.volumes.view(),
            dense.free_energies.clone(),
            dense.pressures.clone(),
            dense.bulk_moduli.clone(),
        )?;

        let desired: Vec<f64> = settings
            .desired_pressures()
            .iter()
            .map(|&p| gpa_to_ry_b3(p))
            .collect();
        let mapper = PressureMapper::new(&volume_fields.pressure, &desired, settings.target)?;
        let dense_volumes = dense.volumes.to_vec();
        let fields = PressureFields::from_volume_fields(&volume_fields, &temperatures, &dense_volumes, &mapper)?;
        info!("Mapped thermodynamic fields onto {} pressures", desired.len());

        Ok(self.sample(input.formula_unit_number, &temperatures, &dense, &volume_fields, &fields))
    }

    /// Pick the sampled rows and columns and convert to output units
    fn sample(
        &self,
        formula_units: usize,
        temperatures: &[f64],
        dense: &DenseGrid,
        volume_fields: &VolumeFields,
        fields: &PressureFields,
    ) -> ThermodynamicResults {
        let settings = self.settings;
        let unit = settings.energy_unit;

        // The padding rows past nt only serve the temperature derivatives
        let rows: Vec<usize> = (0..settings.nt).step_by(settings.temperature_stride()).collect();
        let columns: Vec<usize> = (0..settings.ntv).step_by(settings.pressure_stride()).collect();
        debug!(
            "Sampling {} temperatures and {} pressures",
            rows.len(),
            columns.len()
        );

        let pick = |field: &Array2<f64>, convert: &dyn Fn(f64) -> f64| {
            Array2::from_shape_fn((rows.len(), columns.len()), |(i, j)| {
                convert(field[[rows[i], columns[j]]])
            })
        };
        let energy = |x: f64| unit.from_ry(x);
        let per_mole = |x: f64| ry_to_j_mol(x) / formula_units as f64;
        let same = |x: f64| x;

        let mut tables = BTreeMap::new();
        for &property in &settings.calculate {
            let table = match property {
                PropertyId::F => pick(&fields.free_energy, &energy),
                PropertyId::G => pick(&fields.gibbs_free_energy, &energy),
                PropertyId::H => pick(&fields.enthalpy, &energy),
                PropertyId::U => pick(&fields.internal_energy, &energy),
                PropertyId::V => pick(&fields.volume, &b3_to_a3),
                PropertyId::Cv => pick(&fields.heat_capacity_v, &per_mole),
                PropertyId::Cp => pick(&fields.heat_capacity_p, &per_mole),
                PropertyId::Bt => pick(&fields.bulk_modulus, &ry_b3_to_gpa),
                PropertyId::Btp => pick(&fields.bulk_modulus_derivative, &same),
                PropertyId::Bs => pick(&fields.adiabatic_bulk_modulus, &ry_b3_to_gpa),
                PropertyId::Alpha => pick(&fields.thermal_expansion, &same),
                PropertyId::Gamma => pick(&fields.gruneisen, &same),
            };
            tables.insert(property, table);
        }

        let eos = rows
            .iter()
            .map(|&t| {
                let fit = &dense.fits[t];
                EosParameters {
                    temperature: temperatures[t],
                    equilibrium_volume: b3_to_a3(fit.equilibrium_volume()),
                    equilibrium_energy: unit.from_ry(fit.equilibrium_energy()),
                    bulk_modulus: ry_b3_to_gpa(fit.bulk_modulus()),
                    bulk_modulus_derivative: fit.bulk_modulus_derivative(),
                }
            })
            .collect();

        let on_rows = |field: &Array2<f64>, convert: &dyn Fn(f64) -> f64| {
            Array2::from_shape_fn((rows.len(), field.ncols()), |(i, j)| convert(field[[rows[i], j]]))
        };
        let volume_tables = VolumeTables {
            volumes_bohr3: dense.volumes.to_vec(),
            volumes: dense.volumes.iter().map(|&v| b3_to_a3(v)).collect(),
            free_energy: on_rows(&volume_fields.free_energy, &energy),
            pressure: on_rows(&volume_fields.pressure, &ry_b3_to_gpa),
            entropy: on_rows(&volume_fields.entropy, &energy),
        };

        let desired = settings.desired_pressures();
        ThermodynamicResults::new(
            rows.iter().map(|&t| temperatures[t]).collect(),
            columns.iter().map(|&p| desired[p]).collect(),
            unit,
            dense.ratio,
            eos,
            tables,
            volume_tables,
        )
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! State and response functions on (T, V) and (T, P) grids
//!
//! Temperature derivatives are taken along axis 0 and pressure derivatives
//! along axis 1 with [`gradient_along`], so the edge rows and columns are
//! only first-order accurate.

use log::debug;
use ndarray::{Array2, ArrayView1, Axis, Zip};

use super::errors::{Result, ThermodynamicsError};
use crate::utils::math::gradient_along;
use crate::v2p::PressureMapper;

/// Heat capacities below this fraction of the largest one count as zero when
/// forming the Grüneisen parameter
const VANISHING_HEAT_CAPACITY: f64 = 1e-12;

/// Thermodynamic fields on the (T, V) grid, in Rydberg and bohr³
#[derive(Debug, Clone, PartialEq)]
pub struct VolumeFields {
    pub free_energy: Array2<f64>,
    pub pressure: Array2<f64>,
    pub bulk_modulus: Array2<f64>,
    /// `S = −∂F/∂T`
    pub entropy: Array2<f64>,
    /// `U = F + TS`
    pub internal_energy: Array2<f64>,
    /// `H = U + PV`
    pub enthalpy: Array2<f64>,
    /// `G = F + PV`
    pub gibbs_free_energy: Array2<f64>,
    /// `C_V = ∂U/∂T`
    pub heat_capacity_v: Array2<f64>,
}

impl VolumeFields {
    /// Derive the state functions from `F`, `P` and `B_T` on a dense grid
    ///
    /// All fields have shape `(temperatures.len(), volumes.len())`.
    pub fn from_dense(
        temperatures: &[f64],
        volumes: ArrayView1<f64>,
        free_energy: Array2<f64>,
        pressure: Array2<f64>,
        bulk_modulus: Array2<f64>,
    ) -> Result<Self> {
        let shape = (temperatures.len(), volumes.len());
        for (name, field) in [
            ("free energy", &free_energy),
            ("pressure", &pressure),
            ("bulk modulus", &bulk_modulus),
        ] {
            if field.dim() != shape {
                return Err(ThermodynamicsError::ShapeMismatch(format!(
                    "{} has shape {:?}, expected {:?}",
                    name,
                    field.dim(),
                    shape
                )));
            }
        }

        let t_axis = ArrayView1::from(temperatures);
        let entropy = -gradient_along(t_axis, &free_energy, Axis(0))?;

        let mut internal_energy = free_energy.clone();
        Zip::indexed(&mut internal_energy)
            .and(&entropy)
            .for_each(|(t, _), u, &s| *u += temperatures[t] * s);

        let pv = Array2::from_shape_fn(shape, |(t, v)| pressure[[t, v]] * volumes[v]);
        let enthalpy = &internal_energy + &pv;
        let gibbs_free_energy = &free_energy + &pv;
        let heat_capacity_v = gradient_along(t_axis, &internal_energy, Axis(0))?;

        Ok(Self {
            free_energy,
            pressure,
            bulk_modulus,
            entropy,
            internal_energy,
            enthalpy,
            gibbs_free_energy,
            heat_capacity_v,
        })
    }
}

/// Thermodynamic fields on the (T, P) grid
#[derive(Debug, Clone, PartialEq)]
pub struct PressureFields {
    pub free_energy: Array2<f64>,
    pub gibbs_free_energy: Array2<f64>,
    pub enthalpy: Array2<f64>,
    pub internal_energy: Array2<f64>,
    pub heat_capacity_v: Array2<f64>,
    pub bulk_modulus: Array2<f64>,
    pub volume: Array2<f64>,
    /// `B_T' = ∂B_T/∂P`
    pub bulk_modulus_derivative: Array2<f64>,
    /// `α = (∂V/∂T)_P / V`
    pub thermal_expansion: Array2<f64>,
    /// `γ = α B_T V / C_V`
    pub gruneisen: Array2<f64>,
    /// `B_S = B_T (1 + αγT)`
    pub adiabatic_bulk_modulus: Array2<f64>,
    /// `C_P = C_V (1 + αγT)`
    pub heat_capacity_p: Array2<f64>,
}

impl PressureFields {
    /// Remap `fields` with `mapper` and derive the constant-pressure response
    /// functions
    ///
    /// `temperatures` and `volumes` are the axes of `fields`; the pressure
    /// axis is `mapper.target_pressures()`.
    pub fn from_volume_fields(
        fields: &VolumeFields,
        temperatures: &[f64],
        volumes: &[f64],
        mapper: &PressureMapper,
    ) -> Result<Self> {
        let free_energy = mapper.map(&fields.free_energy)?;
        let gibbs_free_energy = mapper.map(&fields.gibbs_free_energy)?;
        let enthalpy = mapper.map(&fields.enthalpy)?;
        let internal_energy = mapper.map(&fields.internal_energy)?;
        let heat_capacity_v = mapper.map(&fields.heat_capacity_v)?;
        let bulk_modulus = mapper.map(&fields.bulk_modulus)?;
        let volume = mapper.volumes(volumes)?;

        let p_axis = ArrayView1::from(mapper.target_pressures());
        let t_axis = ArrayView1::from(temperatures);
        let bulk_modulus_derivative = gradient_along(p_axis, &bulk_modulus, Axis(1))?;
        let thermal_expansion = gradient_along(t_axis, &volume, Axis(0))? / &volume;

        let cv_floor = VANISHING_HEAT_CAPACITY
            * heat_capacity_v
                .iter()
                .fold(0.0_f64, |acc, &c| acc.max(c.abs()));
        let mut gruneisen = Array2::<f64>::zeros(volume.raw_dim());
        Zip::indexed(&mut gruneisen)
            .and(&thermal_expansion)
            .and(&bulk_modulus)
            .and(&volume)
            .and(&heat_capacity_v)
            .for_each(|(t, _), gamma, &alpha, &b, &v, &cv| {
                if temperatures[t] > 0.0 && cv.abs() > cv_floor {
                    *gamma = alpha * b * v / cv;
                }
            });
        debug!(
            "Derived constant-pressure response on a {}x{} grid",
            volume.nrows(),
            volume.ncols()
        );

        let mut factor = &thermal_expansion * &gruneisen;
        Zip::indexed(&mut factor).for_each(|(t, _), f| *f = 1.0 + *f * temperatures[t]);
        let adiabatic_bulk_modulus = &bulk_modulus * &factor;
        let heat_capacity_p = &heat_capacity_v * &factor;

        Ok(Self {
            free_energy,
            gibbs_free_energy,
            enthalpy,
            internal_energy,
            heat_capacity_v,
            bulk_modulus,
            volume,
            bulk_modulus_derivative,
            thermal_expansion,
            gruneisen,
            adiabatic_bulk_modulus,
            heat_capacity_p,
        })
    }
}

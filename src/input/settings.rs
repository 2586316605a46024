/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Run settings
//!
//! A [`Settings`] value is built once per run, validated, and then passed by
//! reference to every stage. Only the grid sizes and the calculation mode are
//! required; everything else falls back to the defaults below.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::{InputError, Result};
use crate::configurations::CalculationMode;
use crate::eos::{DEFAULT_CONDITION_THRESHOLD, DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE};
use crate::grid::{DEFAULT_MAX_RATIO, DEFAULT_RATIO_STEP};
use crate::statmech::DEFAULT_FREQUENCY_TOLERANCE;
use crate::utils::math::arange;
use crate::utils::{EnergyUnit, Target};

/// Smallest dense volume grid used when `ntv` is smaller
const MIN_DENSE_VOLUME_COUNT: usize = 201;

/// Relative slack when checking that sample intervals are multiples of steps
const STRIDE_TOLERANCE: f64 = 1e-9;

/// Properties that can be reported on the (T, P) grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PropertyId {
    F,
    G,
    H,
    U,
    V,
    Cv,
    Cp,
    Bt,
    Btp,
    Bs,
    #[serde(rename = "alpha")]
    Alpha,
    #[serde(rename = "gamma")]
    Gamma,
}

impl PropertyId {
    pub const ALL: [PropertyId; 12] = [
        PropertyId::F,
        PropertyId::G,
        PropertyId::H,
        PropertyId::U,
        PropertyId::V,
        PropertyId::Cv,
        PropertyId::Cp,
        PropertyId::Bt,
        PropertyId::Btp,
        PropertyId::Bs,
        PropertyId::Alpha,
        PropertyId::Gamma,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PropertyId::F => "F",
            PropertyId::G => "G",
            PropertyId::H => "H",
            PropertyId::U => "U",
            PropertyId::V => "V",
            PropertyId::Cv => "Cv",
            PropertyId::Cp => "Cp",
            PropertyId::Bt => "Bt",
            PropertyId::Btp => "Btp",
            PropertyId::Bs => "Bs",
            PropertyId::Alpha => "alpha",
            PropertyId::Gamma => "gamma",
        }
    }
}

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for PropertyId {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self> {
        PropertyId::ALL
            .iter()
            .copied()
            .find(|p| p.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| InputError::InvalidSettings(format!("unknown property '{}'", s)))
    }
}

fn default_order() -> usize {
    3
}

fn default_p_min_modifier() -> f64 {
    1.0
}

fn default_dt_sample() -> f64 {
    10.0
}

fn default_delta_p() -> f64 {
    0.1
}

fn default_delta_p_sample() -> f64 {
    1.0
}

fn default_volume_ratio_step() -> f64 {
    DEFAULT_RATIO_STEP
}

fn default_max_volume_ratio() -> f64 {
    DEFAULT_MAX_RATIO
}

fn default_frequency_tolerance() -> f64 {
    DEFAULT_FREQUENCY_TOLERANCE
}

fn default_eos_max_iterations() -> usize {
    DEFAULT_MAX_ITERATIONS
}

fn default_eos_tolerance() -> f64 {
    DEFAULT_TOLERANCE
}

fn default_condition_threshold() -> f64 {
    DEFAULT_CONDITION_THRESHOLD
}

fn default_calculate() -> Vec<PropertyId> {
    vec![PropertyId::F, PropertyId::G, PropertyId::V, PropertyId::Bt]
}

/// Settings of one QHA run
///
/// Pressures are in GPa, temperatures in kelvin.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    /// Number of reported temperatures
    pub nt: usize,
    /// Temperature step
    pub dt: f64,
    /// Interval between sampled temperatures in the output tables
    #[serde(default = "default_dt_sample")]
    pub dt_sample: f64,

    /// Lowest desired pressure
    pub p_min: f64,
    /// Number of desired pressures
    pub ntv: usize,
    /// Pressure step
    #[serde(default = "default_delta_p")]
    pub delta_p: f64,
    /// Interval between sampled pressures in the output tables
    #[serde(default = "default_delta_p_sample")]
    pub delta_p_sample: f64,
    /// Extra margin below `p_min` the dense volume grid must reach
    #[serde(default = "default_p_min_modifier")]
    pub p_min_modifier: f64,

    pub mode: CalculationMode,
    /// Unit of reported energies; input energies are always Rydberg
    #[serde(default)]
    pub energy_unit: EnergyUnit,
    /// Birch-Murnaghan order, 3, 4 or 5
    #[serde(default = "default_order")]
    pub order: usize,
    /// Skip the vibrational contribution
    #[serde(default)]
    pub static_only: bool,
    #[serde(default)]
    pub target: Target,

    /// Starting volume expansion ratio; adaptive from 1.0 when absent
    #[serde(default)]
    pub volume_ratio: Option<f64>,
    #[serde(default = "default_volume_ratio_step")]
    pub volume_ratio_step: f64,
    #[serde(default = "default_max_volume_ratio")]
    pub max_volume_ratio: f64,
    /// Number of volumes in the dense grid; `max(ntv, 201)` when absent
    #[serde(default)]
    pub dense_volume_count: Option<usize>,

    /// Tolerance for negative frequencies in cm⁻¹
    #[serde(default = "default_frequency_tolerance")]
    pub frequency_tolerance: f64,
    #[serde(default)]
    pub ignore_negative_frequencies: bool,

    #[serde(default = "default_eos_max_iterations")]
    pub eos_max_iterations: usize,
    #[serde(default = "default_eos_tolerance")]
    pub eos_tolerance: f64,
    #[serde(default = "default_condition_threshold")]
    pub condition_threshold: f64,

    /// Properties to report
    #[serde(default = "default_calculate")]
    pub calculate: Vec<PropertyId>,
}

impl Settings {
    /// Settings with every optional field at its default
    pub fn new(nt: usize, dt: f64, p_min: f64, ntv: usize, mode: CalculationMode) -> Self {
        Self {
            nt,
            dt,
            dt_sample: default_dt_sample(),
            p_min,
            ntv,
            delta_p: default_delta_p(),
            delta_p_sample: default_delta_p_sample(),
            p_min_modifier: default_p_min_modifier(),
            mode,
            energy_unit: EnergyUnit::default(),
            order: default_order(),
            static_only: false,
            target: Target::default(),
            volume_ratio: None,
            volume_ratio_step: default_volume_ratio_step(),
            max_volume_ratio: default_max_volume_ratio(),
            dense_volume_count: None,
            frequency_tolerance: default_frequency_tolerance(),
            ignore_negative_frequencies: false,
            eos_max_iterations: default_eos_max_iterations(),
            eos_tolerance: default_eos_tolerance(),
            condition_threshold: default_condition_threshold(),
            calculate: default_calculate(),
        }
    }

    /// Parse and validate settings from a JSON document
    pub fn from_json_str(json: &str) -> Result<Self> {
        let settings: Settings = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Read and validate settings from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        let invalid = |message: String| Err(InputError::InvalidSettings(message));

        if self.nt == 0 {
            return invalid("nt must be positive".to_string());
        }
        if self.ntv < 2 {
            return invalid(format!("ntv must be at least 2, got {}", self.ntv));
        }
        for (name, value) in [
            ("dt", self.dt),
            ("dt_sample", self.dt_sample),
            ("delta_p", self.delta_p),
            ("delta_p_sample", self.delta_p_sample),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return invalid(format!("{} must be positive, got {}", name, value));
            }
        }
        if !self.p_min.is_finite() || !(self.p_min_modifier.is_finite() && self.p_min_modifier >= 0.0) {
            return invalid("p_min and a non-negative p_min_modifier are required".to_string());
        }
        if !(3..=5).contains(&self.order) {
            return invalid(format!("order must be 3, 4 or 5, got {}", self.order));
        }
        stride(self.dt_sample, self.dt, "dt_sample", "dt")?;
        stride(self.delta_p_sample, self.delta_p, "delta_p_sample", "delta_p")?;

        if let Some(ratio) = self.volume_ratio {
            if !(ratio >= 1.0 && ratio <= self.max_volume_ratio) {
                return invalid(format!(
                    "volume_ratio must lie in [1, {}], got {}",
                    self.max_volume_ratio, ratio
                ));
            }
        }
        if !(self.volume_ratio_step > 1.0) {
            return invalid(format!(
                "volume_ratio_step must exceed 1, got {}",
                self.volume_ratio_step
            ));
        }
        if !(self.max_volume_ratio >= 1.0) {
            return invalid(format!(
                "max_volume_ratio must be at least 1, got {}",
                self.max_volume_ratio
            ));
        }
        if self.dense_volume_count() < 4 {
            return invalid("dense_volume_count must be at least 4".to_string());
        }
        if !(self.eos_tolerance > 0.0) || self.eos_max_iterations == 0 {
            return invalid("EOS refinement needs a positive tolerance and iteration cap".to_string());
        }
        if !(self.condition_threshold > 1.0) {
            return invalid(format!(
                "condition_threshold must exceed 1, got {}",
                self.condition_threshold
            ));
        }
        if self.calculate.is_empty() {
            return invalid("calculate must name at least one property".to_string());
        }
        Ok(())
    }

    /// Temperature grid, including four rows of padding past `nt`
    pub fn temperatures(&self) -> Vec<f64> {
        arange(0.0, self.nt + 4, self.dt)
    }

    /// Row stride between sampled temperatures
    pub fn temperature_stride(&self) -> usize {
        (self.dt_sample / self.dt).round().max(1.0) as usize
    }

    /// Desired pressures in GPa
    pub fn desired_pressures(&self) -> Vec<f64> {
        arange(self.p_min, self.ntv, self.delta_p)
    }

    /// Column stride between sampled pressures
    pub fn pressure_stride(&self) -> usize {
        (self.delta_p_sample / self.delta_p).round().max(1.0) as usize
    }

    /// Pressure interval in GPa the dense volume grid must cover
    pub fn pressure_bracket(&self) -> (f64, f64) {
        let p_max = self.p_min + self.delta_p * (self.ntv.saturating_sub(1)) as f64;
        (self.p_min - self.p_min_modifier, p_max)
    }

    pub fn dense_volume_count(&self) -> usize {
        self.dense_volume_count
            .unwrap_or_else(|| self.ntv.max(MIN_DENSE_VOLUME_COUNT))
    }
}

fn stride(interval: f64, step: f64, interval_name: &str, step_name: &str) -> Result<()> {
    let ratio = interval / step;
    if ratio.round() < 1.0 || (ratio - ratio.round()).abs() > STRIDE_TOLERANCE * ratio {
        return Err(InputError::InvalidSettings(format!(
            "{} ({}) must be a positive integer multiple of {} ({})",
            interval_name, interval, step_name, step
        )));
    }
    Ok(())
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use approx::assert_relative_eq;
use ndarray::Array2;
use qha_rs::eos::EosFitter;
use qha_rs::utils::math::linspace;
use qha_rs::utils::Target;
use qha_rs::v2p::{PressureMapper, V2pError};

/// Pressure and bulk modulus from BM3 fits whose equilibrium volume grows
/// with temperature
fn fitted_fields(volumes: &[f64], temperatures: &[f64]) -> (Array2<f64>, Array2<f64>) {
    let coarse = linspace(240.0, 300.0, 9);
    let fitter = EosFitter::new(3).unwrap();
    let fits: Vec<_> = temperatures
        .iter()
        .map(|&t| {
            let v0 = 270.0 * (1.0 + 2e-5 * t);
            let energies: Vec<f64> = coarse
                .iter()
                .map(|&v| {
                    let x = (v0 / v).powf(2.0 / 3.0) - 1.0;
                    9.0 * v0 * 6.8e-3 / 16.0 * (x.powi(3) * 4.5 + x.powi(2) * (6.0 - 4.0 * (x + 1.0)))
                })
                .collect();
            fitter.fit(&coarse, &energies).unwrap()
        })
        .collect();

    let shape = (temperatures.len(), volumes.len());
    let pressures = Array2::from_shape_fn(shape, |(t, v)| fits[t].pressure_at(volumes[v]));
    let bulk = Array2::from_shape_fn(shape, |(t, v)| fits[t].bulk_modulus_at(volumes[v]));
    (pressures, bulk)
}

#[test]
fn test_equilibrium_volume_at_zero_pressure() {
    let volumes = linspace(230.0, 320.0, 301);
    let temperatures = [0.0, 300.0, 600.0];
    let (pressures, _) = fitted_fields(&volumes, &temperatures);

    let mapper = PressureMapper::new(&pressures, &[0.0], Target::Parallel).unwrap();
    let v = mapper.volumes(&volumes).unwrap();
    for (t, &temperature) in temperatures.iter().enumerate() {
        assert_relative_eq!(v[[t, 0]], 270.0 * (1.0 + 2e-5 * temperature), max_relative = 1e-8);
    }
}

#[test]
fn test_bulk_modulus_follows_pressure() {
    let volumes = linspace(230.0, 320.0, 301);
    let (pressures, bulk) = fitted_fields(&volumes, &[0.0]);
    let targets = linspace(0.0, 5e-4, 6);
    let mapper = PressureMapper::new(&pressures, &targets, Target::Serial).unwrap();
    let mapped = mapper.map(&bulk).unwrap();

    // BM3 with B' = 4.5: B grows by roughly B' per unit pressure near V0
    for k in 1..targets.len() {
        let slope = (mapped[[0, k]] - mapped[[0, k - 1]]) / (targets[k] - targets[k - 1]);
        assert!(slope > 3.5 && slope < 5.0, "slope {}", slope);
    }
    assert_relative_eq!(mapped[[0, 0]], 6.8e-3, max_relative = 1e-6);
}

#[test]
fn test_pressure_outside_bracket_reports_row() {
    let volumes = linspace(250.0, 290.0, 41);
    let (pressures, _) = fitted_fields(&volumes, &[0.0, 900.0]);
    // Low end of the hottest row sits above this pressure
    let low = pressures[[0, volumes.len() - 1]];
    match PressureMapper::new(&pressures, &[low], Target::Serial) {
        Err(V2pError::PressureOutOfRange {
            temperature_index, ..
        }) => assert_eq!(temperature_index, 1),
        other => panic!("expected PressureOutOfRange, got {:?}", other.map(|_| ())),
    }
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use ndarray::Array2;
use qha_rs::eos::EosFitter;
use qha_rs::statmech::{StatMech, VibrationalSpectrum};
use qha_rs::utils::{EnergyUnit, Target};
use qha_rs::v2p::PressureMapper;

fn spectrum(volumes: usize, q_points: usize, modes: usize) -> VibrationalSpectrum {
    VibrationalSpectrum::Modes {
        q_weights: vec![1.0; q_points],
        frequencies: (0..volumes)
            .map(|v| {
                (0..q_points)
                    .map(|q| {
                        (0..modes)
                            .map(|m| 20.0 + 10.0 * m as f64 + q as f64 - v as f64)
                            .collect()
                    })
                    .collect()
            })
            .collect(),
    }
}

fn statmech_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("Vibrational Free Energy");
    let spectrum = spectrum(10, 64, 30);
    let temperatures: Vec<f64> = (0..200).map(|t| t as f64 * 5.0).collect();

    for (name, target) in [("serial", Target::Serial), ("parallel", Target::Parallel)] {
        let stat = StatMech::new(EnergyUnit::Ry).with_target(target);
        group.bench_function(name, |b| {
            b.iter(|| black_box(stat.free_energy(black_box(&spectrum), &temperatures)))
        });
    }

    group.finish();
}

fn eos_benchmark(c: &mut Criterion) {
    let volumes: Vec<f64> = (0..12).map(|i| 240.0 + 5.0 * i as f64).collect();
    let energies: Vec<f64> = volumes
        .iter()
        .map(|&v| {
            let f = (270.0 / v).powf(2.0 / 3.0) / 2.0 - 0.5;
            -20.0 + 4.5 * 6.8e-3 * 270.0 * f * f * (1.0 + 0.5 * f)
        })
        .collect();

    let mut group = c.benchmark_group("Birch-Murnaghan Fit");
    for order in [3, 4, 5] {
        let fitter = EosFitter::new(order).unwrap();
        group.bench_function(format!("BM{}", order), |b| {
            b.iter(|| black_box(fitter.fit(black_box(&volumes), black_box(&energies))))
        });
    }
    group.finish();
}

fn v2p_benchmark(c: &mut Criterion) {
    let volumes: Vec<f64> = (0..201).map(|i| 200.0 + 0.5 * i as f64).collect();
    let pressures = Array2::from_shape_fn((204, volumes.len()), |(t, v)| {
        (1.0 + 1e-4 * t as f64) * 1e3 / volumes[v] - 3.0
    });
    let targets: Vec<f64> = (0..101).map(|p| 1.0 + 0.01 * p as f64).collect();
    let field = Array2::from_shape_fn(pressures.dim(), |(t, v)| t as f64 + volumes[v]);

    let mut group = c.benchmark_group("Volume To Pressure");
    for (name, target) in [("serial", Target::Serial), ("parallel", Target::Parallel)] {
        group.bench_function(format!("stencils_{}", name), |b| {
            b.iter(|| black_box(PressureMapper::new(black_box(&pressures), &targets, target)))
        });
    }

    let mapper = PressureMapper::new(&pressures, &targets, Target::Serial).unwrap();
    group.bench_function("map", |b| b.iter(|| black_box(mapper.map(black_box(&field)))));
    group.finish();
}

criterion_group!(benches, statmech_benchmark, eos_benchmark, v2p_benchmark);
criterion_main!(benches);

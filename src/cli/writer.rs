/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Whitespace-separated result tables

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use ndarray::Array2;

use crate::calculator::ThermodynamicResults;
use crate::input::PropertyId;
use crate::utils::a3_to_b3;

const TP_AXES: &str = "T(K)\\P(GPa)";
const TV_AXES: &str = "T(K)\\V(A^3)";

/// Write `table` with temperatures as rows and `columns` (pressures or
/// volumes, named by `axes`) as columns
pub fn write_table<W: Write>(
    writer: &mut W,
    title: &str,
    axes: &str,
    temperatures: &[f64],
    columns: &[f64],
    table: &Array2<f64>,
) -> io::Result<()> {
    writeln!(writer, "# {}", title)?;
    write!(writer, "{:>10}", axes)?;
    for c in columns {
        write!(writer, " {:>20.6}", c)?;
    }
    writeln!(writer)?;
    for (row, t) in table.rows().into_iter().zip(temperatures) {
        write!(writer, "{:>10.2}", t)?;
        for value in row {
            write!(writer, " {:>20.12e}", value)?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Write the per-temperature EOS parameters and the chosen volume ratio
pub fn write_eos_parameters<W: Write>(writer: &mut W, results: &ThermodynamicResults) -> io::Result<()> {
    writeln!(writer, "# volume ratio {:.6}", results.volume_ratio)?;
    writeln!(
        writer,
        "{:>10} {:>20} {:>20} {:>20} {:>20}",
        "T(K)",
        "V0(A^3)",
        format!("E0({})", results.energy_unit),
        "B0(GPa)",
        "B0'"
    )?;
    for eos in &results.eos {
        writeln!(
            writer,
            "{:>10.2} {:>20.10} {:>20.12e} {:>20.10} {:>20.10}",
            eos.temperature,
            eos.equilibrium_volume,
            eos.equilibrium_energy,
            eos.bulk_modulus,
            eos.bulk_modulus_derivative
        )?;
    }
    Ok(())
}

/// Write the dense volume grid in bohr³ and Å³
pub fn write_dense_volumes<W: Write>(writer: &mut W, results: &ThermodynamicResults) -> io::Result<()> {
    let grid = &results.volume_tables;
    writeln!(writer, "{:>20} {:>20}", "V(bohr^3)", "V(A^3)")?;
    for (bohr, angstrom) in grid.volumes_bohr3.iter().zip(grid.volumes.iter()) {
        writeln!(writer, "{:>20.10} {:>20.10}", bohr, angstrom)?;
    }
    Ok(())
}

fn write_file(
    directory: &Path,
    name: &str,
    written: &mut Vec<PathBuf>,
    body: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> io::Result<()> {
    let path = directory.join(name);
    let mut writer = BufWriter::new(File::create(&path)?);
    body(&mut writer)?;
    writer.flush()?;
    written.push(path);
    Ok(())
}

/// Write every table of `results` into `directory`, returning the file paths
pub fn write_results(results: &ThermodynamicResults, directory: &Path) -> io::Result<Vec<PathBuf>> {
    fs::create_dir_all(directory)?;
    let mut written = Vec::new();
    let (temperatures, pressures) = (&results.temperatures, &results.pressures);

    for (property, table) in results.tables() {
        let name = format!("{}_tp.txt", property.name().to_lowercase());
        let title = format!("{} [{}]", property, results.unit_label(property));
        write_file(directory, &name, &mut written, |w| {
            write_table(w, &title, TP_AXES, temperatures, pressures, table)
        })?;
    }
    if let Some(volume) = results.get(PropertyId::V) {
        let bohr = volume.mapv(a3_to_b3);
        write_file(directory, "v_bohr3_tp.txt", &mut written, |w| {
            write_table(w, "V [bohr^3]", TP_AXES, temperatures, pressures, &bohr)
        })?;
    }

    let grid = &results.volume_tables;
    let energy = results.energy_unit;
    let volume_tables = [
        ("f_tv.txt", format!("F(T,V) [{}]", energy), &grid.free_energy),
        ("p_tv.txt", "P(T,V) [GPa]".to_string(), &grid.pressure),
        ("s_tv.txt", format!("S(T,V) [{}/K]", energy), &grid.entropy),
    ];
    for (name, title, table) in volume_tables {
        write_file(directory, name, &mut written, |w| {
            write_table(w, &title, TV_AXES, temperatures, &grid.volumes, table)
        })?;
    }
    write_file(directory, "dense_volumes.txt", &mut written, |w| {
        write_dense_volumes(w, results)
    })?;

    write_file(directory, "eos_parameters.txt", &mut written, |w| {
        write_eos_parameters(w, results)
    })?;

    Ok(written)
}

/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Reader for plain-text phonon input files
//!
//! The format is line oriented:
//!
//! ```text
//! # comment
//! nv nq nmodes nformula
//! P= 0.0 V= 270.0 E= -120.5
//! 0.0 0.0 0.0          <- q-point, followed by nmodes frequency lines
//! 120.3
//! ...
//! weight
//! 0.0 0.0 0.0 0.125    <- one line per q-point, weight last
//! ```
//!
//! The `P= V= E=` block and its q-points repeat for every volume. Energies
//! are Rydberg and volumes bohr³.
//!
//! Multi-configuration datasets pair a degeneracy table
//!
//! ```text
//! config  degeneracy
//! 01      1
//! 02      6
//! ```
//!
//! with one phonon file per configuration, named by appending the
//! configuration name to a common prefix (`input01`, `input02`).

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use log::info;

use super::errors::{InputError, Result};
use super::model::{ConfigurationInput, QhaInput};
use crate::statmech::VibrationalSpectrum;

/// Dimensions declared by the header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Header {
    volumes: usize,
    q_points: usize,
    modes: usize,
    formula_units: usize,
}

/// Parser for the plain-text phonon input format
#[derive(Debug, Clone, Default)]
pub struct PhononInputReader {
    name: Option<String>,
}

impl PhononInputReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Name given to the single configuration the file describes
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Read and normalise an input file
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<QhaInput> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let name = self.name.clone().unwrap_or_else(|| {
            path.file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default()
        });
        Self { name: Some(name) }.parse(BufReader::new(file))
    }

    /// Parse input from any buffered reader
    pub fn parse<R: BufRead>(&self, reader: R) -> Result<QhaInput> {
        let mut lines = Vec::new();
        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            lines.push((index + 1, trimmed.to_string()));
        }
        let mut lines = lines.into_iter();

        let header = loop {
            match lines.next() {
                Some((_, line)) => {
                    if let Some(header) = parse_header(&line) {
                        break header;
                    }
                }
                None => {
                    return Err(InputError::InvalidFormat(
                        "header 'nv nq nmodes nformula' not found".to_string(),
                    ))
                }
            }
        };

        let mut volumes = Vec::with_capacity(header.volumes);
        let mut static_energies = Vec::with_capacity(header.volumes);
        let mut frequencies: Vec<Vec<Vec<f64>>> = Vec::with_capacity(header.volumes);
        let mut q_weights = Vec::with_capacity(header.q_points);
        let mut in_weights = false;

        while let Some((number, line)) = lines.next() {
            if in_weights {
                let weight = line
                    .split_whitespace()
                    .last()
                    .ok_or_else(|| parse_error(number, "missing q-point weight"))?;
                q_weights.push(parse_f64(number, weight)?);
                continue;
            }

            if line.to_lowercase().contains("weight") {
                in_weights = true;
                continue;
            }

            if line.contains('=') {
                let (volume, energy) = parse_volume_line(number, &line)?;
                volumes.push(volume);
                static_energies.push(energy);
                frequencies.push(Vec::with_capacity(header.q_points));
                continue;
            }

            let tokens = line.split_whitespace().count();
            if tokens != 3 {
                return Err(parse_error(number, "expected a q-point with three coordinates"));
            }
            let current = frequencies
                .last_mut()
                .ok_or_else(|| parse_error(number, "q-point before the first volume line"))?;
            let mut modes = Vec::with_capacity(header.modes);
            for _ in 0..header.modes {
                let (number, line) = lines.next().ok_or_else(|| {
                    InputError::InvalidFormat("input ends inside a frequency block".to_string())
                })?;
                let value = line
                    .split_whitespace()
                    .next()
                    .ok_or_else(|| parse_error(number, "missing frequency"))?;
                modes.push(parse_f64(number, value)?);
            }
            current.push(modes);
        }

        if volumes.len() != header.volumes {
            return Err(InputError::InvalidFormat(format!(
                "header declares {} volumes, found {}",
                header.volumes,
                volumes.len()
            )));
        }
        if let Some((v, found)) = frequencies
            .iter()
            .map(Vec::len)
            .enumerate()
            .find(|&(_, n)| n != header.q_points)
        {
            return Err(InputError::InvalidFormat(format!(
                "volume {} has {} q-points, header declares {}",
                v, found, header.q_points
            )));
        }
        if q_weights.len() != header.q_points {
            return Err(InputError::InvalidFormat(format!(
                "header declares {} q-points, found {} weights",
                header.q_points,
                q_weights.len()
            )));
        }

        let mut input = QhaInput {
            formula_unit_number: header.formula_units,
            configurations: vec![ConfigurationInput {
                name: self.name.clone().unwrap_or_default(),
                degeneracy: 1.0,
                volumes,
                static_energies,
                spectrum: Some(VibrationalSpectrum::Modes {
                    q_weights,
                    frequencies,
                }),
            }],
            shared_spectrum: None,
        };
        input.normalize()?;
        Ok(input)
    }
}

/// Load QHA input, JSON for `.json` files and the text format otherwise
pub fn read_input<P: AsRef<Path>>(path: P) -> Result<QhaInput> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        QhaInput::from_json_file(path)
    } else {
        PhononInputReader::new().read(path)
    }
}

/// Parse a `config degeneracy` table into `(name, degeneracy)` rows
///
/// The header may list the two columns in either order and carry extra
/// columns, which are ignored.
pub fn parse_degeneracy_table<R: BufRead>(reader: R) -> Result<Vec<(String, f64)>> {
    let mut columns: Option<(usize, usize)> = None;
    let mut rows = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let number = index + 1;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() || tokens[0].starts_with('#') {
            continue;
        }

        let (name_column, degeneracy_column) = match columns {
            Some(columns) => columns,
            None => {
                let find = |key: &str| tokens.iter().position(|t| t.eq_ignore_ascii_case(key));
                match (find("config"), find("degeneracy")) {
                    (Some(name), Some(degeneracy)) => {
                        columns = Some((name, degeneracy));
                        continue;
                    }
                    _ => return Err(parse_error(number, "expected a 'config degeneracy' header")),
                }
            }
        };

        let name = tokens
            .get(name_column)
            .ok_or_else(|| parse_error(number, "missing configuration name"))?;
        let degeneracy = tokens
            .get(degeneracy_column)
            .ok_or_else(|| parse_error(number, "missing degeneracy"))?;
        rows.push((name.to_string(), parse_f64(number, degeneracy)?));
    }

    if rows.is_empty() {
        return Err(InputError::InvalidFormat(
            "degeneracy table lists no configurations".to_string(),
        ));
    }
    Ok(rows)
}

/// Load a multi-configuration dataset
///
/// Every configuration named in `table` is read from the text file
/// `{prefix}{name}` and takes its degeneracy from the table. All files must
/// agree on the number of formula units.
pub fn read_multi_configuration<P: AsRef<Path>, Q: AsRef<Path>>(table: P, prefix: Q) -> Result<QhaInput> {
    let rows = parse_degeneracy_table(BufReader::new(File::open(table.as_ref())?))?;

    let mut formula_units = None;
    let mut configurations = Vec::with_capacity(rows.len());
    for (name, degeneracy) in rows {
        let mut path = prefix.as_ref().as_os_str().to_owned();
        path.push(&name);
        let path = PathBuf::from(path);

        let input = PhononInputReader::new().with_name(name.as_str()).read(&path)?;
        match formula_units {
            None => formula_units = Some(input.formula_unit_number),
            Some(n) if n != input.formula_unit_number => {
                return Err(InputError::InvalidFormat(format!(
                    "{} declares {} formula units, expected {}",
                    path.display(),
                    input.formula_unit_number,
                    n
                )));
            }
            Some(_) => {}
        }
        for mut configuration in input.configurations {
            configuration.degeneracy = degeneracy;
            configurations.push(configuration);
        }
    }
    info!("Read {} configurations", configurations.len());

    let mut input = QhaInput {
        formula_unit_number: formula_units.unwrap_or(1),
        configurations,
        shared_spectrum: None,
    };
    input.normalize()?;
    Ok(input)
}

fn parse_header(line: &str) -> Option<Header> {
    let values: Vec<usize> = line
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .ok()?;
    match values[..] {
        [volumes, q_points, modes, formula_units] => Some(Header {
            volumes,
            q_points,
            modes,
            formula_units,
        }),
        _ => None,
    }
}

/// Extract `V` and `E` from a `P= .. V= .. E= ..` line
fn parse_volume_line(number: usize, line: &str) -> Result<(f64, f64)> {
    let spaced = line.replace('=', " = ");
    let tokens: Vec<&str> = spaced.split_whitespace().collect();
    let value_of = |key: &str| -> Result<f64> {
        let position = tokens
            .windows(3)
            .position(|w| w[0].eq_ignore_ascii_case(key) && w[1] == "=")
            .ok_or_else(|| parse_error(number, &format!("missing '{}='", key)))?;
        parse_f64(number, tokens[position + 2])
    };
    Ok((value_of("V")?, value_of("E")?))
}

fn parse_f64(number: usize, token: &str) -> Result<f64> {
    token
        .parse::<f64>()
        .map_err(|_| parse_error(number, &format!("'{}' is not a number", token)))
}

fn parse_error(number: usize, message: &str) -> InputError {
    InputError::ParseError(format!("line {}: {}", number, message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const SAMPLE: &str = "\
# two volumes, two q-points, two modes
2 2 2 4

P= 10.0 V= 250.0 E= -100.25
0.0 0.0 0.0
0.0
150.5
0.5 0.5 0.5
210.0
320.0

p=-5.0 v=280.5 e=-100.5
0.0 0.0 0.0
0.0
140.0
0.5 0.5 0.5
200.0
300.0

weight
0.0 0.0 0.0 1
0.5 0.5 0.5 3
";

    #[test]
    fn test_parse_sample() {
        let input = PhononInputReader::new()
            .with_name("sample")
            .parse(Cursor::new(SAMPLE))
            .unwrap();
        assert_eq!(input.formula_unit_number, 4);
        let configuration = &input.configurations[0];
        assert_eq!(configuration.name, "sample");
        assert_eq!(configuration.volumes, vec![250.0, 280.5]);
        assert_eq!(configuration.static_energies, vec![-100.25, -100.5]);
        match configuration.spectrum.as_ref().unwrap() {
            VibrationalSpectrum::Modes {
                q_weights,
                frequencies,
            } => {
                assert_eq!(q_weights, &vec![1.0, 3.0]);
                assert_eq!(frequencies[1][1], vec![200.0, 300.0]);
                assert_eq!(frequencies[0][0], vec![0.0, 150.5]);
            }
            other => panic!("unexpected spectrum {:?}", other),
        }
    }

    #[test]
    fn test_missing_header() {
        let result = PhononInputReader::new().parse(Cursor::new("P= 0 V= 1 E= 2\n"));
        assert!(matches!(result, Err(InputError::InvalidFormat(_))));
    }

    #[test]
    fn test_count_mismatch() {
        let truncated = SAMPLE.replace("0.5 0.5 0.5 3\n", "");
        let result = PhononInputReader::new().parse(Cursor::new(truncated));
        assert!(matches!(result, Err(InputError::InvalidFormat(_))));
    }

    #[test]
    fn test_degeneracy_table() {
        let table = "# configurations\nconfig degeneracy\n01 1\n02 6\n\n03 12.0\n";
        let rows = parse_degeneracy_table(Cursor::new(table)).unwrap();
        assert_eq!(
            rows,
            vec![
                ("01".to_string(), 1.0),
                ("02".to_string(), 6.0),
                ("03".to_string(), 12.0)
            ]
        );

        let swapped = parse_degeneracy_table(Cursor::new("degeneracy config\n4 a\n")).unwrap();
        assert_eq!(swapped, vec![("a".to_string(), 4.0)]);
    }

    #[test]
    fn test_degeneracy_table_errors() {
        assert!(matches!(
            parse_degeneracy_table(Cursor::new("name weight\n01 1\n")),
            Err(InputError::ParseError(_))
        ));
        assert!(matches!(
            parse_degeneracy_table(Cursor::new("config degeneracy\n")),
            Err(InputError::InvalidFormat(_))
        ));
        match parse_degeneracy_table(Cursor::new("config degeneracy\n01 x\n")) {
            Err(InputError::ParseError(message)) => assert!(message.starts_with("line 2:")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_number_reports_line() {
        let broken = SAMPLE.replace("150.5", "1x0.5");
        match PhononInputReader::new().parse(Cursor::new(broken)) {
            Err(InputError::ParseError(message)) => assert!(message.starts_with("line 7:")),
            other => panic!("expected a parse error, got {:?}", other),
        }
    }
}

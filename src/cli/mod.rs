/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Command Line Interface (CLI) module
//!
//! `qha-rs run --settings settings.json --input input.txt [--output DIR]`
//!
//! With `--config-degeneracy TABLE`, `--input` is the file-name prefix of the
//! per-configuration phonon files.

mod writer;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use log::info;

use crate::calculator::Calculator;
use crate::input::{read_input, read_multi_configuration, Settings};

pub use writer::{write_dense_volumes, write_eos_parameters, write_results, write_table};

/// Quasi-harmonic thermodynamics from phonon and static-energy data
#[derive(Parser, Debug)]
#[command(name = "qha-rs")]
#[command(version)]
#[command(about = "Quasi-harmonic approximation thermodynamics", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a QHA calculation and write one table per requested property
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// JSON settings file
    #[arg(long)]
    pub settings: PathBuf,

    /// Input data, JSON or the plain-text phonon format
    #[arg(long)]
    pub input: PathBuf,

    /// Table of configuration names and degeneracies; `--input` is then the
    /// prefix the configuration names are appended to
    #[arg(long)]
    pub config_degeneracy: Option<PathBuf>,

    /// Directory the result tables are written to
    #[arg(long, default_value = "results")]
    pub output: PathBuf,

    /// Log per-temperature diagnostics
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Cli {
    pub fn verbose(&self) -> bool {
        match &self.command {
            Commands::Run(args) => args.verbose,
        }
    }

    pub fn execute(&self) -> anyhow::Result<()> {
        match &self.command {
            Commands::Run(args) => run(args),
        }
    }
}

/// Load settings and input, run the calculation and write the tables
pub fn run(args: &RunArgs) -> anyhow::Result<()> {
    let settings = Settings::from_file(&args.settings)
        .with_context(|| format!("failed to load settings from {}", args.settings.display()))?;
    let input = match &args.config_degeneracy {
        Some(table) => read_multi_configuration(table, &args.input).with_context(|| {
            format!(
                "failed to read configurations listed in {} with prefix {}",
                table.display(),
                args.input.display()
            )
        })?,
        None => read_input(&args.input)
            .with_context(|| format!("failed to read input from {}", args.input.display()))?,
    };

    let calculator = Calculator::new(&settings)?;
    let results = calculator.run(&input)?;

    let written = write_results(&results, &args.output)
        .with_context(|| format!("failed to write results to {}", args.output.display()))?;
    info!(
        "Wrote {} files to {} (volume ratio {:.4})",
        written.len(),
        args.output.display(),
        results.volume_ratio
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_run_arguments() {
        let cli = Cli::try_parse_from([
            "qha-rs", "run", "--settings", "s.json", "--input", "in.txt", "--verbose",
        ])
        .unwrap();
        assert!(cli.verbose());
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.settings, PathBuf::from("s.json"));
                assert_eq!(args.input, PathBuf::from("in.txt"));
                assert_eq!(args.output, PathBuf::from("results"));
                assert!(args.config_degeneracy.is_none());
            }
        }
    }

    #[test]
    fn test_parse_multi_configuration_arguments() {
        let cli = Cli::try_parse_from([
            "qha-rs",
            "run",
            "--settings",
            "s.json",
            "--input",
            "data/input",
            "--config-degeneracy",
            "data/config_degeneracy",
        ])
        .unwrap();
        match cli.command {
            Commands::Run(args) => {
                assert_eq!(args.config_degeneracy, Some(PathBuf::from("data/config_degeneracy")));
                assert_eq!(args.input, PathBuf::from("data/input"));
            }
        }
    }

    #[test]
    fn test_missing_input_is_rejected() {
        assert!(Cli::try_parse_from(["qha-rs", "run", "--settings", "s.json"]).is_err());
    }
}

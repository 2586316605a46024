/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Main executable for qha-rs

use clap::Parser;
use qha_rs::cli::Cli;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise info, or debug with --verbose
    let default_level = if cli.verbose() { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    log::info!("qha-rs v{}", qha_rs::VERSION);
    cli.execute()
}

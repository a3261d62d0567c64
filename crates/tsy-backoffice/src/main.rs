//! Treasury back-office runner.
//!
//! Reads the four input files from the data directory, drives them through
//! the service pipeline, and writes the report files to the output
//! directory. Exit code is zero on a clean run.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::warn;
use tracing_subscriber::EnvFilter;

use tsy_backoffice::config::BackofficeConfig;
use tsy_backoffice::{fixtures, runner};

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "tsy-backoffice")]
#[command(about = "Treasury back-office pipeline over line-oriented input files")]
#[command(version)]
struct Args {
    /// Config file path
    #[arg(short, long, default_value = "config/backoffice.toml")]
    config: PathBuf,

    /// Directory holding the input files (overrides config)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Directory for the output files (overrides config)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Write a small deterministic sample input set before running
    #[arg(long)]
    write_sample_data: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    let mut config = if args.config.exists() {
        BackofficeConfig::from_file(&args.config)
            .with_context(|| format!("failed to load config from {:?}", args.config))?
    } else {
        BackofficeConfig::default()
    };
    config.apply_cli_overrides(args.data_dir, args.out_dir);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if !args.config.exists() {
        warn!(path = ?args.config, "config file not found, using defaults");
    }

    if args.write_sample_data {
        fixtures::write_sample_inputs(&config.data_dir)?;
    }

    runner::run_pipeline(&config)
}

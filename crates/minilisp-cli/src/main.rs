//! `get-wasm` - installs the mini_lisp WebAssembly interpreter into the
//! course site's public asset directory.
//!
//! Any failure exits with a non-zero status; nothing is retried.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

mod commands;
mod theme;

use commands::fetch::{FetchArgs, run_fetch};
use minilisp_telemetry::LogFormat;

/// Download mini_lisp.wasm and mini_lisp.js from the release archive
#[derive(Parser)]
#[command(name = "get-wasm")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Log output format (defaults to the config file setting)
    #[arg(long, value_enum)]
    log_format: Option<LogFormatArg>,

    /// Path to a TOML configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(flatten)]
    fetch: FetchArgs,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogFormatArg {
    Pretty,
    Compact,
    Json,
    Full,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => Self::Pretty,
            LogFormatArg::Compact => Self::Compact,
            LogFormatArg::Json => Self::Json,
            LogFormatArg::Full => Self::Full,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = minilisp_config::Config::load(cli.config.as_deref())
        .context("failed to load configuration")?;

    // Set up logging from config, with flag overrides.
    let mut log_config = minilisp_telemetry::from_config(&config);
    if cli.verbose {
        "debug".clone_into(&mut log_config.level);
    }
    if let Some(format) = cli.log_format {
        log_config.format = format.into();
    }
    if let Err(e) = minilisp_telemetry::setup_logging(&log_config) {
        eprintln!("Failed to initialize logging: {e}");
    }

    run_fetch(&cli.fetch, &config).await
}

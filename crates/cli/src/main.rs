//! `eccairs-taxonomy` entry point.
//!
//! This binary is the composition root of the workspace. Responsibilities:
//!
//! 1. **Parse configuration**: layered defaults, `eccairs-taxonomy.toml`,
//!    `ECCAIRS_*` environment variables and flags (see [`config`]).
//! 2. **Wire observability**: `tracing-subscriber` with a pretty or JSON layer
//!    and an optional OpenTelemetry OTLP exporter (see [`observability`]).
//!    All spans and events emitted by the library crates flow through it.
//! 3. **Construct infrastructure**: create the [`transport::HttpTransport`]
//!    and inject it into [`resolver::TaxonomyService`].
//! 4. **Run one subcommand** and print its result as JSON on stdout.
//!
//! Exit status is 0 on success, 2 when a code is not in the taxonomy and 1
//! for every other failure.

mod args;
mod commands;
mod config;
mod observability;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use resolver::TaxonomyService;
use transport::HttpTransport;

use crate::args::Cli;
use crate::config::CliConfig;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match CliConfig::load(cli.config.as_deref(), cli.base_url.clone()) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };
    let telemetry = match observability::init(&config) {
        Ok(telemetry) => telemetry,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    let status = match run(&cli, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "Command failed");
            eprintln!("Error: {err:#}");
            ExitCode::from(commands::exit_status(&err))
        }
    };

    telemetry.shutdown();
    status
}

async fn run(cli: &Cli, config: &CliConfig) -> Result<()> {
    let transport = HttpTransport::new(config.transport_config())?;
    let service =
        TaxonomyService::with_retry_settings(&config.base_url, transport, config.retry_settings())?;
    tracing::debug!(base_url = %config.base_url, command = ?cli.command, "Running command");

    let output = commands::execute(cli.command, &service).await?;
    let rendered = serde_json::to_string_pretty(&output).context("failed to render output")?;
    println!("{rendered}");
    Ok(())
}

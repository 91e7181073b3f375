//! wheelbind - input binding CLI
//!
//! Detects and binds wheel, pedal and shifter inputs and writes the
//! simulator's controls file.

#![deny(static_mut_refs)]
#![deny(unused_must_use)]
#![deny(clippy::unwrap_used)]

mod commands;
mod output;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use openracing_errors::{BinderError, ErrorCategory};
use openracing_input_source::{InputSource, ScriptedSource};
use racing_wheel_binder::{AppContext, BinderConfig, JsonStateStore};
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::commands::Commands;

#[derive(Parser, Debug)]
#[command(name = "wheelbind")]
#[command(about = "Detect and bind racing wheel, pedal and shifter inputs")]
#[command(version)]
#[command(long_about = "
wheelbind assigns physical controls to simulator actions and writes the
simulator's controls file. Use `detect` to bind whatever you move or press,
or `bind` when the axis or button is already known.

Use --json flag for machine-readable output suitable for scripting.
")]
struct Cli {
    /// Output format (human-readable or JSON)
    #[arg(long, global = true, help = "Output in JSON format for machine parsing")]
    json: bool,

    /// Verbose logging
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file
    #[arg(long, global = true, env = "WHEELBIND_CONFIG")]
    config: Option<PathBuf>,

    /// Application state file, overriding the configuration
    #[arg(long, global = true, env = "WHEELBIND_STATE")]
    state: Option<PathBuf>,

    /// Device capture to replay as the input source
    #[arg(long, global = true, env = "WHEELBIND_CAPTURE")]
    capture: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("wheelbind={log_level},racing_wheel_binder={log_level},openracing_bindings={log_level},openracing_controls_ini={log_level}").into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    match run(&cli).await {
        Ok(()) => Ok(()),
        Err(e) => {
            if cli.json {
                output::print_error_json(&e);
            } else {
                output::print_error_human(&e);
            }
            std::process::exit(exit_code(&e));
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => BinderConfig::load_from_path(path).await?,
        None => BinderConfig::load().await?,
    };
    let state_file = match &cli.state {
        Some(path) => path.clone(),
        None => config.state_file()?,
    };
    debug!(state = ?state_file, "Using state file");

    let source: Arc<dyn InputSource> = match &cli.capture {
        Some(path) => Arc::new(
            ScriptedSource::load(path)
                .with_context(|| format!("Failed to load capture: {}", path.display()))?,
        ),
        None => Arc::new(ScriptedSource::new(Vec::new())),
    };

    let ctx = AppContext::new(config, source, Arc::new(JsonStateStore::new(state_file))).await;
    let result = commands::execute(&cli.command, &ctx, cli.json).await;
    ctx.detection.shutdown().await;
    result
}

fn exit_code(error: &anyhow::Error) -> i32 {
    let category = error
        .chain()
        .find_map(|e| e.downcast_ref::<BinderError>())
        .map(BinderError::category);
    match category {
        Some(ErrorCategory::Configuration) => 2,
        Some(ErrorCategory::Device) => 3,
        Some(ErrorCategory::Conflict) => 4,
        Some(ErrorCategory::IO) => 5,
        Some(ErrorCategory::Serialization) => 6,
        None => 1,
    }
}

//! # interpose CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber, loads the
//! pipeline configuration and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use interpose_cli::invoke::{run_invoke, InvokeArgs};
use interpose_cli::load_config;
use interpose_cli::operations::{run_operations, OperationsArgs};

/// Interpose: auth gate and call logging around controller operations.
#[derive(Parser, Debug)]
#[command(name = "interpose", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML pipeline configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Emit diagnostics as JSON lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List registered operations and their interceptor chains.
    Operations(OperationsArgs),

    /// Invoke one operation through the pipeline.
    Invoke(InvokeArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.json);

    tracing::debug!("interpose CLI v{} starting", env!("CARGO_PKG_VERSION"));

    let result = load_config(cli.config.as_deref()).and_then(|config| match &cli.command {
        Commands::Operations(args) => run_operations(args, &config),
        Commands::Invoke(args) => run_invoke(args, &config),
    });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

//! Playmap CLI - Command-line interface for the Playmap playground.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

mod commands;

/// Playmap sandboxed playground pipeline
#[derive(Parser)]
#[command(name = "playmap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (suppress non-essential output)
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Output format options.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON output
    Json,
    /// Compact JSON (single line)
    JsonCompact,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Assemble a project into one runnable document
    Assemble(commands::assemble::AssembleArgs),
    /// Pack a project directory into an archive
    Export(commands::export::ExportArgs),
    /// Unpack an archive into a directory
    Import(commands::import::ImportArgs),
    /// Inspect a project
    Inspect(commands::inspect::InspectArgs),
    /// Replay captured context messages against a run manifest
    Replay(commands::replay::ReplayArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("playmap={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = commands::load_config(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Assemble(args) => commands::assemble::execute(args, &config, cli.format, cli.quiet),
        Commands::Export(args) => commands::export::execute(args, cli.format, cli.quiet),
        Commands::Import(args) => commands::import::execute(args, &config, cli.format, cli.quiet),
        Commands::Inspect(args) => commands::inspect::execute(args, &config, cli.format),
        Commands::Replay(args) => commands::replay::execute(args, &config, cli.format),
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                eprintln!("Error: {:#}", e);
            }
            ExitCode::FAILURE
        }
    }
}

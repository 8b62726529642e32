//! inline-el CLI - Inline root element definitions for templates.
//!
//! Provides commands for:
//! - `extract`: Split one template into its root element and content
//! - `load`: Load a directory of templates through the template cache

mod commands;
mod error;
mod output;
mod templates;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{ExtractArgs, LoadArgs};
use output::Output;

/// inline-el - Inline root element definitions for templates.
#[derive(Parser)]
#[command(name = "inline-el", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the root element definition from a template.
    Extract(ExtractArgs),
    /// Load templates through the template cache.
    Load(LoadArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables DEBUG level, otherwise use RUST_LOG (ERROR when unset)
    let verbose = matches!(&cli.command, Commands::Load(args) if args.verbose);
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    tracing::debug!(version = inline_el::VERSION, "Starting inline-el");

    let result = match cli.command {
        Commands::Extract(args) => args.execute(),
        Commands::Load(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

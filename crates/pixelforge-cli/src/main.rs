//! pixelforge CLI - batch and single-shot image asset generation

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{batch, generate};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pixelforge")]
#[command(about = "Generate game UI image assets from a job manifest", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run every job (or a selection) from a manifest
    Batch(batch::BatchArgs),

    /// Generate a single image from a literal prompt
    Generate(generate::GenerateArgs),
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "pixelforge_gen=info,pixelforge_cli=info".into()),
    );

    // stdout carries the run report; diagnostics go to stderr
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    // Usage errors exit 1 like every other failure; help and version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            e.print()?;
            std::process::exit(code);
        }
    };

    init_tracing();

    match cli.command {
        Commands::Batch(args) => batch::run(args),
        Commands::Generate(args) => generate::run(args),
    }
}

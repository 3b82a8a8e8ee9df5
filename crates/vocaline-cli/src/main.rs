//! Vocaline CLI - phonemize scores against a voicebank from the command line.

mod commands;
mod score;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "vocaline")]
#[command(author, version, about = "Vocaline phonemizer CLI", long_about = None)]
struct Cli {
    /// Log resolution decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn a score into timed voicebank aliases
    Phonemize(commands::phonemize::PhonemizeArgs),

    /// Validate a language table and print its diagnostics
    Check(commands::check::CheckArgs),

    /// Show the aliases chosen for one syllable
    Resolve(commands::resolve::ResolveArgs),

    /// List factory and user language tables
    Tables(commands::tables::TablesArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Phonemize(args) => commands::phonemize::run(args),
        Commands::Check(args) => commands::check::run(args),
        Commands::Resolve(args) => commands::resolve::run(args),
        Commands::Tables(args) => commands::tables::run(args),
    }
}

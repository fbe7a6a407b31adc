//! `tufctl` - operator CLI for a TUF repository service.
//!
//! - `tufctl ceremony` - run the root-of-trust key ceremony

#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

use tufctl::ceremony::{self, CeremonyArgs};
use tufctl::keys::FileKeyLoader;
use tufctl::prompt::TermPrompt;

/// TUF repository service operator CLI.
#[derive(Parser)]
#[command(name = "tufctl")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the key ceremony: gather role keys and thresholds, then submit
    /// the bootstrap payload (--bootstrap) or save it for later.
    Ceremony(CeremonyArgs),
}

fn main() {
    // Logs go to stderr so stdout stays clean for the ceremony dialogue.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Ceremony(args) => run_ceremony(&args),
    };

    if let Err(e) = result {
        eprintln!("{e}");
        std::process::exit(1);
    }
}

fn run_ceremony(args: &CeremonyArgs) -> tufctl::Result<()> {
    // One ceremony is one linear sequence of prompts and HTTP calls; a
    // current-thread runtime is all it needs.
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let mut prompt = TermPrompt::default();
    runtime.block_on(ceremony::run(
        args,
        &mut prompt,
        &FileKeyLoader,
        &mut std::io::stdout(),
    ))
}

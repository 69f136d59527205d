//! Enigma Hunter - mystery investigation game
//!
//! Usage:
//!   enigma-hunter upload ./stories/manor     Upload a story directory
//!   enigma-hunter new-game manor             Start a game
//!   enigma-hunter play                       Play interactively
//!   enigma-hunter scan <uuid>                Scan a QR code
//!   enigma-hunter --help                     Show all commands

use anyhow::Result;
use clap::Parser;

use enigma_hunter::cli::output::OutputMode;
use enigma_hunter::cli::{print_completions, Cli, Commands};
use enigma_hunter::init::AppContext;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Tracing to stderr; stdout belongs to the game
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("enigma_hunter=info".parse()?),
        )
        .init();

    let mode = OutputMode::from_flags(cli.json, cli.md);

    match &cli.command {
        Commands::Completions { shell } => print_completions(*shell),
        cmd => {
            let ctx = AppContext::new(cli.data_path.clone()).await?;
            enigma_hunter::cli::execute(cmd, &ctx, cli.session.as_deref(), mode).await?;
        }
    }

    Ok(())
}

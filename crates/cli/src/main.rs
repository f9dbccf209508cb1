//! Parley CLI: the main entry point.
//!
//! Commands:
//! - `chat`: interactive tool-using chat (the default)
//! - `tools`: list the tools the model can call
//! - `doctor`: check configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "parley",
    about = "Parley: chat with Claude, with filesystem tools",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,

    /// List the tools available to the model
    Tools,

    /// Diagnose configuration problems
    Doctor,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr; stdout belongs to the conversation.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.command.unwrap_or(Commands::Chat) {
        Commands::Chat => commands::chat::run().await?,
        Commands::Tools => commands::tools::run()?,
        Commands::Doctor => commands::doctor::run()?,
    }

    Ok(())
}

//! `parley chat`: Interactive tool-using chat.

use anyhow::{Context, bail};
use parley_agent::AgentLoop;
use parley_channels::{StdinInput, TerminalDisplay};
use parley_config::AppConfig;
use parley_core::error::Error;
use parley_providers::AnthropicProvider;
use std::sync::Arc;
use tracing::info;

pub async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load().context("Failed to load config")?;

    // Check for API key early: give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export ANTHROPIC_API_KEY='sk-ant-...'");
        eprintln!("    export PARLEY_API_KEY='sk-ant-...'");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        bail!("No API key found. See above for setup instructions.");
    }

    let provider = AnthropicProvider::from_config(&config).context("Failed to build provider")?;
    let tools = Arc::new(parley_tools::default_registry()?);

    println!("Chat with Claude (use 'ctrl-c' or type 'exit' to quit)");
    println!("  Model: {}", config.model);
    println!("  Tools: {}", tools.names().join(", "));
    println!();

    let mut agent = AgentLoop::new(
        Arc::new(provider),
        tools,
        Box::new(StdinInput::stdin()),
        Arc::new(TerminalDisplay::stdout()),
        config.agent_config(),
    );

    let token = agent.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, cancelling");
            token.cancel();
        }
    });

    match agent.run().await {
        Ok(()) => {
            println!("\nGoodbye!");
            Ok(())
        }
        Err(Error::Cancelled) => {
            println!("\nGoodbye!");
            // A pending stdin read would otherwise hold the runtime open.
            std::process::exit(0);
        }
        Err(e) => Err(anyhow::Error::new(e).context("Conversation ended")),
    }
}

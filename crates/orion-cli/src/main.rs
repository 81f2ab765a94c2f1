//! Orion CLI Application
//!
//! Command-line front end for drafting, running and relaying plans.

mod args;
mod cli;
mod renderer;

use std::sync::Arc;

use anyhow::{Context, Result};
use args::{Args, Commands};
use clap::Parser;
use cli::Cli;
use log::info;
use orion_core::{drafter::DisabledOracle, OrchestratorBuilder, Settings};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        offline,
        tool_url,
        webhook_map,
        command,
    } = Args::parse();

    let mut settings = Settings::from_env().context("Failed to read settings from environment")?;
    if let Some(url) = tool_url {
        settings.tool_base_url = url;
    }
    if webhook_map.is_some() {
        settings.webhook_map = webhook_map;
    }

    let cli = Cli::new(settings.clone(), TerminalRenderer::new(!no_color));

    info!("Orion started");

    match command {
        Plan { command } => {
            let mut builder = OrchestratorBuilder::new()
                .with_settings(settings)
                .with_database_path(database_file);
            if offline {
                builder = builder.with_oracle(Arc::new(DisabledOracle));
            }
            let orchestrator = builder
                .build()
                .await
                .context("Failed to initialize orchestrator")?;
            cli.handle_plan_command(&orchestrator, command).await
        }
        Webhook { command } => cli.handle_webhook_command(command).await,
        Signature { command } => cli.handle_signature_command(command),
    }
}

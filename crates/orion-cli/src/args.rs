use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{PlanCommands, SignatureCommands, WebhookCommands};

/// Command-line front end for the Orion plan orchestrator
///
/// Orion drafts a plan of tool-backed steps for a goal, runs it one step at a
/// time, and relays every phase update to the webhooks subscribed to a
/// channel. Service endpoints and secrets come from the environment
/// (`MCP_BASE_URL`, `VLLM_BASE_URL`, `OPENAI_API_KEY`,
/// `WEBHOOK_SIGNING_SECRET`, ...); the flags below override them.
#[derive(Parser)]
#[command(version, about, name = "orion")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/orion/orion.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Draft without contacting a language model (always uses the fallback plan)
    #[arg(long, global = true, env = "ORION_OFFLINE")]
    pub offline: bool,

    /// Base URL of the tool server, overriding MCP_BASE_URL
    #[arg(long, global = true)]
    pub tool_url: Option<String>,

    /// JSON file mapping channel names to webhook URLs, overriding
    /// ORION_WEBHOOK_MAP
    #[arg(long, global = true)]
    pub webhook_map: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Draft, inspect and run plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Broadcast payloads to subscribed webhooks
    #[command(alias = "w")]
    Webhook {
        #[command(subcommand)]
        command: WebhookCommands,
    },
    /// Sign or verify payloads with the shared secret
    #[command(alias = "sig")]
    Signature {
        #[command(subcommand)]
        command: SignatureCommands,
    },
}

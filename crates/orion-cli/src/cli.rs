//! Subcommand arguments and their handlers.
//!
//! Argument structs carry the clap attributes and convert into the core
//! parameter types, so `orion-core` stays free of CLI concerns:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Orchestrator
//! ```

use std::io::Read;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use jiff::Timestamp;
use log::warn;
use orion_core::{
    params::{DraftPlan, Id, RunPlan},
    Orchestrator, OperationStatus, PlanSummaries, Settings, SignatureCodec, WebhookDispatcher,
};
use serde_json::Value;

use crate::renderer::TerminalRenderer;

/// Draft a plan for a goal and store it
#[derive(Args)]
pub struct DraftPlanArgs {
    /// Free-text description of what the plan should achieve
    pub goal: String,
    #[arg(short, long, default_value = "production", help = "Target environment label")]
    pub env: String,
    #[arg(short, long, default_value = "unknown", help = "Identifier of the requester")]
    pub author: String,
}

impl From<DraftPlanArgs> for DraftPlan {
    fn from(val: DraftPlanArgs) -> Self {
        DraftPlan::new(val.goal)
            .with_environment(val.env)
            .with_author(val.author)
    }
}

/// Run a stored plan step by step
#[derive(Args)]
pub struct RunPlanArgs {
    #[arg(help = "Identifier of the plan to run")]
    pub id: String,
    #[arg(short, long, help = "Channel whose webhooks receive every update")]
    pub channel: Option<String>,
}

impl From<RunPlanArgs> for RunPlan {
    fn from(val: RunPlanArgs) -> Self {
        RunPlan {
            id: val.id,
            channel: val.channel,
        }
    }
}

#[derive(Args)]
pub struct PlanIdArgs {
    #[arg(help = "Identifier of the plan")]
    pub id: String,
}

impl From<PlanIdArgs> for Id {
    fn from(val: PlanIdArgs) -> Self {
        Id { id: val.id }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Draft a plan for a goal and store it
    #[command(alias = "d")]
    Draft(DraftPlanArgs),
    /// Show a stored plan
    #[command(alias = "s")]
    Show(PlanIdArgs),
    /// List stored plans, newest first
    #[command(alias = "ls")]
    List,
    /// Discard a stored plan
    #[command(alias = "c")]
    Cancel(PlanIdArgs),
    /// Run a stored plan, printing every update
    #[command(alias = "r")]
    Run(RunPlanArgs),
}

/// Broadcast a JSON payload to a channel's webhooks
#[derive(Args)]
pub struct FanoutArgs {
    #[arg(help = "Channel whose subscribers receive the payload")]
    pub channel: String,
    #[arg(help = "JSON payload to broadcast")]
    pub payload: String,
}

#[derive(Subcommand)]
pub enum WebhookCommands {
    /// Broadcast a JSON payload to every webhook of a channel
    #[command(alias = "f")]
    Fanout(FanoutArgs),
}

/// Signing material shared by `sign` and `verify`
#[derive(Args)]
pub struct SigningArgs {
    #[arg(short, long, help = "Unix timestamp (seconds) covered by the signature")]
    pub timestamp: i64,
    #[arg(
        short,
        long,
        help = "File holding the raw body; standard input when omitted"
    )]
    pub body_file: Option<PathBuf>,
    #[arg(
        long,
        help = "Shared secret, overriding SLACK_SIGNING_SECRET (verify) and WEBHOOK_SIGNING_SECRET"
    )]
    pub secret: Option<String>,
}

#[derive(Args)]
pub struct VerifyArgs {
    #[command(flatten)]
    pub signing: SigningArgs,
    #[arg(long, help = "Signature to check, in v0=<hex> form")]
    pub signature: String,
}

#[derive(Subcommand)]
pub enum SignatureCommands {
    /// Print the signature for a body and timestamp
    Sign(SigningArgs),
    /// Check a signature against a body and timestamp
    Verify(VerifyArgs),
}

pub struct Cli {
    settings: Settings,
    renderer: TerminalRenderer,
}

impl Cli {
    pub fn new(settings: Settings, renderer: TerminalRenderer) -> Self {
        Self { settings, renderer }
    }

    pub async fn handle_plan_command(
        &self,
        orchestrator: &Orchestrator,
        command: PlanCommands,
    ) -> Result<()> {
        match command {
            PlanCommands::Draft(args) => {
                let plan = orchestrator
                    .draft_plan(&args.into())
                    .await
                    .context("Failed to draft plan")?;
                self.renderer.render(&plan.to_string())
            }
            PlanCommands::Show(args) => {
                let id: Id = args.into();
                match orchestrator.get_plan(&id).await? {
                    Some(plan) => self.renderer.render(&plan.to_string()),
                    None => {
                        let status = OperationStatus::failure(format!("Plan {} not found", id.id));
                        self.renderer.render(&status.to_string())?;
                        bail!("Plan {} not found", id.id)
                    }
                }
            }
            PlanCommands::List => {
                let summaries = PlanSummaries(orchestrator.list_plans().await?);
                self.renderer.render(&summaries.to_string())
            }
            PlanCommands::Cancel(args) => {
                let id: Id = args.into();
                orchestrator
                    .cancel_plan(&id)
                    .await
                    .with_context(|| format!("Failed to cancel plan {}", id.id))?;
                let status = OperationStatus::success(format!("Cancelled plan {}", id.id));
                self.renderer.render(&status.to_string())
            }
            PlanCommands::Run(args) => self.run_plan(orchestrator, args.into()).await,
        }
    }

    async fn run_plan(&self, orchestrator: &Orchestrator, params: RunPlan) -> Result<()> {
        let outcome = orchestrator
            .run_plan(&params, |update| {
                if let Err(e) = self.renderer.render(&update.to_string()) {
                    warn!("Failed to render update: {e}");
                }
            })
            .await
            .with_context(|| format!("Failed to run plan {}", params.id))?;

        self.renderer.render(&format!("\n{outcome}"))?;
        if !outcome.is_success() {
            bail!("Plan {} did not complete", outcome.plan_id());
        }
        Ok(())
    }

    pub async fn handle_webhook_command(&self, command: WebhookCommands) -> Result<()> {
        match command {
            WebhookCommands::Fanout(args) => {
                let payload: Value =
                    serde_json::from_str(&args.payload).context("Payload is not valid JSON")?;

                let registry = self
                    .settings
                    .registry()
                    .context("Failed to load webhook subscriptions")?;
                let mut dispatcher =
                    WebhookDispatcher::new(registry, self.settings.webhook_timeout())?;
                if let Some(codec) = self.settings.webhook_codec()? {
                    dispatcher = dispatcher.with_signing(codec);
                }

                let report = dispatcher.fanout(&args.channel, &payload).await;
                self.renderer.render(&report.to_string())?;
                if report.failed() > 0 {
                    bail!("{} of {} deliveries failed", report.failed(), report.deliveries.len());
                }
                Ok(())
            }
        }
    }

    pub fn handle_signature_command(&self, command: SignatureCommands) -> Result<()> {
        match command {
            SignatureCommands::Sign(args) => {
                let codec = self.signing_codec(args.secret.as_deref())?;
                let body = read_body(args.body_file.as_ref())?;
                let signature = codec.sign(args.timestamp, &body);
                self.renderer.render(&format!("{signature}\n"))
            }
            SignatureCommands::Verify(args) => {
                let codec = self.verifying_codec(args.signing.secret.as_deref())?;
                let body = read_body(args.signing.body_file.as_ref())?;
                let now = Timestamp::now().as_second();

                match codec.verify(args.signing.timestamp, &body, &args.signature, now) {
                    Ok(()) => {
                        let status = OperationStatus::success("Signature is valid");
                        self.renderer.render(&status.to_string())
                    }
                    Err(e) => {
                        let status = OperationStatus::failure(e.to_string());
                        self.renderer.render(&status.to_string())?;
                        bail!("Verification failed with HTTP {}: {e}", e.status_code())
                    }
                }
            }
        }
    }

    fn signing_codec(&self, secret: Option<&str>) -> Result<SignatureCodec> {
        match secret {
            Some(secret) => Ok(SignatureCodec::new(secret)?),
            None => self
                .settings
                .webhook_codec()?
                .context("No signing secret: pass --secret or set WEBHOOK_SIGNING_SECRET"),
        }
    }

    /// Inbound requests are checked with SLACK_SIGNING_SECRET, falling back
    /// to the webhook secret.
    fn verifying_codec(&self, secret: Option<&str>) -> Result<SignatureCodec> {
        if let Some(secret) = secret {
            return Ok(SignatureCodec::new(secret)?);
        }
        match self.settings.inbound_codec()? {
            Some(codec) => Ok(codec),
            None => self.settings.webhook_codec()?.context(
                "No signing secret: pass --secret or set SLACK_SIGNING_SECRET or WEBHOOK_SIGNING_SECRET",
            ),
        }
    }
}

fn read_body(path: Option<&PathBuf>) -> Result<Vec<u8>> {
    match path {
        Some(path) => std::fs::read(path)
            .with_context(|| format!("Failed to read body from {}", path.display())),
        None => {
            let mut body = Vec::new();
            std::io::stdin()
                .read_to_end(&mut body)
                .context("Failed to read body from standard input")?;
            Ok(body)
        }
    }
}

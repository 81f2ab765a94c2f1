//! Core library for the Orion plan orchestrator.
//!
//! Orion turns a free-text goal into an ordered plan of tool-backed steps,
//! runs the plan one unit of work at a time while streaming phase updates,
//! and relays those updates to webhook subscribers with HMAC signatures and
//! idempotency keys.
//!
//! # Components
//!
//! - [`drafter`]: goal → [`Plan`] through a drafting oracle, with fallback
//! - [`executor`]: lazy, ordered execution yielding [`StepUpdate`]s
//! - [`tools`]: invocation of named external tools
//! - [`signature`]: HMAC-SHA256 signing and replay-protected verification
//! - [`webhook`]: channel subscriptions and parallel, signed fan-out
//! - [`store`]: pluggable plan storage (in memory or SQLite)
//! - [`orchestrator`]: the coordinator wiring everything together
//!
//! # Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use orion_core::{drafter::DisabledOracle, params::DraftPlan, OrchestratorBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .with_database_path(Some("orion.db"))
//!     .with_oracle(Arc::new(DisabledOracle))
//!     .build()
//!     .await?;
//!
//! let plan = orchestrator.draft_plan(&DraftPlan::new("Publish the digest")).await?;
//! println!("{plan}");
//!
//! for summary in orchestrator.list_plans().await? {
//!     println!("{summary}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod display;
pub mod drafter;
pub mod error;
pub mod executor;
pub mod models;
pub mod orchestrator;
pub mod params;
pub mod signature;
pub mod store;
pub mod tools;
pub mod webhook;

// Re-export commonly used types
pub use config::Settings;
pub use display::{LocalDateTime, OperationStatus, PlanSummaries};
pub use drafter::PlanDrafter;
pub use error::{OrionError, Result};
pub use executor::{PlanExecutor, PlanRun};
pub use models::{Phase, Plan, PlanMetadata, PlanSummary, RunOutcome, Step, StepUpdate};
pub use orchestrator::{Orchestrator, OrchestratorBuilder};
pub use params::{DraftPlan, Id, MirrorMessage, RunPlan};
pub use signature::{SignatureCodec, VerificationError};
pub use store::{MemoryPlanStore, PlanStore, SqlitePlanStore};
pub use tools::{HttpToolInvoker, ToolError, ToolInvoker};
pub use webhook::{FanoutReport, SubscriptionRegistry, WebhookDispatcher};

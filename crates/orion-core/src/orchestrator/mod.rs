//! High-level API tying drafting, storage, execution and fan-out together.
//!
//! [`Orchestrator`] is the central coordinator. It owns one
//! [`PlanDrafter`], one [`PlanStore`], one [`PlanExecutor`] and one
//! [`WebhookDispatcher`], and is created through an [`OrchestratorBuilder`].
//!
//! ```text
//!  goal ──▶ PlanDrafter ──▶ PlanStore ──▶ PlanExecutor ──▶ StepUpdate ──▶ WebhookDispatcher
//!                                              │                              │
//!                                         ToolInvoker                   SignatureCodec
//! ```
//!
//! # Usage Examples
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use orion_core::drafter::DisabledOracle;
//! use orion_core::params::{DraftPlan, Id};
//! use orion_core::OrchestratorBuilder;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let orchestrator = OrchestratorBuilder::new()
//!     .in_memory()
//!     .with_oracle(Arc::new(DisabledOracle))
//!     .build()
//!     .await?;
//!
//! let plan = orchestrator.draft_plan(&DraftPlan::new("Refresh vectors")).await?;
//! let stored = orchestrator.get_plan(&Id::new(&plan.id)).await?;
//! assert_eq!(stored.as_ref(), Some(&plan));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use log::{debug, info};
use serde_json::json;

use crate::{
    drafter::{generate_plan_id, PlanDrafter},
    error::{OrionError, Result},
    executor::{PlanExecutor, PlanRun},
    models::{Phase, Plan, PlanSummary, RunOutcome, StepUpdate},
    params::{DraftPlan, Id, MirrorMessage, RunPlan},
    store::PlanStore,
    webhook::{FanoutReport, WebhookDispatcher},
};

pub mod builder;


pub use builder::OrchestratorBuilder;

/// Main interface for drafting, running and relaying plans.
pub struct Orchestrator {
    drafter: PlanDrafter,
    store: Arc<dyn PlanStore>,
    executor: PlanExecutor,
    dispatcher: WebhookDispatcher,
}

impl Orchestrator {
    pub(crate) fn new(
        drafter: PlanDrafter,
        store: Arc<dyn PlanStore>,
        executor: PlanExecutor,
        dispatcher: WebhookDispatcher,
    ) -> Self {
        Self {
            drafter,
            store,
            executor,
            dispatcher,
        }
    }

    pub fn drafter(&self) -> &PlanDrafter {
        &self.drafter
    }

    pub fn store(&self) -> &Arc<dyn PlanStore> {
        &self.store
    }

    pub fn dispatcher(&self) -> &WebhookDispatcher {
        &self.dispatcher
    }

    /// Drafts a plan for the goal and stores it.
    ///
    /// A drafted id that collides with a stored plan is replaced by a freshly
    /// generated one.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for a blank goal, otherwise storage errors.
    pub async fn draft_plan(&self, params: &DraftPlan) -> Result<Plan> {
        params.validate()?;
        let mut plan = self.drafter.draft(params).await;

        match self.store.put(plan.clone()).await {
            Err(OrionError::DuplicatePlan { id }) => {
                plan.id = generate_plan_id();
                debug!("Drafted id {id} already stored, renamed to {}", plan.id);
                self.store.put(plan.clone()).await?;
            }
            result => result?,
        }

        info!("Stored plan {} for {}", plan.id, plan.metadata.author);
        Ok(plan)
    }

    /// Retrieves a plan by its ID.
    pub async fn get_plan(&self, params: &Id) -> Result<Option<Plan>> {
        self.store.get(&params.id).await
    }

    /// Lists stored plans, newest first.
    pub async fn list_plans(&self) -> Result<Vec<PlanSummary>> {
        self.store.list().await
    }

    /// Discards a stored plan.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` if no plan has the given id.
    pub async fn cancel_plan(&self, params: &Id) -> Result<()> {
        if !self.store.remove(&params.id).await? {
            return Err(OrionError::PlanNotFound {
                id: params.id.clone(),
            });
        }
        info!("Cancelled plan {}", params.id);
        Ok(())
    }

    /// Starts a lazy run of a stored plan without relaying its updates.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` if no plan has the given id.
    pub async fn start_run(&self, params: &Id) -> Result<PlanRun> {
        let plan = self.load(&params.id).await?;
        Ok(self.executor.execute(&plan))
    }

    /// Runs a stored plan to completion.
    ///
    /// Every update is handed to `observer` and, when a channel is given,
    /// broadcast to that channel's webhooks before the next step proceeds.
    /// A failing step ends the run with [`RunOutcome::Failed`]; that is not
    /// an error.
    ///
    /// # Errors
    ///
    /// `PlanNotFound` if no plan has the given id.
    pub async fn run_plan<F>(&self, params: &RunPlan, mut observer: F) -> Result<RunOutcome>
    where
        F: FnMut(&StepUpdate),
    {
        let plan = self.load(&params.id).await?;
        let mut run = self.executor.execute(&plan);
        let mut terminal: Vec<StepUpdate> = Vec::new();

        while let Some(update) = run.next_update().await {
            observer(&update);
            if let Some(channel) = &params.channel {
                self.dispatcher.fanout(channel, &update).await;
            }
            if update.phase.is_terminal() {
                terminal.push(update);
            }
        }

        let outcome = RunOutcome::from_updates(&plan, &terminal);
        info!("Run of plan {} finished: {}", plan.id, describe(&outcome));
        Ok(outcome)
    }

    /// Relays an informational message to the channel's webhooks.
    pub async fn mirror(&self, params: &MirrorMessage) -> FanoutReport {
        let payload = json!({
            "type": "message",
            "channel": params.channel,
            "text": params.text,
            "user": params.user,
        });
        self.dispatcher.fanout(&params.channel, &payload).await
    }

    async fn load(&self, id: &str) -> Result<Plan> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| OrionError::PlanNotFound { id: id.to_string() })
    }
}

fn describe(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Succeeded { steps, .. } => format!("{} after {steps} steps", Phase::Succeeded),
        RunOutcome::Failed { position, .. } => format!("{} at step {position}", Phase::Failed),
    }
}

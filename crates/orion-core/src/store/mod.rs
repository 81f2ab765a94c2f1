//! Keyed storage of drafted plans.
//!
//! Storage is a capability handed to the orchestrator as an
//! `Arc<dyn PlanStore>`. Two backends ship with the crate:
//!
//! - [`MemoryPlanStore`]: a map behind an async `RwLock`, lost on exit
//! - [`SqlitePlanStore`]: a SQLite file, one connection per operation

use std::collections::HashSet;

use async_trait::async_trait;

use crate::error::{OrionError, Result};
use crate::models::{Plan, PlanSummary};

pub mod memory;
pub mod sqlite;

pub use memory::MemoryPlanStore;
pub use sqlite::SqlitePlanStore;

/// Keyed lookup of plans by identifier.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// Stores a new plan.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if the plan has no steps, repeats a step id or has a
    /// blank id,
    /// `DuplicatePlan` if the id is already taken.
    async fn put(&self, plan: Plan) -> Result<()>;

    /// Fetches a plan, `None` if unknown.
    async fn get(&self, id: &str) -> Result<Option<Plan>>;

    /// Deletes a plan; returns whether it existed.
    async fn remove(&self, id: &str) -> Result<bool>;

    /// Summaries of every stored plan, newest first.
    async fn list(&self) -> Result<Vec<PlanSummary>>;
}

/// Checks the invariants every stored plan must hold.
pub(crate) fn validate_plan(plan: &Plan) -> Result<()> {
    if plan.id.trim().is_empty() {
        return Err(OrionError::invalid_input("id").with_reason("must not be empty"));
    }
    if plan.steps.is_empty() {
        return Err(OrionError::invalid_input("steps").with_reason("a plan needs at least one step"));
    }
    let mut seen = HashSet::new();
    if let Some(step) = plan.steps.iter().find(|step| !seen.insert(step.step_id.as_str())) {
        return Err(OrionError::invalid_input("steps")
            .with_reason(format!("step id '{}' appears more than once", step.step_id)));
    }
    Ok(())
}

/// Sorts summaries newest first, ties broken by id.
pub(crate) fn newest_first(summaries: &mut [PlanSummary]) {
    summaries.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.id.cmp(&b.id))
    });
}

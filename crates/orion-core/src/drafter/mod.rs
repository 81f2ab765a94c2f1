//! Drafting plans from free-text goals.
//!
//! A [`PlanDrafter`] asks a [`DraftingOracle`] for a plan, extracts the JSON
//! object embedded in its reply and normalizes it. Drafting never fails: an
//! unreachable oracle or an unreadable reply yields a deterministic two-step
//! fallback plan.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use orion_core::drafter::{DisabledOracle, PlanDrafter};
//! use orion_core::params::DraftPlan;
//!
//! # async fn example() {
//! let drafter = PlanDrafter::new(Arc::new(DisabledOracle));
//! let plan = drafter.draft(&DraftPlan::new("Rotate API keys")).await;
//! assert_eq!(plan.steps[0].title, "Analyze requirements");
//! # }
//! ```

use std::sync::Arc;

use log::{debug, info, warn};

use crate::models::{Plan, PlanMetadata};
use crate::params::DraftPlan;

mod extract;
mod ids;
pub mod oracle;
mod prompt;

pub use ids::generate_plan_id;
pub use oracle::{
    ChatCompletionsOracle, DisabledOracle, DraftingOracle, OracleError, OraclePrompt,
    DEFAULT_MODEL, DEFAULT_VLLM_BASE_URL, OPENAI_CHAT_COMPLETIONS_URL,
};
pub use prompt::DEFAULT_TOOL_CATALOGUE;

/// Turns goals into validated plans.
#[derive(Clone)]
pub struct PlanDrafter {
    oracle: Arc<dyn DraftingOracle>,
    tools: Vec<String>,
}

impl PlanDrafter {
    /// Creates a drafter advertising the default tool catalogue.
    pub fn new(oracle: Arc<dyn DraftingOracle>) -> Self {
        Self {
            oracle,
            tools: DEFAULT_TOOL_CATALOGUE.iter().map(ToString::to_string).collect(),
        }
    }

    /// Replaces the tool names advertised to the oracle.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tools = tools.into_iter().map(Into::into).collect();
        self
    }

    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    /// Drafts a plan for the request.
    ///
    /// The result always has a non-empty id and at least one step.
    pub async fn draft(&self, request: &DraftPlan) -> Plan {
        let metadata = PlanMetadata::new(
            request.goal.clone(),
            request.environment.clone(),
            request.author.clone(),
        );
        let prompt = prompt::build_prompt(request, &self.tools);

        let reply = match self.oracle.complete(&prompt).await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Drafting oracle unavailable, using fallback plan: {e}");
                return extract::fallback_plan(metadata);
            }
        };

        match extract::parse_plan(&reply, metadata.clone()) {
            Some(plan) => {
                info!("Drafted plan {} with {} steps", plan.id, plan.steps.len());
                plan
            }
            None => {
                debug!("Unparsable oracle reply: {reply}");
                warn!("Drafting oracle reply held no plan object, using fallback plan");
                extract::fallback_plan(metadata)
            }
        }
    }
}

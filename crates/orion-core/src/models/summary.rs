//! Plan summary model for listings.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Plan;

/// Compact view of a stored plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanSummary {
    pub id: String,
    pub goal: String,
    pub environment: String,
    pub author: String,
    pub created_at: Timestamp,
    pub total_steps: u32,
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        Self {
            id: plan.id.clone(),
            goal: plan.metadata.goal.clone(),
            environment: plan.metadata.environment.clone(),
            author: plan.metadata.author.clone(),
            created_at: plan.metadata.created_at,
            total_steps: u32::try_from(plan.steps.len()).unwrap_or(u32::MAX),
        }
    }
}

//! Plan model definition and related functionality.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use super::Step;

/// Who asked for a plan, for what, and where it is meant to run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanMetadata {
    /// Free-text goal the plan was drafted from
    pub goal: String,

    /// Target environment (e.g. `production`, `staging`)
    pub environment: String,

    /// Identifier of the author who requested the plan
    pub author: String,

    /// Timestamp when the plan was drafted (UTC)
    pub created_at: Timestamp,
}

impl PlanMetadata {
    /// Creates metadata stamped with the current time.
    pub fn new(
        goal: impl Into<String>,
        environment: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            goal: goal.into(),
            environment: environment.into(),
            author: author.into(),
            created_at: Timestamp::now(),
        }
    }
}

/// Represents a drafted plan: an ordered sequence of steps.
///
/// A stored plan always has at least one step, and its steps never change
/// after drafting. Running the same plan twice executes the same steps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    /// Unique identifier for the plan
    pub id: String,

    /// Steps in execution order
    pub steps: Vec<Step>,

    /// Drafting context
    pub metadata: PlanMetadata,
}

impl Plan {
    /// Returns the 1-based position of a step within the plan.
    pub fn position_of(&self, step_id: &str) -> Option<usize> {
        self.steps
            .iter()
            .position(|step| step.step_id == step_id)
            .map(|index| index + 1)
    }
}

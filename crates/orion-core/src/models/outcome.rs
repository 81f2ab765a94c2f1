//! Terminal status of a plan run.

use serde::{Deserialize, Serialize};

use super::{Phase, Plan, StepUpdate};

/// How a plan run ended.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum RunOutcome {
    /// Every step succeeded
    Succeeded { plan_id: String, steps: usize },

    /// The run halted at `position` (1-based)
    Failed {
        plan_id: String,
        step_id: String,
        position: usize,
        reason: String,
    },
}

impl RunOutcome {
    /// Derives the outcome of a run from the updates it emitted.
    ///
    /// A run without a failed update is a success; it counts the steps that
    /// reached `succeeded`.
    pub fn from_updates<'a, I>(plan: &Plan, updates: I) -> Self
    where
        I: IntoIterator<Item = &'a StepUpdate>,
    {
        let mut completed = 0;
        for update in updates {
            match update.phase {
                Phase::Succeeded => completed += 1,
                Phase::Failed => {
                    return RunOutcome::Failed {
                        plan_id: plan.id.clone(),
                        step_id: update.step_id.clone(),
                        position: plan.position_of(&update.step_id).unwrap_or(completed + 1),
                        reason: update
                            .error_message()
                            .map(String::from)
                            .unwrap_or_else(|| update.summary.clone()),
                    };
                }
                Phase::Running | Phase::Log => {}
            }
        }
        RunOutcome::Succeeded {
            plan_id: plan.id.clone(),
            steps: completed,
        }
    }

    /// Whether the run completed every step.
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }

    /// Plan the outcome belongs to.
    pub fn plan_id(&self) -> &str {
        match self {
            RunOutcome::Succeeded { plan_id, .. } | RunOutcome::Failed { plan_id, .. } => plan_id,
        }
    }
}

//! Lazy, ordered execution of a plan's steps.
//!
//! [`PlanExecutor::execute`] returns a [`PlanRun`], a cursor over the plan.
//! Every call to [`PlanRun::next_update`] performs exactly one unit of work
//! (start a step, call one tool, wait out an idle step, or close a step) and
//! yields the resulting [`StepUpdate`]. Nothing runs between pulls.
//!
//! For every step the run yields `running`, then one `log` per completed tool
//! call, then exactly one `succeeded` or `failed`. The first `failed` ends
//! the run.
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use async_trait::async_trait;
//! use orion_core::executor::PlanExecutor;
//! use orion_core::models::{Phase, Plan, PlanMetadata, Step, ToolParams};
//! use orion_core::tools::{ToolError, ToolInvoker};
//! use serde_json::{json, Value};
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl ToolInvoker for Echo {
//!     async fn invoke(&self, tool: &str, _params: &ToolParams) -> Result<Value, ToolError> {
//!         Ok(json!({ "tool": tool }))
//!     }
//! }
//!
//! # async fn example() {
//! let plan = Plan {
//!     id: "plan_1".into(),
//!     steps: vec![Step::new("step_1", "Triage").with_tools(["inbox.triage"])],
//!     metadata: PlanMetadata::new("Clear the inbox", "production", "U1"),
//! };
//!
//! let executor = PlanExecutor::new(Arc::new(Echo)).with_idle_delay(Duration::ZERO);
//! let mut run = executor.execute(&plan);
//! let mut phases = Vec::new();
//! while let Some(update) = run.next_update().await {
//!     phases.push(update.phase);
//! }
//! assert_eq!(phases, vec![Phase::Running, Phase::Log, Phase::Succeeded]);
//! # }
//! ```

use std::mem;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, Stream};
use log::{debug, warn};
use serde_json::Value;

use crate::models::{Plan, StepUpdate, ToolParams};
use crate::tools::ToolInvoker;


/// Pause taken by steps that reference no tools.
pub const DEFAULT_IDLE_DELAY: Duration = Duration::from_secs(1);

/// Runs plans against a tool invoker.
#[derive(Clone)]
pub struct PlanExecutor {
    invoker: Arc<dyn ToolInvoker>,
    idle_delay: Duration,
}

impl PlanExecutor {
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            invoker,
            idle_delay: DEFAULT_IDLE_DELAY,
        }
    }

    /// Overrides the pause taken by tool-less steps.
    pub fn with_idle_delay(mut self, idle_delay: Duration) -> Self {
        self.idle_delay = idle_delay;
        self
    }

    pub fn idle_delay(&self) -> Duration {
        self.idle_delay
    }

    /// Starts a run. The plan is read once; later changes to the caller's
    /// copy do not affect the run.
    pub fn execute(&self, plan: &Plan) -> PlanRun {
        debug!("Starting run of plan {} ({} steps)", plan.id, plan.steps.len());
        PlanRun {
            plan: plan.clone(),
            invoker: Arc::clone(&self.invoker),
            idle_delay: self.idle_delay,
            cursor: Cursor::Enter { step: 0 },
        }
    }
}

/// Position of a run between two pulls.
#[derive(Debug)]
enum Cursor {
    /// Next pull announces step `step`
    Enter { step: usize },
    /// Next pull calls tool `tool` of step `step`
    Invoke {
        step: usize,
        tool: usize,
        last: Option<Value>,
    },
    /// Next pull waits out a tool-less step and closes it
    Idle { step: usize },
    /// Next pull closes step `step`
    Settle { step: usize, last: Option<Value> },
    Halted,
}

/// One in-progress execution of a plan.
///
/// Not restartable: once [`PlanRun::next_update`] returns `None` it keeps
/// returning `None`. Dropping a pending `next_update` future also halts the
/// run.
pub struct PlanRun {
    plan: Plan,
    invoker: Arc<dyn ToolInvoker>,
    idle_delay: Duration,
    cursor: Cursor,
}

impl PlanRun {
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Whether the run has nothing left to yield.
    pub fn is_finished(&self) -> bool {
        match self.cursor {
            Cursor::Halted => true,
            Cursor::Enter { step } => step >= self.plan.steps.len(),
            _ => false,
        }
    }

    /// Performs one unit of work and returns its update.
    pub async fn next_update(&mut self) -> Option<StepUpdate> {
        let cursor = mem::replace(&mut self.cursor, Cursor::Halted);
        let (update, next) = match cursor {
            Cursor::Halted => return None,
            Cursor::Enter { step } => {
                let current = self.plan.steps.get(step)?;
                let next = if current.tool_refs.is_empty() {
                    Cursor::Idle { step }
                } else {
                    Cursor::Invoke {
                        step,
                        tool: 0,
                        last: None,
                    }
                };
                (StepUpdate::running(&self.plan.id, current), next)
            }
            Cursor::Invoke { step, tool, last } => self.invoke(step, tool, last).await?,
            Cursor::Idle { step } => {
                tokio::time::sleep(self.idle_delay).await;
                let current = self.plan.steps.get(step)?;
                (
                    StepUpdate::succeeded(&self.plan.id, current, None),
                    Cursor::Enter { step: step + 1 },
                )
            }
            Cursor::Settle { step, last } => {
                let current = self.plan.steps.get(step)?;
                (
                    StepUpdate::succeeded(&self.plan.id, current, last),
                    Cursor::Enter { step: step + 1 },
                )
            }
        };
        self.cursor = next;
        Some(update)
    }

    async fn invoke(
        &self,
        step: usize,
        tool: usize,
        last: Option<Value>,
    ) -> Option<(StepUpdate, Cursor)> {
        let current = self.plan.steps.get(step)?;
        let Some(name) = current.tool_refs.get(tool) else {
            return Some((
                StepUpdate::succeeded(&self.plan.id, current, last),
                Cursor::Enter { step: step + 1 },
            ));
        };

        let empty = ToolParams::new();
        let params = current.params.as_ref().unwrap_or(&empty);

        match self.invoker.invoke(name, params).await {
            Ok(result) => {
                let update = StepUpdate::log(&self.plan.id, current, name, &result);
                let next = if tool + 1 < current.tool_refs.len() {
                    Cursor::Invoke {
                        step,
                        tool: tool + 1,
                        last: Some(result),
                    }
                } else {
                    Cursor::Settle {
                        step,
                        last: Some(result),
                    }
                };
                Some((update, next))
            }
            Err(e) => {
                warn!(
                    "Plan {} halted at step {}: {e}",
                    self.plan.id, current.step_id
                );
                Some((
                    StepUpdate::failed(&self.plan.id, current, name, &e.message),
                    Cursor::Halted,
                ))
            }
        }
    }

    /// Adapts the run into a stream of updates.
    pub fn into_stream(self) -> impl Stream<Item = StepUpdate> + Send {
        stream::unfold(self, |mut run| async move {
            let update = run.next_update().await?;
            Some((update, run))
        })
    }
}

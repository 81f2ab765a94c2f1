//! Data models for plans, steps and execution updates.
//!
//! Display implementations for these models live in
//! [`crate::display`], keeping the data structures free of presentation
//! logic.
//!
//! # Model Overview
//!
//! - [`Plan`]: an ordered, immutable list of [`Step`]s drafted from a goal,
//!   plus the [`PlanMetadata`] describing who asked for it and where it runs
//! - [`StepUpdate`]: one observable phase transition emitted while a plan is
//!   executing ([`Phase::Running`], [`Phase::Log`], [`Phase::Succeeded`],
//!   [`Phase::Failed`])
//! - [`RunOutcome`]: the terminal status of one execution
//! - [`PlanSummary`]: compact listing form of a stored plan
//!
//! # Examples
//!
//! ```rust
//! use orion_core::models::{Phase, Step, StepUpdate};
//!
//! let step = Step::new("step_1", "Refresh vectors").with_tools(["vector.refresh"]);
//! let update = StepUpdate::running("plan_1", &step);
//! assert_eq!(update.phase, Phase::Running);
//! assert_eq!(update.summary, "Executing: Refresh vectors");
//! ```

pub mod outcome;
pub mod plan;
pub mod step;
pub mod summary;
pub mod update;

pub use outcome::RunOutcome;
pub use plan::{Plan, PlanMetadata};
pub use step::{Step, ToolParams};
pub use summary::PlanSummary;
pub use update::{Phase, StepUpdate};

//! Markdown formatting for plans, run updates and delivery reports.
//!
//! Domain models implement [`std::fmt::Display`] directly (see [`models`]);
//! collections and confirmations use the small wrapper types re-exported
//! here. All output is markdown meant for the CLI's terminal renderer and is
//! not a stable format.

pub mod collections;
pub mod datetime;
pub mod models;
pub mod status;

pub use collections::PlanSummaries;
pub use datetime::LocalDateTime;
pub use status::OperationStatus;

//! Step updates emitted while a plan executes.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::Step;

/// Maximum number of characters of a tool result carried in a log summary.
pub const LOG_SUMMARY_LIMIT: usize = 200;

/// Type-safe enumeration of execution phases.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Step has started
    Running,

    /// A tool call within the step completed
    Log,

    /// Step finished successfully
    Succeeded,

    /// Step failed; the run halts after this update
    Failed,
}

impl FromStr for Phase {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "running" => Ok(Phase::Running),
            "log" => Ok(Phase::Log),
            "succeeded" => Ok(Phase::Succeeded),
            "failed" => Ok(Phase::Failed),
            _ => Err(format!("Invalid phase: {s}")),
        }
    }
}

impl Phase {
    /// Wire representation of the phase.
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Running => "running",
            Phase::Log => "log",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        }
    }

    /// Whether this phase closes a step.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }

    /// Icon used when rendering the phase in a terminal or chat message.
    pub fn icon(&self) -> &'static str {
        match self {
            Phase::Running => "⏳",
            Phase::Log => "📝",
            Phase::Succeeded => "✅",
            Phase::Failed => "❌",
        }
    }
}

/// One observable phase transition of one step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StepUpdate {
    pub plan_id: String,
    pub step_id: String,
    pub phase: Phase,
    pub title: String,
    pub summary: String,
    pub data: Option<Value>,
}

impl StepUpdate {
    /// Update announcing that a step has started.
    pub fn running(plan_id: &str, step: &Step) -> Self {
        let summary = if step.summary.trim().is_empty() {
            format!("Executing: {}", step.title)
        } else {
            step.summary.clone()
        };
        Self {
            plan_id: plan_id.to_string(),
            step_id: step.step_id.clone(),
            phase: Phase::Running,
            title: step.title.clone(),
            summary,
            data: None,
        }
    }

    /// Update carrying the result of one completed tool call.
    pub fn log(plan_id: &str, step: &Step, tool: &str, result: &Value) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            step_id: step.step_id.clone(),
            phase: Phase::Log,
            title: format!("Tool: {tool}"),
            summary: truncate_chars(&result.to_string(), LOG_SUMMARY_LIMIT),
            data: Some(json!({ "tool": tool, "result": result })),
        }
    }

    /// Terminal update for a step whose tool calls all completed.
    pub fn succeeded(plan_id: &str, step: &Step, last_result: Option<Value>) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            step_id: step.step_id.clone(),
            phase: Phase::Succeeded,
            title: step.title.clone(),
            summary: format!("Completed: {}", step.title),
            data: last_result,
        }
    }

    /// Terminal update for a step that could not complete.
    pub fn failed(plan_id: &str, step: &Step, tool: &str, message: &str) -> Self {
        Self {
            plan_id: plan_id.to_string(),
            step_id: step.step_id.clone(),
            phase: Phase::Failed,
            title: step.title.clone(),
            summary: format!("Failed: {message}"),
            data: Some(json!({ "tool": tool, "error": message })),
        }
    }

    /// Error message of a failed update, if any.
    pub fn error_message(&self) -> Option<&str> {
        if self.phase != Phase::Failed {
            return None;
        }
        self.data
            .as_ref()
            .and_then(|data| data.get("error"))
            .and_then(Value::as_str)
    }
}

/// Keeps at most `limit` characters, never splitting a UTF-8 sequence.
pub(crate) fn truncate_chars(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((end, _)) => text[..end].to_string(),
        None => text.to_string(),
    }
}

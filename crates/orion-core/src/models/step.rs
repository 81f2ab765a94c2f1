//! Step model definition and related functionality.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Parameters passed to every tool a step references.
pub type ToolParams = Map<String, Value>;

/// Represents an individual unit of work within a plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Step {
    /// Identifier assigned at drafting time, unique within its plan
    pub step_id: String,

    /// Brief title of the step
    pub title: String,

    /// What the step does
    #[serde(default)]
    pub summary: String,

    /// Tools to invoke, in order
    #[serde(default, alias = "mcp_tools")]
    pub tool_refs: Vec<String>,

    /// Parameters handed to each tool invocation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<ToolParams>,

    /// Rough duration estimate proposed at drafting time (e.g. `5m`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
}

impl Step {
    /// Creates a step without tools, parameters or estimate.
    pub fn new(step_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            title: title.into(),
            summary: String::new(),
            tool_refs: Vec::new(),
            params: None,
            estimated_duration: None,
        }
    }

    /// Sets the summary.
    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Sets the ordered tool references.
    pub fn with_tools<I, S>(mut self, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_refs = tools.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the tool parameters.
    pub fn with_params(mut self, params: ToolParams) -> Self {
        self.params = Some(params);
        self
    }

    /// Sets the duration estimate.
    pub fn with_estimate(mut self, estimate: impl Into<String>) -> Self {
        self.estimated_duration = Some(estimate.into());
        self
    }
}

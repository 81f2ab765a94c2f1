//! Invocation of named external tools.
//!
//! A [`ToolInvoker`] never lets a failure escape as anything other than a
//! [`ToolError`] descriptor; whether that descriptor fails a step is the
//! caller's decision (the [`crate::executor::PlanExecutor`] always treats it
//! as one).

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::models::ToolParams;

pub mod http;

pub use http::HttpToolInvoker;

/// Error descriptor for a failed tool call.
#[derive(Debug, Clone, Error, PartialEq, Eq, Serialize)]
#[error("Tool '{tool}' failed: {message}")]
pub struct ToolError {
    pub tool: String,
    pub message: String,
}

impl ToolError {
    pub fn new(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

/// Calls one named tool with parameters.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    /// Invokes `tool` and returns its opaque JSON result.
    async fn invoke(&self, tool: &str, params: &ToolParams) -> Result<serde_json::Value, ToolError>;
}

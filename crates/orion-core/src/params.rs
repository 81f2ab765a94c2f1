//! Parameter structures for orchestration operations.
//!
//! These carry no framework derives beyond serde; the CLI converts its clap
//! arguments into them.

use serde::{Deserialize, Serialize};

use crate::error::{OrionError, Result};

pub const DEFAULT_ENVIRONMENT: &str = "production";
pub const DEFAULT_AUTHOR: &str = "unknown";

/// Request to draft a new plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DraftPlan {
    /// Free-text goal
    pub goal: String,
    /// Target environment
    #[serde(default = "default_environment")]
    pub environment: String,
    /// Requesting user
    #[serde(default = "default_author")]
    pub author: String,
}

fn default_environment() -> String {
    DEFAULT_ENVIRONMENT.to_string()
}

fn default_author() -> String {
    DEFAULT_AUTHOR.to_string()
}

impl DraftPlan {
    pub fn new(goal: impl Into<String>) -> Self {
        Self {
            goal: goal.into(),
            environment: default_environment(),
            author: default_author(),
        }
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = environment.into();
        self
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    /// Rejects blank goals.
    ///
    /// # Errors
    ///
    /// `InvalidInput` for the `goal` field.
    pub fn validate(&self) -> Result<()> {
        if self.goal.trim().is_empty() {
            return Err(OrionError::invalid_input("goal").with_reason("must not be empty"));
        }
        Ok(())
    }
}

/// Identifies a stored plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Id {
    pub id: String,
}

impl Id {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Request to run a stored plan.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RunPlan {
    pub id: String,
    /// Channel whose webhooks receive every update
    #[serde(default)]
    pub channel: Option<String>,
}

/// Informational message to relay to a channel's webhooks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MirrorMessage {
    pub channel: String,
    pub text: String,
    #[serde(default)]
    pub user: Option<String>,
}

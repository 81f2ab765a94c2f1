//! Environment-driven settings.
//!
//! Every field has a default, so an empty environment yields a working (if
//! unsigned and offline-drafting) configuration.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::drafter::{ChatCompletionsOracle, DEFAULT_MODEL, DEFAULT_VLLM_BASE_URL};
use crate::error::{OrionError, Result};
use crate::signature::SignatureCodec;
use crate::tools::http::DEFAULT_TOOL_BASE_URL;
use crate::webhook::SubscriptionRegistry;

pub const ENV_TOOL_BASE_URL: &str = "MCP_BASE_URL";
pub const ENV_VLLM_BASE_URL: &str = "VLLM_BASE_URL";
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_OPENAI_MODEL: &str = "OPENAI_MODEL";
pub const ENV_WEBHOOK_SIGNING_SECRET: &str = "WEBHOOK_SIGNING_SECRET";
pub const ENV_INBOUND_SIGNING_SECRET: &str = "SLACK_SIGNING_SECRET";
pub const ENV_WEBHOOK_MAP: &str = "ORION_WEBHOOK_MAP";
pub const ENV_TOOL_TIMEOUT: &str = "ORION_TOOL_TIMEOUT_SECS";
pub const ENV_ORACLE_TIMEOUT: &str = "ORION_ORACLE_TIMEOUT_SECS";
pub const ENV_WEBHOOK_TIMEOUT: &str = "ORION_WEBHOOK_TIMEOUT_SECS";
pub const ENV_IDLE_DELAY: &str = "ORION_IDLE_DELAY_MS";

/// Runtime configuration.
#[derive(Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the tool gateway
    pub tool_base_url: String,
    /// Base URL of the self-hosted completions server
    pub vllm_base_url: String,
    /// Hosted OpenAI key; when set it takes precedence over the vLLM server
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    /// Secret signing outbound webhook deliveries
    pub webhook_signing_secret: Option<String>,
    /// Secret verifying inbound signed requests
    pub inbound_signing_secret: Option<String>,
    /// JSON file mapping channel names to webhook URLs
    pub webhook_map: Option<PathBuf>,
    pub tool_timeout_secs: u64,
    pub oracle_timeout_secs: u64,
    pub webhook_timeout_secs: u64,
    /// Pause for steps that reference no tools
    pub idle_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tool_base_url: DEFAULT_TOOL_BASE_URL.to_string(),
            vllm_base_url: DEFAULT_VLLM_BASE_URL.to_string(),
            openai_api_key: None,
            openai_model: DEFAULT_MODEL.to_string(),
            webhook_signing_secret: None,
            inbound_signing_secret: None,
            webhook_map: None,
            tool_timeout_secs: 30,
            oracle_timeout_secs: 60,
            webhook_timeout_secs: 10,
            idle_delay_ms: 1000,
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("tool_base_url", &self.tool_base_url)
            .field("vllm_base_url", &self.vllm_base_url)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_model", &self.openai_model)
            .field(
                "webhook_signing_secret",
                &self.webhook_signing_secret.as_ref().map(|_| "<redacted>"),
            )
            .field(
                "inbound_signing_secret",
                &self.inbound_signing_secret.as_ref().map(|_| "<redacted>"),
            )
            .field("webhook_map", &self.webhook_map)
            .field("tool_timeout_secs", &self.tool_timeout_secs)
            .field("oracle_timeout_secs", &self.oracle_timeout_secs)
            .field("webhook_timeout_secs", &self.webhook_timeout_secs)
            .field("idle_delay_ms", &self.idle_delay_ms)
            .finish()
    }
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads settings through an arbitrary variable lookup. Blank values
    /// count as unset.
    ///
    /// # Errors
    ///
    /// `InvalidInput` if a numeric variable does not parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let number = |name: &str, default: u64| -> Result<u64> {
            match get(name) {
                Some(value) => value.trim().parse().map_err(|_| {
                    OrionError::invalid_input(name).with_reason(format!("'{value}' is not a whole number"))
                }),
                None => Ok(default),
            }
        };

        let defaults = Self::default();
        Ok(Self {
            tool_base_url: get(ENV_TOOL_BASE_URL).unwrap_or(defaults.tool_base_url),
            vllm_base_url: get(ENV_VLLM_BASE_URL).unwrap_or(defaults.vllm_base_url),
            openai_api_key: get(ENV_OPENAI_API_KEY),
            openai_model: get(ENV_OPENAI_MODEL).unwrap_or(defaults.openai_model),
            webhook_signing_secret: get(ENV_WEBHOOK_SIGNING_SECRET),
            inbound_signing_secret: get(ENV_INBOUND_SIGNING_SECRET),
            webhook_map: get(ENV_WEBHOOK_MAP).map(PathBuf::from),
            tool_timeout_secs: number(ENV_TOOL_TIMEOUT, defaults.tool_timeout_secs)?,
            oracle_timeout_secs: number(ENV_ORACLE_TIMEOUT, defaults.oracle_timeout_secs)?,
            webhook_timeout_secs: number(ENV_WEBHOOK_TIMEOUT, defaults.webhook_timeout_secs)?,
            idle_delay_ms: number(ENV_IDLE_DELAY, defaults.idle_delay_ms)?,
        })
    }

    pub fn tool_timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    pub fn oracle_timeout(&self) -> Duration {
        Duration::from_secs(self.oracle_timeout_secs)
    }

    pub fn webhook_timeout(&self) -> Duration {
        Duration::from_secs(self.webhook_timeout_secs)
    }

    pub fn idle_delay(&self) -> Duration {
        Duration::from_millis(self.idle_delay_ms)
    }

    /// Chat completions oracle: hosted OpenAI when a key is set, otherwise
    /// the vLLM server.
    ///
    /// # Errors
    ///
    /// `Configuration` if the HTTP client cannot be built.
    pub fn oracle(&self) -> Result<ChatCompletionsOracle> {
        let oracle = match &self.openai_api_key {
            Some(key) => ChatCompletionsOracle::openai(key.clone(), self.oracle_timeout())?,
            None => ChatCompletionsOracle::vllm(&self.vllm_base_url, self.oracle_timeout())?,
        };
        Ok(oracle.with_model(self.openai_model.clone()))
    }

    /// Codec signing outbound deliveries, if a secret is configured.
    ///
    /// # Errors
    ///
    /// As [`SignatureCodec::new`].
    pub fn webhook_codec(&self) -> Result<Option<SignatureCodec>> {
        self.webhook_signing_secret
            .as_deref()
            .map(SignatureCodec::new)
            .transpose()
    }

    /// Codec verifying inbound requests, if a secret is configured.
    ///
    /// # Errors
    ///
    /// As [`SignatureCodec::new`].
    pub fn inbound_codec(&self) -> Result<Option<SignatureCodec>> {
        self.inbound_signing_secret
            .as_deref()
            .map(SignatureCodec::new)
            .transpose()
    }

    /// Loads the webhook map, or an empty registry when none is configured.
    ///
    /// # Errors
    ///
    /// As [`SubscriptionRegistry::from_file`].
    pub fn registry(&self) -> Result<SubscriptionRegistry> {
        match &self.webhook_map {
            Some(path) => SubscriptionRegistry::from_file(path),
            None => Ok(SubscriptionRegistry::new()),
        }
    }
}

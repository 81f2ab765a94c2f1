//! Static channel → webhook subscription mapping.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use reqwest::Url;
use serde::Serialize;

use crate::error::{OrionError, Result};

/// Subscribers of one channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebhookSubscription {
    pub channel_name: String,
    pub endpoint_urls: BTreeSet<Url>,
}

/// Read-only lookup of subscriptions by channel name.
///
/// The on-disk form is a JSON object mapping channel names to URL arrays:
///
/// ```json
/// { "#orion-ops": ["https://hooks.example.com/a", "https://hooks.example.com/b"] }
/// ```
#[derive(Debug, Clone, Default)]
pub struct SubscriptionRegistry {
    channels: BTreeMap<String, WebhookSubscription>,
}

impl SubscriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one endpoint to a channel.
    pub fn subscribe(&mut self, channel: impl Into<String>, endpoint: Url) -> &mut Self {
        let channel = channel.into();
        self.channels
            .entry(channel.clone())
            .or_insert_with(|| WebhookSubscription {
                channel_name: channel,
                endpoint_urls: BTreeSet::new(),
            })
            .endpoint_urls
            .insert(endpoint);
        self
    }

    /// Parses the JSON mapping.
    ///
    /// # Errors
    ///
    /// `Serialization` if the document is not a map of string arrays,
    /// `InvalidInput` if any entry is not an absolute URL.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (channel, urls) in raw {
            for url in urls {
                let endpoint = Url::parse(&url).map_err(|e| {
                    OrionError::invalid_input(format!("webhooks[{channel}]"))
                        .with_reason(format!("'{url}' is not a valid URL: {e}"))
                })?;
                registry.subscribe(channel.clone(), endpoint);
            }
        }
        Ok(registry)
    }

    /// Loads the JSON mapping from a file.
    ///
    /// # Errors
    ///
    /// `FileSystem` if the file cannot be read, otherwise as
    /// [`SubscriptionRegistry::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| OrionError::FileSystem {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    /// Subscription of a channel, if any endpoint is registered.
    pub fn subscription(&self, channel: &str) -> Option<&WebhookSubscription> {
        self.channels.get(channel)
    }

    /// Endpoints of a channel; empty for unknown channels.
    pub fn endpoints(&self, channel: &str) -> Vec<Url> {
        self.subscription(channel)
            .map(|sub| sub.endpoint_urls.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Registered channel names.
    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

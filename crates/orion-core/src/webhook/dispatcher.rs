//! Parallel, best-effort delivery of one event to a channel's subscribers.

use std::time::Duration;

use futures::future::join_all;
use jiff::Timestamp;
use log::{debug, info, warn};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Url};
use serde::Serialize;
use uuid::Uuid;

use super::SubscriptionRegistry;
use crate::error::{OrionError, Result};
use crate::signature::SignatureCodec;

/// Header carrying the per-event idempotency token.
pub const IDEMPOTENCY_HEADER: &str = "x-idempotency-key";

/// Header carrying the `v0=<hex>` signature of the body.
pub const SIGNATURE_HEADER: &str = "x-webhook-signature";

/// Header carrying the timestamp the signature was computed with.
pub const TIMESTAMP_HEADER: &str = "x-webhook-timestamp";

/// One logical event, ready to be sent to any number of endpoints.
///
/// Every endpoint (and every retry) of the same event receives the same
/// bytes, the same idempotency key and the same signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    /// Serialized payload; the exact bytes that were signed
    pub body: Vec<u8>,
    pub idempotency_key: Uuid,
    pub timestamp: i64,
    pub signature: Option<String>,
}

impl Broadcast {
    /// Serializes the payload once and signs it if a codec is given.
    ///
    /// # Errors
    ///
    /// `Serialization` if the payload cannot be encoded as JSON.
    pub fn new<P>(payload: &P, codec: Option<&SignatureCodec>, timestamp: i64) -> Result<Self>
    where
        P: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(payload)?;
        let signature = codec.map(|codec| codec.sign(timestamp, &body));
        Ok(Self {
            body,
            idempotency_key: Uuid::new_v4(),
            timestamp,
            signature,
        })
    }
}

/// Result of delivering a broadcast to one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum DeliveryOutcome {
    /// Endpoint answered 2xx
    Delivered { status: u16 },
    /// Endpoint answered with a non-success status
    Rejected { status: u16 },
    /// Transport failure or timeout
    Unreachable { reason: String },
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered { .. })
    }
}

/// Delivery record for one endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub endpoint: Url,
    #[serde(flatten)]
    pub outcome: DeliveryOutcome,
}

/// What happened to one fan-out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FanoutReport {
    pub channel: String,
    /// `None` when nothing was sent
    pub idempotency_key: Option<Uuid>,
    pub deliveries: Vec<Delivery>,
}

impl FanoutReport {
    fn skipped(channel: &str) -> Self {
        Self {
            channel: channel.to_string(),
            idempotency_key: None,
            deliveries: Vec::new(),
        }
    }

    /// True when no request was issued.
    pub fn is_noop(&self) -> bool {
        self.deliveries.is_empty()
    }

    pub fn delivered(&self) -> usize {
        self.deliveries
            .iter()
            .filter(|delivery| delivery.outcome.is_delivered())
            .count()
    }

    pub fn failed(&self) -> usize {
        self.deliveries.len() - self.delivered()
    }
}

/// Relays events to every webhook subscribed to a channel.
#[derive(Debug, Clone)]
pub struct WebhookDispatcher {
    client: Client,
    registry: SubscriptionRegistry,
    codec: Option<SignatureCodec>,
}

impl WebhookDispatcher {
    /// Creates an unsigned dispatcher whose deliveries give up after
    /// `timeout`.
    ///
    /// # Errors
    ///
    /// Returns `OrionError::Configuration` if the HTTP client cannot be built.
    pub fn new(registry: SubscriptionRegistry, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            OrionError::configuration(format!("Failed to build webhook client: {e}"))
        })?;
        Ok(Self::with_client(client, registry))
    }

    /// Creates an unsigned dispatcher around an existing client.
    pub fn with_client(client: Client, registry: SubscriptionRegistry) -> Self {
        Self {
            client,
            registry,
            codec: None,
        }
    }

    /// Signs every broadcast with the given codec.
    pub fn with_signing(mut self, codec: SignatureCodec) -> Self {
        self.codec = Some(codec);
        self
    }

    pub fn registry(&self) -> &SubscriptionRegistry {
        &self.registry
    }

    pub fn is_signing(&self) -> bool {
        self.codec.is_some()
    }

    /// Broadcasts `payload` to every subscriber of `channel`.
    ///
    /// A channel without subscribers issues no request. Failures of single
    /// endpoints are logged and reported, never returned as errors; the call
    /// resolves once every delivery has finished.
    pub async fn fanout<P>(&self, channel: &str, payload: &P) -> FanoutReport
    where
        P: Serialize + ?Sized,
    {
        if self.registry.endpoints(channel).is_empty() {
            debug!("No webhooks subscribed to {channel}, skipping fan-out");
            return FanoutReport::skipped(channel);
        }

        let broadcast = match Broadcast::new(payload, self.codec.as_ref(), Timestamp::now().as_second()) {
            Ok(broadcast) => broadcast,
            Err(e) => {
                warn!("Dropping fan-out to {channel}: {e}");
                return FanoutReport::skipped(channel);
            }
        };

        self.deliver(channel, &broadcast).await
    }

    /// Sends an already prepared broadcast to every subscriber of `channel`.
    ///
    /// Re-delivering the same broadcast reuses its idempotency key and
    /// signature, so receivers can discard duplicates.
    pub async fn deliver(&self, channel: &str, broadcast: &Broadcast) -> FanoutReport {
        let endpoints = self.registry.endpoints(channel);
        if endpoints.is_empty() {
            return FanoutReport::skipped(channel);
        }

        let outcomes = join_all(endpoints.iter().map(|endpoint| self.post(endpoint, broadcast))).await;
        let deliveries: Vec<Delivery> = endpoints
            .into_iter()
            .zip(outcomes)
            .map(|(endpoint, outcome)| Delivery { endpoint, outcome })
            .collect();

        let report = FanoutReport {
            channel: channel.to_string(),
            idempotency_key: Some(broadcast.idempotency_key),
            deliveries,
        };
        info!(
            "Fan-out {} to {channel}: {} delivered, {} failed",
            broadcast.idempotency_key,
            report.delivered(),
            report.failed()
        );
        report
    }

    async fn post(&self, endpoint: &Url, broadcast: &Broadcast) -> DeliveryOutcome {
        let mut request = self
            .client
            .post(endpoint.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(IDEMPOTENCY_HEADER, broadcast.idempotency_key.to_string());
        if let Some(signature) = &broadcast.signature {
            request = request
                .header(SIGNATURE_HEADER, signature.as_str())
                .header(TIMESTAMP_HEADER, broadcast.timestamp.to_string());
        }

        match request.body(broadcast.body.clone()).send().await {
            Ok(response) if response.status().is_success() => DeliveryOutcome::Delivered {
                status: response.status().as_u16(),
            },
            Ok(response) => {
                let status = response.status().as_u16();
                warn!("Webhook {endpoint} rejected event with HTTP {status}");
                DeliveryOutcome::Rejected { status }
            }
            Err(e) => {
                warn!("Webhook fan-out failed for {endpoint}: {e}");
                DeliveryOutcome::Unreachable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

//! Signed, idempotent webhook fan-out.
//!
//! Channels map to sets of subscriber URLs through a
//! [`SubscriptionRegistry`]. A [`WebhookDispatcher`] turns one logical event
//! into one [`Broadcast`] (one body, one idempotency key, at most one
//! signature) and delivers it to every subscriber of the channel in parallel.

pub mod dispatcher;
pub mod registry;

pub use dispatcher::{
    Broadcast, Delivery, DeliveryOutcome, FanoutReport, WebhookDispatcher, IDEMPOTENCY_HEADER,
    SIGNATURE_HEADER, TIMESTAMP_HEADER,
};
pub use registry::{SubscriptionRegistry, WebhookSubscription};

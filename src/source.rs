// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Subscription source contract.
//!
//! A source maintains the streaming-pull connection to the broker and pushes
//! one `(InboundMessage, AckHandle)` pair per delivery to the registered
//! handler, on its own worker tasks. Deliveries for the same subscription may
//! run concurrently. The adapter consumes this contract; it never implements
//! connection, retry, or backoff logic itself.

use crate::error::Error;
use crate::message::{AckHandle, InboundMessage};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name of a subscription on the messaging service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SubscriptionName(String);

impl SubscriptionName {
    /// Parses and validates a subscription name.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidConfiguration {
                reason: "subscription name must be non-empty".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the subscription name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the owned subscription name.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl AsRef<str> for SubscriptionName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::borrow::Borrow<str> for SubscriptionName {
    fn borrow(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for SubscriptionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for SubscriptionName {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<SubscriptionName> for String {
    fn from(value: SubscriptionName) -> Self {
        value.into_string()
    }
}

/// Callback invoked by the subscription source once per delivered message.
///
/// Invocations are independent and potentially concurrent. An `Err` return
/// surfaces the processing failure to the source, whose own retry/backoff
/// policy then governs redelivery.
#[async_trait]
pub trait DeliveryHandler: Send + Sync {
    /// Handles one delivery.
    async fn on_message(&self, message: InboundMessage, ack: AckHandle) -> Result<(), Error>;
}

/// Source-side control surface for one active listener.
pub trait ListenerControl: Send {
    /// Requests asynchronous shutdown of the listener.
    ///
    /// Returns immediately; in-flight deliveries already past the callback
    /// boundary run to completion or failure on their own tasks.
    fn stop_async(self: Box<Self>);
}

/// Handle to an active subscription listener.
pub struct ListenerHandle {
    inner: Box<dyn ListenerControl>,
}

impl ListenerHandle {
    /// Wraps a source-provided listener control.
    pub fn new(inner: Box<dyn ListenerControl>) -> Self {
        Self { inner }
    }

    /// Requests asynchronous shutdown and returns immediately.
    pub fn stop_async(self) {
        self.inner.stop_async();
    }
}

impl std::fmt::Debug for ListenerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ListenerHandle")
    }
}

/// A subscription source that pushes messages to registered handlers.
pub trait SubscriptionSource: Send + Sync {
    /// Registers a delivery handler for the given subscription.
    ///
    /// The returned handle is the only way to stop the listener.
    fn subscribe(
        &self,
        subscription: &SubscriptionName,
        handler: Arc<dyn DeliveryHandler>,
    ) -> Result<ListenerHandle, Error>;
}

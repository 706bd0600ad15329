// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! In-memory subscription source.
//!
//! Process-local and ephemeral. Each `push()` spawns one task per delivery,
//! mimicking the worker pool of a streaming-pull connection: deliveries for
//! the same subscription run concurrently and the handler's result is
//! observable through the returned join handle. Ack/nack resolutions can be
//! reported on an optional outcome channel for callers interested in delivery
//! outcomes.

use crate::error::Error;
use crate::message::{AckHandle, AckReplyHandler, InboundMessage};
use crate::source::{DeliveryHandler, ListenerControl, ListenerHandle, SubscriptionName, SubscriptionSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Final status of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckStatus {
    /// The delivery was acknowledged.
    Ack,
    /// The delivery was negatively acknowledged.
    Nack,
}

/// An acknowledgement event emitted when a delivery is resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AckEvent {
    /// Subscription the delivery belonged to.
    pub subscription: SubscriptionName,
    /// Resolution reported by the consumer side.
    pub status: AckStatus,
}

struct SourceState {
    listeners: Mutex<HashMap<SubscriptionName, Arc<dyn DeliveryHandler>>>,
    outcomes: Option<mpsc::Sender<AckEvent>>,
}

/// In-memory implementation of [`SubscriptionSource`].
///
/// Thread-safe and cheaply cloneable. At most one listener per subscription.
#[derive(Clone)]
pub struct InMemorySubscriptionSource {
    state: Arc<SourceState>,
}

impl InMemorySubscriptionSource {
    /// Creates a source that does not report ack outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Arc::new(SourceState {
                listeners: Mutex::new(HashMap::new()),
                outcomes: None,
            }),
        }
    }

    /// Creates a source that reports every ack/nack on the given channel.
    #[must_use]
    pub fn with_outcomes(sender: mpsc::Sender<AckEvent>) -> Self {
        Self {
            state: Arc::new(SourceState {
                listeners: Mutex::new(HashMap::new()),
                outcomes: Some(sender),
            }),
        }
    }

    /// Returns `true` while a listener is registered for the subscription.
    #[must_use]
    pub fn has_listener(&self, subscription: &SubscriptionName) -> bool {
        self.state.listeners.lock().contains_key(subscription)
    }

    /// Delivers one message to the registered handler on its own task.
    ///
    /// The returned join handle carries the handler's result, so callers can
    /// observe propagated processing failures the way a real source would.
    /// Fails with [`Error::ListenerStopped`] when no listener is registered.
    pub fn push(
        &self,
        subscription: &SubscriptionName,
        message: InboundMessage,
    ) -> Result<JoinHandle<Result<(), Error>>, Error> {
        let handler = self
            .state
            .listeners
            .lock()
            .get(subscription)
            .cloned()
            .ok_or_else(|| Error::ListenerStopped {
                subscription: subscription.clone(),
            })?;

        let ack = AckHandle::new(Box::new(InMemoryAckReply {
            subscription: subscription.clone(),
            outcomes: self.state.outcomes.clone(),
        }));
        Ok(tokio::spawn(async move {
            handler.on_message(message, ack).await
        }))
    }
}

impl Default for InMemorySubscriptionSource {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionSource for InMemorySubscriptionSource {
    fn subscribe(
        &self,
        subscription: &SubscriptionName,
        handler: Arc<dyn DeliveryHandler>,
    ) -> Result<ListenerHandle, Error> {
        let mut listeners = self.state.listeners.lock();
        if listeners.contains_key(subscription) {
            return Err(Error::SubscribeFailed {
                subscription: subscription.clone(),
                reason: "subscription already has an active listener".to_owned(),
            });
        }
        let _ = listeners.insert(subscription.clone(), handler);
        debug!(subscription = %subscription, "listener registered");
        Ok(ListenerHandle::new(Box::new(InMemoryListener {
            subscription: subscription.clone(),
            state: Arc::clone(&self.state),
        })))
    }
}

struct InMemoryListener {
    subscription: SubscriptionName,
    state: Arc<SourceState>,
}

impl ListenerControl for InMemoryListener {
    fn stop_async(self: Box<Self>) {
        // In-flight deliveries already spawned keep running; only future
        // pushes are cut off.
        let removed = self.state.listeners.lock().remove(&self.subscription);
        if removed.is_some() {
            debug!(subscription = %self.subscription, "listener stopped");
        }
    }
}

struct InMemoryAckReply {
    subscription: SubscriptionName,
    outcomes: Option<mpsc::Sender<AckEvent>>,
}

impl InMemoryAckReply {
    async fn report(self, status: AckStatus) -> Result<(), Error> {
        debug!(subscription = %self.subscription, ?status, "delivery resolved");
        if let Some(tx) = self.outcomes {
            tx.send(AckEvent {
                subscription: self.subscription,
                status,
            })
            .await
            .map_err(|_| Error::AckFailed {
                reason: "outcome channel closed".to_owned(),
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl AckReplyHandler for InMemoryAckReply {
    async fn ack(self: Box<Self>) -> Result<(), Error> {
        self.report(AckStatus::Ack).await
    }

    async fn nack(self: Box<Self>) -> Result<(), Error> {
        self.report(AckStatus::Nack).await
    }
}

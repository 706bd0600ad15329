// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! The inbound channel adapter: per-delivery conversion, forwarding, and
//! acknowledgement resolution.
//!
//! # Lifecycle
//!
//! `Stopped -> Starting -> Running -> Stopping -> Stopped`, held in one
//! atomic flag. `start()` registers exactly one delivery handler with the
//! subscription source and is a no-op when already starting or running.
//! `stop()` requests asynchronous listener shutdown and returns immediately;
//! in-flight deliveries run to completion on the source's own tasks.
//!
//! # Per-delivery state machine
//!
//! The conversion-and-forward step is expressed as a `Result` so the two
//! mode-dependent outcomes are explicit branches, not stack unwinding:
//!
//! - `Auto` + `Ok`: ack exactly once; a failed ack reply surfaces to the
//!   source, which never saw the acknowledgement recorded.
//! - `Auto` + `Err`: nack exactly once, then return the original error to the
//!   source, whose retry/backoff policy governs redelivery.
//! - `Manual`: the handle moves into the envelope before the failure-prone
//!   forward step and the adapter neither acks nor nacks, success or failure.
//!
//! The per-delivery path holds no shared mutable state across deliveries;
//! configuration reads take a short read lock and never span an await.

use crate::config::{AckMode, AdapterConfig, PayloadExtractor};
use crate::error::Error;
use crate::message::{AckHandle, Envelope, InboundMessage};
use crate::sink::MessageSink;
use crate::source::{DeliveryHandler, ListenerHandle, SubscriptionName, SubscriptionSource};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

const STOPPED: u8 = 0;
const STARTING: u8 = 1;
const RUNNING: u8 = 2;
const STOPPING: u8 = 3;

/// Bridges one subscription into a downstream sink.
///
/// Cheaply cloneable; all clones share the same listener and configuration.
pub struct InboundChannelAdapter<P> {
    inner: Arc<AdapterInner<P>>,
}

impl<P> Clone for InboundChannelAdapter<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct AdapterInner<P> {
    subscription: SubscriptionName,
    source: Arc<dyn SubscriptionSource>,
    sink: Arc<dyn MessageSink<P>>,
    settings: RwLock<DeliverySettings<P>>,
    state: AtomicU8,
    listener: Mutex<Option<ListenerHandle>>,
}

struct DeliverySettings<P> {
    ack_mode: AckMode,
    extractor: PayloadExtractor<P>,
}

impl InboundChannelAdapter<String> {
    /// Creates an adapter with the default UTF-8 string extractor and
    /// automatic acknowledgement.
    pub fn new(
        source: Arc<dyn SubscriptionSource>,
        sink: Arc<dyn MessageSink<String>>,
        subscription: SubscriptionName,
    ) -> Self {
        Self::with_extractor(source, sink, subscription, crate::config::utf8_extractor())
    }
}

impl<P: Send + 'static> InboundChannelAdapter<P> {
    /// Creates an adapter with an explicit payload extractor.
    pub fn with_extractor(
        source: Arc<dyn SubscriptionSource>,
        sink: Arc<dyn MessageSink<P>>,
        subscription: SubscriptionName,
        extractor: PayloadExtractor<P>,
    ) -> Self {
        Self {
            inner: Arc::new(AdapterInner {
                subscription,
                source,
                sink,
                settings: RwLock::new(DeliverySettings {
                    ack_mode: AckMode::default(),
                    extractor,
                }),
                state: AtomicU8::new(STOPPED),
                listener: Mutex::new(None),
            }),
        }
    }

    /// Creates an adapter from a validated declarative configuration.
    pub fn from_config(
        source: Arc<dyn SubscriptionSource>,
        sink: Arc<dyn MessageSink<P>>,
        config: &AdapterConfig,
        extractor: PayloadExtractor<P>,
    ) -> Self {
        let adapter =
            Self::with_extractor(source, sink, config.subscription.clone(), extractor);
        adapter.set_ack_mode(config.ack_mode);
        adapter
    }

    /// Returns the subscription this adapter listens on.
    #[must_use]
    pub fn subscription(&self) -> &SubscriptionName {
        &self.inner.subscription
    }

    /// Returns the current acknowledgement mode.
    #[must_use]
    pub fn ack_mode(&self) -> AckMode {
        self.inner.settings.read().ack_mode
    }

    /// Sets the acknowledgement mode.
    ///
    /// Intended for use while the adapter is stopped; mutating mid-delivery
    /// is at worst stale for in-flight deliveries, never a data race.
    pub fn set_ack_mode(&self, mode: AckMode) {
        self.inner.settings.write().ack_mode = mode;
    }

    /// Returns the current payload extractor.
    #[must_use]
    pub fn payload_extractor(&self) -> PayloadExtractor<P> {
        Arc::clone(&self.inner.settings.read().extractor)
    }

    /// Replaces the payload extractor. Same caveat as [`set_ack_mode`](Self::set_ack_mode).
    pub fn set_payload_extractor(&self, extractor: PayloadExtractor<P>) {
        self.inner.settings.write().extractor = extractor;
    }

    /// Returns `true` while a listener is registered.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.state.load(Ordering::Acquire) == RUNNING
    }

    /// Starts the adapter by registering a delivery handler with the source.
    ///
    /// No-op when already starting or running, so starting twice never
    /// registers two handlers. On registration failure the adapter returns to
    /// the stopped state.
    pub fn start(&self) -> Result<(), Error> {
        if self
            .inner
            .state
            .compare_exchange(STOPPED, STARTING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Ok(());
        }

        let handler: Arc<dyn DeliveryHandler> = self.inner.clone();
        match self.inner.source.subscribe(&self.inner.subscription, handler) {
            Ok(listener) => {
                *self.inner.listener.lock() = Some(listener);
                self.inner.state.store(RUNNING, Ordering::Release);
                debug!(subscription = %self.inner.subscription, "inbound adapter started");
                Ok(())
            }
            Err(e) => {
                self.inner.state.store(STOPPED, Ordering::Release);
                Err(e)
            }
        }
    }

    /// Stops the adapter.
    ///
    /// Requests asynchronous shutdown of the listener and returns without
    /// waiting for in-flight deliveries to drain. No-op when not running.
    pub fn stop(&self) {
        if self
            .inner
            .state
            .compare_exchange(RUNNING, STOPPING, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        if let Some(listener) = self.inner.listener.lock().take() {
            listener.stop_async();
        }
        self.inner.state.store(STOPPED, Ordering::Release);
        debug!(subscription = %self.inner.subscription, "inbound adapter stopped");
    }
}

#[async_trait]
impl<P: Send + 'static> DeliveryHandler for AdapterInner<P> {
    async fn on_message(&self, message: InboundMessage, ack: AckHandle) -> Result<(), Error> {
        let (ack_mode, extractor) = {
            let settings = self.settings.read();
            (settings.ack_mode, Arc::clone(&settings.extractor))
        };

        match ack_mode {
            AckMode::Manual => {
                // The downstream consumer owns the ack decision; the adapter
                // neither acks nor nacks regardless of the forwarding outcome.
                self.deliver(message, Some(ack), &extractor).await
            }
            AckMode::Auto => match self.deliver(message, None, &extractor).await {
                Ok(()) => {
                    if let Err(e) = ack.ack().await {
                        warn!(subscription = %self.subscription, error = %e, "ack reply failed");
                        return Err(e);
                    }
                    Ok(())
                }
                Err(e) => {
                    debug!(subscription = %self.subscription, error = %e, "delivery failed, nacking");
                    if let Err(nack_err) = ack.nack().await {
                        warn!(subscription = %self.subscription, error = %nack_err, "nack reply failed");
                    }
                    Err(e)
                }
            },
        }
    }
}

impl<P: Send + 'static> AdapterInner<P> {
    /// Converts one inbound message and forwards it downstream.
    ///
    /// Extraction runs before the handle is attached: when extraction fails in
    /// manual mode the handle is dropped unresolved and the message's fate
    /// rests on the source's redelivery deadline. When the sink rejects, the
    /// envelope carries the attached handle away with it. Both edges are
    /// intentional.
    async fn deliver(
        &self,
        message: InboundMessage,
        ack: Option<AckHandle>,
        extractor: &PayloadExtractor<P>,
    ) -> Result<(), Error> {
        let payload = extractor(message.data())?;
        let mut envelope = Envelope::new(payload, message.attributes().clone());
        if let Some(handle) = ack {
            envelope = envelope.with_ack_handle(handle);
        }
        self.sink.send(envelope).await
    }
}

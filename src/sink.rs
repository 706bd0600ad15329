// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Downstream sink contract plus the default bounded-channel implementation.
//!
//! `send()` is the adapter's backpressure point: it blocks the delivery task
//! until the sink accepts or rejects the envelope, so sink latency directly
//! throttles the subscription source's effective concurrency.

use crate::error::Error;
use crate::message::Envelope;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// A sink that accepts constructed envelopes.
#[async_trait]
pub trait MessageSink<P>: Send + Sync {
    /// Accepts one envelope, awaiting under backpressure. May reject.
    async fn send(&self, envelope: Envelope<P>) -> Result<(), Error>;
}

/// Bounded in-process channel sink.
///
/// Envelopes are handed to a `tokio::sync::mpsc` receiver owned by the
/// downstream consumer. Once the receiver is dropped every further send fails
/// with [`Error::SinkClosed`].
pub struct ChannelSink<P> {
    tx: mpsc::Sender<Envelope<P>>,
}

impl<P: Send + 'static> ChannelSink<P> {
    /// Creates a sink with the given channel capacity, returning the consumer
    /// side alongside it.
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Envelope<P>>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl<P> Clone for ChannelSink<P> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

#[async_trait]
impl<P: Send + 'static> MessageSink<P> for ChannelSink<P> {
    async fn send(&self, envelope: Envelope<P>) -> Result<(), Error> {
        self.tx.send(envelope).await.map_err(|_| Error::SinkClosed)
    }
}

// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Core value types that flow through the adapter.
//!
//! `InboundMessage` is what the subscription source hands over, `Envelope` is
//! what the adapter forwards downstream, and `AckHandle` is the capability
//! tying the two together.
//!
//! # Ack/Nack
//!
//! `AckHandle::ack()` and `AckHandle::nack()` both consume the handle, so at
//! most one of the two can ever be invoked per delivery. Dropping a handle
//! without calling either leaves the delivery pending until the source's own
//! deadline triggers redelivery; `Drop` intentionally does nothing.

use crate::error::Error;
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Reserved header key marking an envelope whose ack decision was delegated
/// downstream.
///
/// Present in the header map only when the adapter runs in manual
/// acknowledgement mode; the handle itself travels in the envelope's typed
/// slot (see [`Envelope::take_ack_handle`]). The key is written after the
/// attribute copy, so a colliding source attribute is overwritten
/// (last-write-wins).
pub const ACK_HANDLE_HEADER: &str = "pubsub_acknowledgement";

/// A raw message received from the subscription source.
///
/// Immutable once received: an opaque byte payload plus an ordered map of
/// string attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    data: Vec<u8>,
    attributes: BTreeMap<String, String>,
}

impl InboundMessage {
    /// Creates a message from a raw payload and attribute map.
    pub fn new(data: impl Into<Vec<u8>>, attributes: BTreeMap<String, String>) -> Self {
        Self {
            data: data.into(),
            attributes,
        }
    }

    /// Creates a message with no attributes.
    pub fn from_data(data: impl Into<Vec<u8>>) -> Self {
        Self::new(data, BTreeMap::new())
    }

    /// Returns a copy of this message with one attribute added.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let _ = self.attributes.insert(key.into(), value.into());
        self
    }

    /// Returns the raw byte payload.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the attribute map.
    #[must_use]
    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }
}

/// Source-side resolution of one delivery.
///
/// Implemented by subscription sources; `ack`/`nack` take `self: Box<Self>`
/// so the wrapper [`AckHandle`] can enforce single resolution by move.
#[async_trait]
pub trait AckReplyHandler: Send {
    /// Resolves the delivery as processed; the source stops redelivery.
    async fn ack(self: Box<Self>) -> Result<(), Error>;

    /// Resolves the delivery as rejected; the source redelivers per its own
    /// retry policy.
    async fn nack(self: Box<Self>) -> Result<(), Error>;
}

/// Opaque acknowledgement capability, 1:1 with one delivery.
pub struct AckHandle {
    inner: Box<dyn AckReplyHandler>,
}

impl AckHandle {
    /// Wraps a source-provided reply handler.
    pub fn new(inner: Box<dyn AckReplyHandler>) -> Self {
        Self { inner }
    }

    /// Acknowledges the delivery.
    pub async fn ack(self) -> Result<(), Error> {
        self.inner.ack().await
    }

    /// Negatively acknowledges the delivery.
    pub async fn nack(self) -> Result<(), Error> {
        self.inner.nack().await
    }
}

impl std::fmt::Debug for AckHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AckHandle")
    }
}

/// The framework message forwarded to the downstream sink.
///
/// Payload is the result of the configured extraction function; headers are a
/// 1:1 copy of the inbound attributes. In manual acknowledgement mode the
/// envelope additionally carries the delivery's [`AckHandle`].
#[derive(Debug)]
pub struct Envelope<P> {
    payload: P,
    headers: BTreeMap<String, String>,
    ack: Option<AckHandle>,
}

impl<P> Envelope<P> {
    /// Creates an envelope without an attached ack handle.
    pub fn new(payload: P, headers: BTreeMap<String, String>) -> Self {
        Self {
            payload,
            headers,
            ack: None,
        }
    }

    /// Attaches the delivery's ack handle and marks the reserved header.
    #[must_use]
    pub fn with_ack_handle(mut self, handle: AckHandle) -> Self {
        let _ = self
            .headers
            .insert(ACK_HANDLE_HEADER.to_owned(), "manual".to_owned());
        self.ack = Some(handle);
        self
    }

    /// Returns the extracted payload.
    #[must_use]
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Returns the header map.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Returns `true` when this envelope carries an ack handle.
    #[must_use]
    pub fn has_ack_handle(&self) -> bool {
        self.ack.is_some()
    }

    /// Takes the ack handle out of the envelope, if present.
    ///
    /// A manual-mode consumer calls this exactly once and resolves the handle
    /// at a time of its choosing.
    pub fn take_ack_handle(&mut self) -> Option<AckHandle> {
        self.ack.take()
    }

    /// Splits the envelope into payload, headers, and optional ack handle.
    pub fn into_parts(self) -> (P, BTreeMap<String, String>, Option<AckHandle>) {
        (self.payload, self.headers, self.ack)
    }
}

// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Inbound channel adapter bridging a managed Pub/Sub subscription into
//! in-process message channels.
//!
//! The [`InboundChannelAdapter`] owns a subscription listener's lifecycle.
//! For every message pushed by the subscription source it extracts a typed
//! payload, copies the message attributes into envelope headers, forwards the
//! envelope to a downstream sink, and resolves the acknowledgement outcome
//! according to the configured [`AckMode`]:
//!
//! - [`AckMode::Auto`]: ack on forwarding success, nack on any failure, with
//!   the original error re-raised to the source.
//! - [`AckMode::Manual`]: the delivery's [`AckHandle`] travels downstream in
//!   the envelope and the consumer resolves it exactly once, at a time of its
//!   choosing.
//!
//! The cloud client itself is out of scope: sources and sinks are consumed
//! through the [`SubscriptionSource`] and [`MessageSink`] traits, with an
//! in-memory source and a bounded channel sink provided for local use and
//! tests.

pub mod adapter;
pub mod config;
pub mod error;
pub mod memory;
pub mod message;
pub mod sink;
pub mod source;
pub mod transport;

pub use adapter::InboundChannelAdapter;
pub use config::{bytes_extractor, utf8_extractor, AckMode, AdapterConfig, PayloadExtractor};
pub use error::Error;
pub use memory::{AckEvent, AckStatus, InMemorySubscriptionSource};
pub use message::{AckHandle, AckReplyHandler, Envelope, InboundMessage, ACK_HANDLE_HEADER};
pub use sink::{ChannelSink, MessageSink};
pub use source::{
    DeliveryHandler, ListenerControl, ListenerHandle, SubscriptionName, SubscriptionSource,
};
pub use transport::{Credentials, Transport, DEFAULT_SERVICE_ENDPOINT, EMULATOR_HOST_ENV};

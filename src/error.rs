// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

use crate::source::SubscriptionName;

/// Errors produced by adapter configuration and delivery operations.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum Error {
    /// Adapter configuration failed validation.
    #[error("invalid adapter configuration: {reason}")]
    InvalidConfiguration {
        /// Validation error details.
        reason: String,
    },
    /// The payload extractor rejected the raw message payload.
    #[error("payload extraction failed: {reason}")]
    PayloadExtraction {
        /// Extraction error details.
        reason: String,
    },
    /// The downstream sink rejected the envelope.
    #[error("downstream sink rejected the envelope: {reason}")]
    SinkRejected {
        /// Rejection details reported by the sink.
        reason: String,
    },
    /// The downstream sink is closed and accepts no further envelopes.
    #[error("downstream sink is closed")]
    SinkClosed,
    /// Registering a delivery handler with the subscription source failed.
    #[error("subscribing to `{subscription}` failed: {reason}")]
    SubscribeFailed {
        /// Subscription the handler was registered for.
        subscription: SubscriptionName,
        /// Failure details reported by the source.
        reason: String,
    },
    /// The listener for the subscription has been stopped or never existed.
    #[error("listener for `{subscription}` is stopped")]
    ListenerStopped {
        /// Subscription without an active listener.
        subscription: SubscriptionName,
    },
    /// Delivering an ack/nack reply to the subscription source failed.
    #[error("acknowledgement reply failed: {reason}")]
    AckFailed {
        /// Reply failure details.
        reason: String,
    },
}

// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Adapter configuration: acknowledgement mode, payload extraction strategy,
//! and the declarative config surface.
//!
//! Declarative configuration is parsed from a JSON value with
//! `deny_unknown_fields` and validated afterwards; any invalid input is
//! rejected with [`Error::InvalidConfiguration`] before anything is
//! constructed.

use crate::error::Error;
use crate::source::SubscriptionName;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

/// How the adapter resolves the acknowledgement outcome of a delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AckMode {
    /// The adapter acks on forwarding success and nacks on failure.
    #[default]
    Auto,
    /// The adapter delegates the ack decision to the downstream consumer by
    /// attaching the delivery's ack handle to the envelope.
    Manual,
}

/// Pluggable payload-extraction strategy applied once per delivery to the raw
/// byte payload.
pub type PayloadExtractor<P> = Arc<dyn Fn(&[u8]) -> Result<P, Error> + Send + Sync>;

/// The default extractor for `String` payloads: strict UTF-8 decode.
///
/// Invalid UTF-8 counts as a delivery-processing failure.
pub fn utf8_extractor() -> PayloadExtractor<String> {
    Arc::new(|data| {
        std::str::from_utf8(data)
            .map(str::to_owned)
            .map_err(|e| Error::PayloadExtraction {
                reason: e.to_string(),
            })
    })
}

/// An extractor that hands the raw bytes through unchanged.
pub fn bytes_extractor() -> PayloadExtractor<Vec<u8>> {
    Arc::new(|data| Ok(data.to_vec()))
}

/// Validated declarative adapter configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    /// Subscription the adapter listens on.
    pub subscription: SubscriptionName,
    /// Acknowledgement mode (defaults to [`AckMode::Auto`]).
    pub ack_mode: AckMode,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    subscription: String,
    #[serde(default)]
    ack_mode: Option<AckMode>,
}

impl AdapterConfig {
    /// Creates a configuration with the default acknowledgement mode.
    #[must_use]
    pub fn new(subscription: SubscriptionName) -> Self {
        Self {
            subscription,
            ack_mode: AckMode::default(),
        }
    }

    /// Parses and validates a configuration from a JSON value.
    pub fn from_value(config: &Value) -> Result<Self, Error> {
        let raw: RawConfig = serde_json::from_value(config.clone()).map_err(|e| {
            Error::InvalidConfiguration {
                reason: e.to_string(),
            }
        })?;
        let subscription = SubscriptionName::parse(&raw.subscription)?;
        Ok(Self {
            subscription,
            ack_mode: raw.ack_mode.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn config_parses_with_defaults() {
        let config = AdapterConfig::from_value(&json!({ "subscription": "sub-1" })).unwrap();
        assert_eq!(config.subscription.as_str(), "sub-1");
        assert_eq!(config.ack_mode, AckMode::Auto);
    }

    #[test]
    fn config_parses_manual_mode() {
        let config = AdapterConfig::from_value(&json!({
            "subscription": "sub-1",
            "ack_mode": "manual"
        }))
        .unwrap();
        assert_eq!(config.ack_mode, AckMode::Manual);
    }

    #[test]
    fn config_rejects_blank_subscription() {
        let err = AdapterConfig::from_value(&json!({ "subscription": "   " })).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn config_rejects_missing_subscription() {
        let err = AdapterConfig::from_value(&json!({})).unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn config_rejects_unknown_ack_mode() {
        let err = AdapterConfig::from_value(&json!({
            "subscription": "sub-1",
            "ack_mode": "sometimes"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn config_rejects_unknown_fields() {
        let err = AdapterConfig::from_value(&json!({
            "subscription": "sub-1",
            "topic": "t"
        }))
        .unwrap_err();
        assert!(matches!(err, Error::InvalidConfiguration { .. }));
    }

    #[test]
    fn default_extractor_decodes_utf8() {
        let extractor = utf8_extractor();
        assert_eq!(extractor(b"hello").unwrap(), "hello");

        let err = extractor(&[0xff, 0xfe]).unwrap_err();
        assert!(matches!(err, Error::PayloadExtraction { .. }));
    }

    #[test]
    fn bytes_extractor_is_identity() {
        let extractor = bytes_extractor();
        assert_eq!(extractor(b"raw").unwrap(), b"raw".to_vec());
    }
}

// Copyright The PubSub Bridge Authors
// SPDX-License-Identifier: Apache-2.0

//! Transport selection resolved once at startup.
//!
//! A deployment talks either to the real service endpoint with application
//! default credentials, or to a local emulator over a plaintext fixed channel
//! with no credentials. The choice is configuration data consumed by whoever
//! constructs the concrete client; it never enters the adapter's runtime
//! logic.

/// Environment variable announcing a local emulator, e.g. `localhost:8085`.
pub const EMULATOR_HOST_ENV: &str = "PUBSUB_EMULATOR_HOST";

/// Default endpoint for the production transport.
pub const DEFAULT_SERVICE_ENDPOINT: &str = "pubsub.googleapis.com:443";

/// Credentials strategy implied by the selected transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Credentials {
    /// Resolve application default credentials from the environment.
    ApplicationDefault,
    /// No credentials (emulator only).
    None,
}

/// The transport a client should be built against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// The real service endpoint.
    Service {
        /// Endpoint in `host:port` form.
        endpoint: String,
    },
    /// A local emulator reached over a plaintext fixed channel.
    Emulator {
        /// Emulator address in `host:port` form.
        host: String,
    },
}

impl Transport {
    /// Resolves the transport from an optional emulator host.
    ///
    /// A present, non-blank host selects the emulator; anything else selects
    /// the default service endpoint.
    #[must_use]
    pub fn resolve(emulator_host: Option<&str>) -> Self {
        match emulator_host.map(str::trim).filter(|host| !host.is_empty()) {
            Some(host) => Self::Emulator {
                host: host.to_owned(),
            },
            None => Self::Service {
                endpoint: DEFAULT_SERVICE_ENDPOINT.to_owned(),
            },
        }
    }

    /// Resolves the transport from [`EMULATOR_HOST_ENV`].
    #[must_use]
    pub fn from_env() -> Self {
        Self::resolve(std::env::var(EMULATOR_HOST_ENV).ok().as_deref())
    }

    /// Returns the credentials strategy for this transport.
    #[must_use]
    pub const fn credentials(&self) -> Credentials {
        match self {
            Self::Service { .. } => Credentials::ApplicationDefault,
            Self::Emulator { .. } => Credentials::None,
        }
    }

    /// Returns `true` when this transport targets an emulator.
    #[must_use]
    pub const fn is_emulator(&self) -> bool {
        matches!(self, Self::Emulator { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emulator_host_selects_emulator_without_credentials() {
        let transport = Transport::resolve(Some("localhost:8085"));
        assert_eq!(
            transport,
            Transport::Emulator {
                host: "localhost:8085".to_owned()
            }
        );
        assert_eq!(transport.credentials(), Credentials::None);
        assert!(transport.is_emulator());
    }

    #[test]
    fn absent_or_blank_host_selects_the_service_endpoint() {
        for host in [None, Some(""), Some("   ")] {
            let transport = Transport::resolve(host);
            assert_eq!(
                transport,
                Transport::Service {
                    endpoint: DEFAULT_SERVICE_ENDPOINT.to_owned()
                }
            );
            assert_eq!(transport.credentials(), Credentials::ApplicationDefault);
        }
    }
}

//! # Oracle Configuration

use std::env;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use super::blinding::PairingCurve;
use super::errors::BlindingError;

/// Path of the blind-sign endpoint, relative to the oracle URL.
pub const SIGN_MESSAGE_ENDPOINT: &str = "getBlindedMessageSig";

/// Known oracle deployments.
///
/// All of them sign over BLS12-377; a scheme over another curve is
/// rejected when the service is built, before any request is sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OdisNetwork {
    Mainnet,
    Alfajores,
    AlfajoresStaging,
}

impl OdisNetwork {
    pub fn url(&self) -> &'static str {
        match self {
            Self::Mainnet => "https://us-central1-celo-pgpnp-mainnet.cloudfunctions.net",
            Self::Alfajores => "https://us-central1-celo-phone-number-privacy.cloudfunctions.net",
            Self::AlfajoresStaging => {
                "https://us-central1-celo-phone-number-privacy-stg.cloudfunctions.net"
            }
        }
    }

    /// Base64 of the oracle's combined public key.
    pub fn public_key(&self) -> &'static str {
        match self {
            Self::Mainnet => "FvreHfLmhBjwxHxsxeyrcOLtSonC9j7K3WrS4QapYsQH6LdaDTaNGmnlQMfFY04Bp/K4wAvqQwO9/bqPVCKf8Ze8OZo8Frmog4JY4xAiwrsqOXxug11+htjEe1pj4uMA",
            Self::Alfajores => "kPoRxWdEdZ/Nd3uQnp3FJFs54zuiS+ksqvOm9x8vY6KHPG8jrfqysvIRU0wtqYsBKA7SoAsICMBv8C/Fb2ZpDOqhSqvr/sZbZoHmQfvbqrzbtDIPvUIrHgRS0ydJCMsA",
            Self::AlfajoresStaging => "7FsWGsFnmVvRfMDpzz95Np76wf/1sPaK0Og9yiB+P8QbjiC8FV67NBans9hzZEkBaQMhiapzgMR6CkZIZPvgwQboAxl65JWRZecGe5V3XO4sdKeNemdAZ2TzQuWkuZoA",
        }
    }

    pub fn curve(&self) -> PairingCurve {
        PairingCurve::Bls12_377
    }

    /// Parse `mainnet`, `alfajores` or `alfajores-staging`
    /// (`alfajores_staging` and `alfajoresstaging` also accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Some(Self::Mainnet),
            "alfajores" => Some(Self::Alfajores),
            "alfajores-staging" | "alfajores_staging" | "alfajoresstaging" => {
                Some(Self::AlfajoresStaging)
            }
            _ => None,
        }
    }
}

/// Oracle endpoint, key and retry policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OdisConfig {
    /// Oracle base URL.
    pub url: String,
    /// Base64 of the oracle public key that unblinded signatures must verify under.
    pub public_key: String,
    /// Curve the oracle signs over.
    pub curve: PairingCurve,
    /// Total attempts for the sign call.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles after each failure.
    pub initial_backoff: Duration,
    /// Upper bound on a single sign call.
    pub request_timeout: Duration,
}

impl OdisConfig {
    /// A self-hosted oracle.
    pub fn custom(url: impl Into<String>, public_key: impl Into<String>, curve: PairingCurve) -> Self {
        Self {
            url: url.into(),
            public_key: public_key.into(),
            curve,
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            request_timeout: Duration::from_secs(10),
        }
    }

    pub fn for_network(network: OdisNetwork) -> Self {
        Self::custom(network.url(), network.public_key(), network.curve())
    }

    /// BLS12-381 oracle with short backoff for tests.
    pub fn for_testing(url: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            initial_backoff: Duration::from_millis(1),
            request_timeout: Duration::from_secs(1),
            ..Self::custom(url, public_key, PairingCurve::Bls12_381)
        }
    }

    /// Read overrides from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PA_ODIS_NETWORK`: preset to start from (default: none)
    /// - `PA_ODIS_URL`: oracle base URL
    /// - `PA_ODIS_PUBLIC_KEY`: base64 oracle public key
    /// - `PA_ODIS_CURVE`: `bls12-381` or `bls12-377` (default: preset's, else bls12-381)
    /// - `PA_ODIS_MAX_ATTEMPTS`: attempts for the sign call (default: 3)
    pub fn from_env() -> Self {
        let mut config = env::var("PA_ODIS_NETWORK")
            .ok()
            .and_then(|v| OdisNetwork::from_name(&v))
            .map(Self::for_network)
            .unwrap_or_else(|| Self::custom("", "", PairingCurve::Bls12_381));

        if let Ok(url) = env::var("PA_ODIS_URL") {
            config.url = url;
        }
        if let Ok(key) = env::var("PA_ODIS_PUBLIC_KEY") {
            config.public_key = key;
        }
        if let Some(curve) = env::var("PA_ODIS_CURVE")
            .ok()
            .and_then(|v| PairingCurve::from_name(&v))
        {
            config.curve = curve;
        }
        config.max_attempts = env::var("PA_ODIS_MAX_ATTEMPTS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(config.max_attempts);
        config
    }

    /// Decoded oracle public key.
    pub fn public_key_bytes(&self) -> Result<Vec<u8>, BlindingError> {
        STANDARD
            .decode(self.public_key.trim())
            .map_err(|e| BlindingError::InvalidEncoding(e.to_string()))
    }

    /// Delay before attempt `attempt + 1` (1-based `attempt`).
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

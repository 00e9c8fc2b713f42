//! Attestation round configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Tunables of an attestation round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttestationConfig {
    /// Attestations to request in total before the round succeeds.
    pub max_attestations: u32,

    /// Upper bound on the wait for the issuer-selection window.
    pub selection_timeout: Duration,

    /// Interval between block-height reads while waiting.
    pub block_poll_interval: Duration,

    /// Metadata download attempts per issuer.
    pub metadata_fetch_attempts: u32,

    /// Send the security-code prefix on the first pass.
    pub use_security_code: bool,
}

impl Default for AttestationConfig {
    fn default() -> Self {
        Self {
            max_attestations: 3,
            selection_timeout: Duration::from_secs(120),
            block_poll_interval: Duration::from_secs(1),
            metadata_fetch_attempts: 3,
            use_security_code: true,
        }
    }
}

impl AttestationConfig {
    /// Create config for testing (fast polling, short window)
    pub fn for_testing() -> Self {
        Self {
            selection_timeout: Duration::from_secs(2),
            block_poll_interval: Duration::from_millis(10),
            ..Self::default()
        }
    }

    /// Read overrides from the environment.
    ///
    /// # Environment Variables
    ///
    /// - `PA_MAX_ATTESTATIONS`
    /// - `PA_SELECTION_TIMEOUT_SECS`
    /// - `PA_BLOCK_POLL_INTERVAL_MS`
    /// - `PA_METADATA_FETCH_ATTEMPTS`
    /// - `PA_USE_SECURITY_CODE` (`true`/`false`)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_attestations: env::var("PA_MAX_ATTESTATIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_attestations),
            selection_timeout: env::var("PA_SELECTION_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.selection_timeout),
            block_poll_interval: env::var("PA_BLOCK_POLL_INTERVAL_MS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.block_poll_interval),
            metadata_fetch_attempts: env::var("PA_METADATA_FETCH_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.metadata_fetch_attempts),
            use_security_code: env::var("PA_USE_SECURITY_CODE")
                .map(|v| v.to_lowercase() != "false" && v != "0")
                .unwrap_or(defaults.use_security_code),
        }
    }
}

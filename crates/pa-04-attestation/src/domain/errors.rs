//! # Attestation Errors
//!
//! One variant per failure class of a round. Each maps to exactly one
//! [`RoundOutcome`], and each keeps its precipitating cause as `source()`.

use std::time::Duration;

use pa_02_issuer_discovery::DiscoveryError;
use pa_03_salt_derivation::PhoneNumberError;
use shared_types::{innermost_cause, LedgerError};
use thiserror::Error;

use crate::domain::entities::RoundOutcome;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AttestationError {
    /// The ledger client has no local account.
    #[error("No account address is configured")]
    NoAddress,

    /// The phone number is not E.164. Never retried.
    #[error("Invalid phone number")]
    InvalidInput(#[from] PhoneNumberError),

    /// A ledger read or write failed in transit.
    #[error("Ledger call failed while {step}")]
    TransientNetwork {
        step: &'static str,
        #[source]
        source: LedgerError,
    },

    /// The issuer-selection window did not open in time.
    #[error("Selection window not reached after {waited:?} (target block {target_block})")]
    ProtocolTimeout { waited: Duration, target_block: u64 },

    /// Issuer data read from the ledger could not be decoded.
    #[error("Issuer data could not be trusted")]
    UntrustedData(#[source] DiscoveryError),

    /// The registry contradicts what the round just did.
    #[error("Inconsistent on-chain state: {reason}")]
    InconsistentState {
        reason: String,
        #[source]
        source: Option<LedgerError>,
    },
}

impl AttestationError {
    pub(crate) fn network(step: &'static str) -> impl FnOnce(LedgerError) -> Self {
        move |source| Self::TransientNetwork { step, source }
    }

    pub(crate) fn inconsistent(reason: impl Into<String>) -> Self {
        Self::InconsistentState {
            reason: reason.into(),
            source: None,
        }
    }

    /// Resolution failures: ledger reads are network errors, a corrupt
    /// URL blob is untrusted data.
    pub fn from_discovery(error: DiscoveryError) -> Self {
        match error {
            DiscoveryError::Ledger(source) => Self::TransientNetwork {
                step: "reading completable attestations",
                source,
            },
            other => Self::UntrustedData(other),
        }
    }

    /// Terminal outcome this error ends a round with.
    pub fn outcome(&self) -> RoundOutcome {
        match self {
            Self::NoAddress => RoundOutcome::NoAddress,
            Self::InvalidInput(_) => RoundOutcome::BadPhoneNumber,
            Self::TransientNetwork { .. } | Self::UntrustedData(_) => RoundOutcome::NetworkError,
            Self::ProtocolTimeout { .. } => RoundOutcome::SelectionTimeout,
            Self::InconsistentState { .. } => RoundOutcome::InconsistentState,
        }
    }

    /// The innermost error of the chain.
    pub fn root_cause(&self) -> &(dyn std::error::Error + 'static) {
        innermost_cause(self)
    }
}

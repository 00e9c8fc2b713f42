//! # Salt Derivation Errors
//!
//! `SaltError` names the failed step; its source is the cause.

use pa_01_signature_verification::SignatureError;
use shared_types::{innermost_cause, TransportError};
use thiserror::Error;

use super::blinding::PairingCurve;

/// Rejections of a phone number string. Never echoes the input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PhoneNumberError {
    #[error("Phone number must start with '+'")]
    MissingPrefix,

    #[error("Phone number must contain only digits after '+'")]
    InvalidCharacter,

    #[error("Phone number must have 2 to 15 digits, got {0}")]
    InvalidLength(usize),

    #[error("Country code cannot start with 0")]
    LeadingZero,
}

/// Errors from the blinding scheme.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BlindingError {
    #[error("Invalid oracle public key")]
    InvalidPublicKey,

    #[error("Invalid curve point")]
    InvalidPoint,

    #[error("Invalid encoding: {0}")]
    InvalidEncoding(String),

    #[error("Unblinded signature does not verify against the oracle key")]
    VerificationFailed,

    #[error("Oracle signs over {oracle}, blinding scheme works over {scheme}")]
    UnsupportedCurve {
        scheme: PairingCurve,
        oracle: PairingCurve,
    },
}

/// Oracle call failures, classified by HTTP status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OdisError {
    #[error("odisQuotaError")]
    QuotaExceeded,

    #[error("odisBadInputError")]
    BadInput,

    #[error("odisAuthError")]
    AuthFailure,

    #[error("Unknown Client Error {0}")]
    ClientError(u16),

    #[error("Unknown failure {0}")]
    Unknown(u16),

    #[error("Oracle request failed")]
    Transport(#[source] TransportError),

    /// A 2xx answer that is not a usable sign response.
    #[error("Malformed oracle response: {0}")]
    MalformedResponse(String),
}

impl OdisError {
    /// Classify a non-2xx status.
    pub fn from_status(status: u16) -> Self {
        match status {
            403 => Self::QuotaExceeded,
            400 => Self::BadInput,
            401 => Self::AuthFailure,
            400..=499 => Self::ClientError(status),
            _ => Self::Unknown(status),
        }
    }

    /// Everything but a bad 2xx body is worth another attempt.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::MalformedResponse(_))
    }
}

/// Causes that are not tied to one protocol step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaltingCause {
    #[error("Invalid phone number")]
    InvalidPhoneNumber(#[from] PhoneNumberError),

    #[error("Failed to encode the oracle request: {0}")]
    Encoding(String),

    #[error("Failed to sign the oracle request")]
    Signing(#[source] SignatureError),
}

/// A failed pepper derivation. No partial pepper is ever returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SaltError {
    #[error("Failed to get salt")]
    Salting(#[source] SaltingCause),

    #[error("Failed to blind the target")]
    Blinding(#[source] BlindingError),

    #[error("Failed to run the blinded target through ODIS")]
    Odis(#[source] OdisError),

    #[error("Failed to unblind the target")]
    Unblinding(#[source] BlindingError),
}

impl SaltError {
    /// The innermost error of the chain.
    pub fn main_cause(&self) -> &(dyn std::error::Error + 'static) {
        innermost_cause(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_classification() {
        assert_eq!(OdisError::from_status(403), OdisError::QuotaExceeded);
        assert_eq!(OdisError::from_status(400), OdisError::BadInput);
        assert_eq!(OdisError::from_status(401), OdisError::AuthFailure);
        assert_eq!(OdisError::from_status(429), OdisError::ClientError(429));
        assert_eq!(OdisError::from_status(500), OdisError::Unknown(500));
        assert_eq!(OdisError::from_status(302), OdisError::Unknown(302));
    }

    #[test]
    fn test_retry_policy() {
        assert!(OdisError::QuotaExceeded.is_retryable());
        assert!(OdisError::Unknown(502).is_retryable());
        assert!(OdisError::Transport(TransportError::Timeout("odis".into())).is_retryable());
        assert!(!OdisError::MalformedResponse("no signature".into()).is_retryable());
    }

    #[test]
    fn test_main_cause() {
        let err = SaltError::Odis(OdisError::Transport(TransportError::Connection(
            "odis.example".into(),
        )));
        assert_eq!(err.to_string(), "Failed to run the blinded target through ODIS");
        assert_eq!(
            err.main_cause().to_string(),
            "Connection failed: odis.example"
        );

        let phone = SaltError::Salting(PhoneNumberError::LeadingZero.into());
        assert_eq!(phone.source().map(|s| s.to_string()).as_deref(), Some("Invalid phone number"));
        assert_eq!(phone.main_cause().to_string(), "Country code cannot start with 0");
    }
}

//! # Discovery Errors

use pa_01_signature_verification::SignatureError;
use shared_types::{LedgerError, TransportError};
use thiserror::Error;

/// Errors fetching or validating a claim-metadata document.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MetadataError {
    /// The document could not be downloaded.
    #[error("Metadata request failed")]
    Transport(#[source] TransportError),

    /// The server answered outside 2xx.
    #[error("Request failed with status {0}")]
    HttpStatus(u16),

    /// The body is not a metadata document.
    #[error("Malformed metadata document: {0}")]
    Malformed(String),

    /// The document has no claims, so nothing is signed.
    #[error("Signature could not be validated (empty claims)")]
    EmptyClaims,

    /// Two claims share a type.
    #[error("More than 1 claim of type {0} exists")]
    DuplicateClaim(String),

    /// A claim lacks a field its type requires.
    #[error("Claim of type {claim_type} is missing field `{field}`")]
    MissingField {
        claim_type: String,
        field: &'static str,
    },

    /// An attestation service URL claim holds something that is not a URL.
    #[error("{0} is not a valid url")]
    InvalidUrl(String),

    /// An address field is not a 40-hex-digit address.
    #[error("Invalid address in metadata")]
    InvalidAddress(#[source] SignatureError),

    /// `meta.signature` is not hex.
    #[error("Signature is not hex-encoded")]
    InvalidSignatureEncoding,

    /// Neither the stated signer nor any delegate produced the signature.
    #[error("Signature could not be validated (signer {0} not verified)")]
    SignerNotVerified(String),

    /// The accounts registry could not be read during delegate fallback.
    #[error("Signer lookup failed")]
    SignerLookup(#[source] SignatureError),
}

impl MetadataError {
    /// Transport and status failures are transient; content defects are not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus(_))
    }
}

/// Reasons an issuer is marked non-compliant.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IssuerLookupError {
    /// Metadata fetch or verification failed.
    #[error("Metadata lookup failed")]
    Metadata(#[from] MetadataError),

    /// The metadata has no attestation service URL claim.
    #[error("No attestation service URL registered")]
    MissingServiceUrl,

    /// The status endpoint could not be reached.
    #[error("Status check failed")]
    StatusTransport(#[source] TransportError),

    /// The status endpoint answered outside 2xx.
    #[error("Status check failed with status {0}")]
    StatusHttp(u16),

    /// The status body lacks `status` or `version`.
    #[error("Malformed status response: {0}")]
    StatusMalformed(String),

    /// The service reported something other than `ok`.
    #[error("Service status is {0}")]
    NotOk(String),
}

/// Errors that abort issuer resolution as a whole.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    /// Completable attestations could not be read.
    #[error("Failed to read completable attestations")]
    Ledger(#[from] LedgerError),

    /// The packed metadata URL blob does not match its length array.
    #[error("Malformed packed metadata URLs: {0}")]
    MalformedUrls(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_retry_classification() {
        assert!(MetadataError::HttpStatus(503).is_retryable());
        assert!(MetadataError::Transport(TransportError::Timeout("x".into())).is_retryable());
        assert!(!MetadataError::EmptyClaims.is_retryable());
        assert!(!MetadataError::DuplicateClaim("NAME".into()).is_retryable());
        assert!(!MetadataError::SignerNotVerified("0x".into()).is_retryable());
    }

    #[test]
    fn test_lookup_error_keeps_cause() {
        let err = IssuerLookupError::from(MetadataError::HttpStatus(404));
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Request failed with status 404"));
    }
}

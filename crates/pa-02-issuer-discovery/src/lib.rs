//! # Issuer Discovery (PA-02)
//!
//! Turns the issuers selected on-chain into attestation service endpoints.
//!
//! ## Flow
//!
//! 1. Read completable attestations and unpack the metadata URL blob.
//! 2. For each issuer, fetch its claim-metadata document (retrying only
//!    transport failures) and verify the claims signature, with delegate
//!    fallback.
//! 3. Take the `ATTESTATION_SERVICE_URL` claim and query `<url>/status`.
//!
//! An issuer failing any step is reported as non-compliant; the rest of the
//! set is still resolved.

pub mod builder;
pub mod domain;
pub mod ports;
pub mod service;

pub use builder::MetadataBuilder;
pub use domain::claims::{
    aggregate_claims_hash, is_valid_url, Claim, ClaimBody, ClaimDocument, ClaimMeta, ClaimType,
};
pub use domain::entities::{IssuerPartition, IssuerRecord, ServiceStatus};
pub use domain::errors::{DiscoveryError, IssuerLookupError, MetadataError};
pub use domain::packed::unpack_strings;
pub use ports::inbound::{ClaimMetadataApi, IssuerDiscoveryApi};
pub use service::{check_status, IssuerDiscoveryService, MetadataFetcher, DEFAULT_METADATA_ATTEMPTS};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}

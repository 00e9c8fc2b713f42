//! # Domain Entities

use serde::{Deserialize, Serialize};
use shared_types::Address;

/// Resolution result for one selected issuer.
///
/// Only records with `is_valid == true` are actionable; the rest are kept
/// so callers can report the issuer as non-compliant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerRecord {
    /// Issuer account.
    pub issuer: Address,
    /// Block of the request the issuer was selected for.
    pub block_number: u64,
    /// Metadata URL registered on-chain.
    pub metadata_url: String,
    /// Metadata verified and status check answered `ok`.
    pub is_valid: bool,
    /// Attestation service base URL.
    pub attestation_service_url: Option<String>,
    /// Display name claim.
    pub name: Option<String>,
    /// Version reported by the status check.
    pub version: Option<String>,
}

impl IssuerRecord {
    /// A compliant issuer.
    pub fn valid(
        issuer: Address,
        block_number: u64,
        metadata_url: String,
        attestation_service_url: String,
        name: Option<String>,
        version: String,
    ) -> Self {
        Self {
            issuer,
            block_number,
            metadata_url,
            is_valid: true,
            attestation_service_url: Some(attestation_service_url),
            name,
            version: Some(version),
        }
    }

    /// A non-compliant issuer.
    pub fn invalid(issuer: Address, block_number: u64, metadata_url: String) -> Self {
        Self {
            issuer,
            block_number,
            metadata_url,
            is_valid: false,
            attestation_service_url: None,
            name: None,
            version: None,
        }
    }
}

/// Resolved issuers split by compliance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssuerPartition {
    /// Valid issuers to reveal to.
    pub actionable: Vec<IssuerRecord>,
    /// Addresses of issuers that failed resolution.
    pub non_compliant: Vec<Address>,
}

impl IssuerPartition {
    /// Split `records` by `is_valid`, preserving order.
    pub fn from_records(records: Vec<IssuerRecord>) -> Self {
        let mut partition = Self::default();
        for record in records {
            if record.is_valid {
                partition.actionable.push(record);
            } else {
                partition.non_compliant.push(record.issuer);
            }
        }
        partition
    }
}

/// Body of `GET <service>/status`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServiceStatus {
    /// `"ok"` when healthy.
    pub status: String,
    /// Service version string.
    pub version: String,
}

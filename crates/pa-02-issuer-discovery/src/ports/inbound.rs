//! # Inbound Ports (Driving Ports / API)

use crate::domain::claims::ClaimDocument;
use crate::domain::entities::IssuerRecord;
use crate::domain::errors::{DiscoveryError, MetadataError};
use async_trait::async_trait;
use shared_types::{Address, Identifier};

/// Fetch-and-verify of issuer metadata documents.
#[async_trait]
pub trait ClaimMetadataApi: Send + Sync {
    /// Download and verify the document at `url`.
    ///
    /// Transport failures and non-2xx answers are retried up to
    /// `max_attempts` times in total. A document that downloads but fails
    /// parsing or signature verification is returned as an error at once.
    async fn fetch(&self, url: &str, max_attempts: u32) -> Result<ClaimDocument, MetadataError>;
}

/// Resolution of the issuers selected for an identifier.
#[async_trait]
pub trait IssuerDiscoveryApi: Send + Sync {
    /// One record per completable attestation, valid or not.
    ///
    /// A failing issuer never aborts resolution of the others; only a
    /// failed ledger read or a corrupt URL blob does.
    async fn resolve(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<Vec<IssuerRecord>, DiscoveryError>;
}

//! # Issuer Discovery Service
//!
//! - `MetadataFetcher` implements `ClaimMetadataApi`: download with retry,
//!   then parse and verify once.
//! - `IssuerDiscoveryService` implements `IssuerDiscoveryApi`: read the
//!   completable attestations, then resolve each issuer independently.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pa_01_signature_verification::{hash_personal_message, SignerMatch};
use shared_types::{address_hex, join_url, Address, HttpTransport, Identifier, LedgerClient};
use pa_telemetry::log_event;

use crate::domain::claims::ClaimDocument;
use crate::domain::entities::{IssuerRecord, ServiceStatus};
use crate::domain::errors::{DiscoveryError, IssuerLookupError, MetadataError};
use crate::domain::packed::unpack_strings;
use crate::ports::inbound::{ClaimMetadataApi, IssuerDiscoveryApi};
use crate::ports::outbound::SignatureVerificationApi;

/// Metadata download attempts per issuer.
pub const DEFAULT_METADATA_ATTEMPTS: u32 = 3;

// =============================================================================
// METADATA FETCHER
// =============================================================================

/// Downloads metadata documents and verifies their signatures.
pub struct MetadataFetcher<T: HttpTransport + ?Sized, V: SignatureVerificationApi> {
    transport: Arc<T>,
    verifier: V,
    retry_delay: Duration,
}

impl<T: HttpTransport + ?Sized, V: SignatureVerificationApi> MetadataFetcher<T, V> {
    /// Fetcher with no delay between attempts.
    pub fn new(transport: Arc<T>, verifier: V) -> Self {
        Self {
            transport,
            verifier,
            retry_delay: Duration::ZERO,
        }
    }

    /// Sleep `delay` between download attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Parse `body` and check `meta.signature` against `meta.address` and
    /// its delegate signers.
    pub async fn verify_document(&self, body: &str) -> Result<ClaimDocument, MetadataError> {
        let document = ClaimDocument::parse(body)?;
        let message_hash = hash_personal_message(&document.claims_hash());
        let signer = document.meta.address.to_bytes();

        match self
            .verifier
            .verify_signer_for_address(&message_hash, &document.meta.signature, &signer)
            .await
        {
            Ok(Some(SignerMatch::Direct)) => Ok(document),
            Ok(Some(SignerMatch::Delegate(role))) => {
                log_event!(debug, "discovery", "metadata signed by delegate", signer = %document.meta.address, ?role);
                Ok(document)
            }
            Ok(None) => Err(MetadataError::SignerNotVerified(
                document.meta.address.to_string(),
            )),
            Err(e) => Err(MetadataError::SignerLookup(e)),
        }
    }

    async fn download(&self, url: &str) -> Result<String, MetadataError> {
        let response = self
            .transport
            .get(url)
            .await
            .map_err(MetadataError::Transport)?;

        if !response.is_success() {
            return Err(MetadataError::HttpStatus(response.status));
        }
        Ok(response.body)
    }
}

#[async_trait]
impl<T, V> ClaimMetadataApi for MetadataFetcher<T, V>
where
    T: HttpTransport + ?Sized,
    V: SignatureVerificationApi,
{
    async fn fetch(&self, url: &str, max_attempts: u32) -> Result<ClaimDocument, MetadataError> {
        let max_attempts = max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.download(url).await {
                // Content defects are final; only the download is retried.
                Ok(body) => return self.verify_document(&body).await,
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    log_event!(
                        warn,
                        "discovery",
                        "metadata download failed, retrying",
                        url,
                        attempt,
                        max_attempts,
                        error = %e
                    );
                    if !self.retry_delay.is_zero() {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

// =============================================================================
// STATUS CHECK
// =============================================================================

/// `GET <service_url>/status`, single attempt.
///
/// Succeeds only on 2xx with `{"status": "ok", "version": ...}`.
pub async fn check_status<T: HttpTransport + ?Sized>(
    transport: &T,
    service_url: &str,
) -> Result<ServiceStatus, IssuerLookupError> {
    let url = join_url(service_url, "status");
    let response = transport
        .get(&url)
        .await
        .map_err(IssuerLookupError::StatusTransport)?;

    if !response.is_success() {
        return Err(IssuerLookupError::StatusHttp(response.status));
    }

    let status: ServiceStatus = serde_json::from_str(&response.body)
        .map_err(|e| IssuerLookupError::StatusMalformed(e.to_string()))?;

    if status.status != "ok" {
        return Err(IssuerLookupError::NotOk(status.status));
    }
    Ok(status)
}

// =============================================================================
// ISSUER DISCOVERY
// =============================================================================

/// Resolves selected issuers to attestation service endpoints.
pub struct IssuerDiscoveryService<L, T, M>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    M: ClaimMetadataApi,
{
    ledger: Arc<L>,
    transport: Arc<T>,
    metadata: M,
    metadata_attempts: u32,
}

impl<L, T, M> IssuerDiscoveryService<L, T, M>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    M: ClaimMetadataApi,
{
    /// Create a discovery service with [`DEFAULT_METADATA_ATTEMPTS`].
    pub fn new(ledger: Arc<L>, transport: Arc<T>, metadata: M) -> Self {
        Self {
            ledger,
            transport,
            metadata,
            metadata_attempts: DEFAULT_METADATA_ATTEMPTS,
        }
    }

    /// Override the metadata download attempt budget.
    pub fn with_metadata_attempts(mut self, attempts: u32) -> Self {
        self.metadata_attempts = attempts;
        self
    }

    async fn lookup_issuer(
        &self,
        issuer: &Address,
        metadata_url: &str,
    ) -> Result<(String, Option<String>, String), IssuerLookupError> {
        let document = self
            .metadata
            .fetch(metadata_url, self.metadata_attempts)
            .await?;

        let service_url = document
            .attestation_service_url()
            .ok_or(IssuerLookupError::MissingServiceUrl)?
            .to_string();
        let name = document.name().map(str::to_string);

        log_event!(
            debug,
            "discovery",
            "metadata verified, checking status",
            issuer = %address_hex(issuer),
            %service_url
        );
        let status = check_status(self.transport.as_ref(), &service_url).await?;

        Ok((service_url, name, status.version))
    }
}

#[async_trait]
impl<L, T, M> IssuerDiscoveryApi for IssuerDiscoveryService<L, T, M>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    M: ClaimMetadataApi,
{
    async fn resolve(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<Vec<IssuerRecord>, DiscoveryError> {
        let completable = self
            .ledger
            .completable_attestations(identifier, account)
            .await?;

        let urls = unpack_strings(&completable.string_lengths, &completable.packed_metadata_urls)?;
        if urls.len() != completable.issuers.len() || urls.len() != completable.block_numbers.len() {
            return Err(DiscoveryError::MalformedUrls(format!(
                "{} urls for {} issuers and {} blocks",
                urls.len(),
                completable.issuers.len(),
                completable.block_numbers.len()
            )));
        }

        log_event!(info, "discovery", "completable attestations found", count = urls.len());

        let mut records = Vec::with_capacity(urls.len());
        for ((issuer, block_number), metadata_url) in completable
            .issuers
            .iter()
            .zip(completable.block_numbers.iter().copied())
            .zip(urls)
        {
            let record = match self.lookup_issuer(issuer, &metadata_url).await {
                Ok((service_url, name, version)) => IssuerRecord::valid(
                    *issuer,
                    block_number,
                    metadata_url,
                    service_url,
                    name,
                    version,
                ),
                Err(e) => {
                    log_event!(
                        warn,
                        "discovery",
                        "issuer is non-compliant",
                        issuer = %address_hex(issuer),
                        %metadata_url,
                        error = %e,
                        cause = ?std::error::Error::source(&e).map(ToString::to_string)
                    );
                    IssuerRecord::invalid(*issuer, block_number, metadata_url)
                }
            };
            records.push(record);
        }

        Ok(records)
    }
}

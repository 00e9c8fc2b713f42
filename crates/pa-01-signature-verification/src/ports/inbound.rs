//! # Inbound Ports (Driving Ports / API)
//!
//! Traits that define the public API of this crate.

use crate::domain::address::ChecksumAddress;
use crate::domain::entities::SignerMatch;
use crate::domain::errors::SignatureError;
use async_trait::async_trait;
use shared_types::{Address, Hash};

/// Primary Signature Verification API.
///
/// Implementations must be thread-safe (`Send + Sync`).
#[async_trait]
pub trait SignatureVerificationApi: Send + Sync {
    /// Checksum-encode a textual address.
    fn checksum(&self, address: &str) -> Result<ChecksumAddress, SignatureError>;

    /// Verify a 65-byte signature in either supported layout against `expected`.
    fn verify(&self, message_hash: &Hash, signature: &[u8], expected: &Address) -> bool;

    /// Verify against `address`, then against its delegate signers.
    ///
    /// Returns `Ok(None)` when no candidate signer matches. The delegate
    /// roles are consulted only if `address` is a registered account.
    ///
    /// # Errors
    /// `SignatureError::Ledger` if the account registry cannot be read.
    async fn verify_signer_for_address(
        &self,
        message_hash: &Hash,
        signature: &[u8],
        address: &Address,
    ) -> Result<Option<SignerMatch>, SignatureError>;
}

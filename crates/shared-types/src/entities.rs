//! # Core Domain Entities
//!
//! Data model for the attestation protocol as read from, and written to,
//! the attestation registry.
//!
//! ## Clusters
//!
//! - **Keys**: `Address`, `Hash`, `Identifier`
//! - **Registry state**: `AttestationStat`, `UnselectedRequest`, `CompletableAttestations`
//! - **Accounts**: `SignerRole`

use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export U256 from primitive-types for fee and allowance amounts
pub use primitive_types::U256;

/// A 32-byte hash (keccak256 unless stated otherwise).
pub type Hash = [u8; 32];

/// A 20-byte Ethereum-style address.
pub type Address = [u8; 20];

/// Hash of a submitted transaction, as returned by the ledger client.
pub type TxHash = [u8; 32];

/// On-chain lookup key derived from a phone number and its salt.
///
/// The raw bytes never leave the process except as a contract argument, so
/// `Debug` is redacted.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identifier([u8; 32]);

impl Identifier {
    /// Wrap an already-derived 32-byte identifier.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, for contract calls.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Identifier(<redacted>)")
    }
}

/// Completed and requested attestation counts for an (identifier, account) pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttestationStat {
    /// Attestations the account has completed.
    pub completed: u32,
    /// Attestations requested so far (selected issuers included).
    pub total: u32,
}

impl AttestationStat {
    /// Requested attestations not yet completed.
    pub fn pending(&self) -> u32 {
        self.total.saturating_sub(self.completed)
    }
}

/// A request that has been paid for but not yet bound to issuers.
///
/// `block_number == 0` means there is no pending request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnselectedRequest {
    /// Block at which the request was made.
    pub block_number: u64,
    /// Number of attestations requested.
    pub attestations_requested: u32,
    /// Token the fee was paid in.
    pub fee_token: Address,
}

impl UnselectedRequest {
    /// True if the registry holds a pending request.
    pub fn is_pending(&self) -> bool {
        self.block_number != 0
    }

    /// True once `current_block` reaches `block_number + expiry_blocks`.
    pub fn is_expired(&self, current_block: u64, expiry_blocks: u64) -> bool {
        current_block >= self.block_number.saturating_add(expiry_blocks)
    }
}

/// Raw result of `getCompletableAttestations`.
///
/// Metadata URLs come packed: `packed_metadata_urls` is the concatenation of
/// every URL and `string_lengths[i]` is the byte length of the i-th one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletableAttestations {
    /// Request block per attestation.
    pub block_numbers: Vec<u64>,
    /// Selected issuer per attestation.
    pub issuers: Vec<Address>,
    /// Byte length of each packed metadata URL.
    pub string_lengths: Vec<u64>,
    /// Concatenated metadata URLs.
    pub packed_metadata_urls: Vec<u8>,
}

impl CompletableAttestations {
    /// Build the packed form from unpacked parts (ledger adapters and mocks).
    pub fn pack(entries: &[(u64, Address, String)]) -> Self {
        let mut packed = Self::default();
        for (block, issuer, url) in entries {
            packed.block_numbers.push(*block);
            packed.issuers.push(*issuer);
            packed.string_lengths.push(url.len() as u64);
            packed.packed_metadata_urls.extend_from_slice(url.as_bytes());
        }
        packed
    }

    /// Number of completable attestations.
    pub fn len(&self) -> usize {
        self.issuers.len()
    }

    /// True if nothing is completable.
    pub fn is_empty(&self) -> bool {
        self.issuers.is_empty()
    }
}

/// Delegate signer roles an account can authorize.
///
/// Declaration order is the order signature fallback tries them in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignerRole {
    /// Governance vote signer.
    Vote,
    /// Validator signer.
    Validator,
    /// Attestation signer.
    Attestation,
}

impl SignerRole {
    /// Fallback order for delegate-signer verification.
    pub const FALLBACK_ORDER: [SignerRole; 3] =
        [SignerRole::Vote, SignerRole::Validator, SignerRole::Attestation];
}

/// Lower-case `0x`-prefixed hex, for log fields.
pub fn address_hex(address: &Address) -> String {
    format!("0x{}", hex::encode(address))
}

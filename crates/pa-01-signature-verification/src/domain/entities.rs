//! # Domain Entities
//!
//! Core data structures for signature verification.

use serde::{Deserialize, Serialize};
use shared_types::SignerRole;

/// Length of a raw recoverable signature.
pub const SIGNATURE_LENGTH: usize = 65;

/// Recoverable secp256k1 signature components.
///
/// Only a verification artifact: it proves nothing until recovered against
/// a hash and compared to an expected signer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignatureProof {
    /// R component (32 bytes)
    pub r: [u8; 32],
    /// S component (32 bytes)
    pub s: [u8; 32],
    /// Recovery ID, normalized to 27 or 28
    pub v: u8,
}

impl SignatureProof {
    /// `r || s || v`.
    pub fn to_rsv_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v;
        out
    }

    /// `v || r || s`.
    pub fn to_vrs_bytes(&self) -> [u8; SIGNATURE_LENGTH] {
        let mut out = [0u8; SIGNATURE_LENGTH];
        out[0] = self.v;
        out[1..33].copy_from_slice(&self.r);
        out[33..].copy_from_slice(&self.s);
        out
    }

    /// `0x` + hex(v) + hex(r) + hex(s), the oracle authorization header form.
    pub fn to_vrs_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_vrs_bytes()))
    }
}

/// Byte orderings a 65-byte signature may arrive in.
///
/// The encoding is not self-describing, so verification tries both in
/// declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignatureLayout {
    /// `r(32) || s(32) || v(1)`
    Rsv,
    /// `v(1) || r(32) || s(32)`
    Vrs,
}

impl SignatureLayout {
    /// Layouts in the order they are attempted.
    pub const ATTEMPT_ORDER: [SignatureLayout; 2] = [SignatureLayout::Rsv, SignatureLayout::Vrs];
}

/// Which key a verified signature belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignerMatch {
    /// The address itself signed.
    Direct,
    /// A delegate authorized by the account signed.
    Delegate(SignerRole),
}

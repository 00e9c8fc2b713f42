//! # Signature Errors
//!
//! Error types for address encoding, signature recovery and signing.

use shared_types::LedgerError;
use thiserror::Error;

/// Errors that can occur during address or signature handling.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// Input is not a `0x`-prefixed, 40-hex-digit address.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Raw signature has the wrong length.
    #[error("Invalid signature length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    /// R or S is outside [1, n-1].
    #[error("Invalid signature format")]
    InvalidFormat,

    /// Invalid recovery ID (v must be 0, 1, 27, or 28)
    #[error("Invalid recovery ID: {0}")]
    InvalidRecoveryId(u8),

    /// Failed to recover public key from signature
    #[error("Failed to recover public key")]
    RecoveryFailed,

    /// Private key bytes are not a valid secp256k1 scalar.
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// The signing backend failed.
    #[error("Signing failed: {0}")]
    SigningFailed(String),

    /// Account registry lookup failed during delegate fallback.
    #[error("Signer lookup failed")]
    Ledger(#[from] LedgerError),
}

//! # Signature Verification (PA-01)
//!
//! Checksum address encoding and verification of personal-message
//! signatures, including the delegate-signer fallback.
//!
//! ## Architecture
//!
//! This crate follows hexagonal architecture:
//! - **Domain Layer** (`domain/`): Pure cryptographic logic, no I/O
//! - **Ports Layer** (`ports/`): Trait definitions for inbound/outbound interfaces
//! - **Adapters** (`adapters/`): `LocalKeySigner`
//! - **Service Layer** (`service.rs`): Wires domain logic to ports
//!
//! ## Security Notes
//!
//! - **Two layouts**: a 65-byte signature is tried as `(r,s,v)` and then
//!   `(v,r,s)`; the encoding does not say which one it is.
//! - **Malleability**: high-S signatures recover the same signer as their
//!   low-S form; signing emits low-S only (EIP-2)
//! - **Delegates**: only registered accounts get the vote, validator and
//!   attestation signer fallback.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-export public API
pub use adapters::LocalKeySigner;
pub use domain::address::{checksum, checksum_bytes, is_valid_address, parse_address, ChecksumAddress};
pub use domain::ecdsa::{
    address_from_pubkey, hash_personal_message, keccak256, parse_signature, recover_address,
    sign_prehash, verify_signature,
};
pub use domain::entities::{SignatureLayout, SignatureProof, SignerMatch, SIGNATURE_LENGTH};
pub use domain::errors::SignatureError;
pub use ports::inbound::SignatureVerificationApi;
pub use ports::outbound::{MessageSigner, SignerDirectory};
pub use service::SignatureVerificationService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

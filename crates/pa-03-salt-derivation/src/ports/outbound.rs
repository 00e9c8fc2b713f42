//! # Outbound Ports (Driven Ports / SPI)
//!
//! - [`BlindingScheme`]: local blind/unblind of the oracle query
//! - [`BlindSignatureOracle`]: the remote blind signer
//! - [`MessageSigner`]: signs the oracle request for the account

use async_trait::async_trait;

use crate::domain::blinding::{BlindedQuery, PairingCurve};
use crate::domain::errors::{BlindingError, OdisError};

pub use pa_01_signature_verification::MessageSigner;

/// Blind signature scheme the oracle signs under.
pub trait BlindingScheme: Send + Sync {
    /// Curve the scheme blinds and verifies over.
    fn curve(&self) -> PairingCurve;

    /// Reject a public key that does not decode as a valid key on
    /// [`curve`](Self::curve).
    fn check_public_key(&self, public_key: &[u8]) -> Result<(), BlindingError>;

    /// Blind `message` with a fresh random factor.
    fn blind(&self, message: &[u8]) -> Result<BlindedQuery, BlindingError>;

    /// Remove the blinding from `blind_signature` and check the result
    /// against `public_key` and the original message.
    fn unblind(
        &self,
        query: &BlindedQuery,
        blind_signature: &[u8],
        public_key: &[u8],
    ) -> Result<Vec<u8>, BlindingError>;
}

/// The remote blind signer.
#[async_trait]
pub trait BlindSignatureOracle: Send + Sync {
    /// Submit the serialized request with its authorization header and
    /// return the base64 blind signature.
    async fn sign_blinded(&self, body: &str, authorization: &str) -> Result<String, OdisError>;
}

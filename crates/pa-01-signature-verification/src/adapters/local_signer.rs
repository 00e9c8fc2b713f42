//! In-process secp256k1 key.

use crate::domain::ecdsa::{address_from_pubkey, hash_personal_message, sign_prehash};
use crate::domain::entities::SignatureProof;
use crate::domain::errors::SignatureError;
use crate::ports::outbound::MessageSigner;
use async_trait::async_trait;
use k256::ecdsa::SigningKey;
use shared_types::{address_hex, Address};
use std::fmt;
use zeroize::Zeroizing;

/// [`MessageSigner`] over a private key held in memory.
pub struct LocalKeySigner {
    key: SigningKey,
    address: Address,
}

impl LocalKeySigner {
    /// Build from 32 raw private-key bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SignatureError> {
        let key = SigningKey::from_slice(bytes).map_err(|_| SignatureError::InvalidPrivateKey)?;
        let address = address_from_pubkey(key.verifying_key());
        Ok(Self { key, address })
    }

    /// Build from hex, with or without a `0x` prefix.
    pub fn from_hex(input: &str) -> Result<Self, SignatureError> {
        let digits = input.strip_prefix("0x").unwrap_or(input);
        let mut bytes = Zeroizing::new([0u8; 32]);
        hex::decode_to_slice(digits, &mut bytes[..])
            .map_err(|_| SignatureError::InvalidPrivateKey)?;
        Self::from_bytes(&bytes)
    }
}

impl fmt::Debug for LocalKeySigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalKeySigner")
            .field("address", &address_hex(&self.address))
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MessageSigner for LocalKeySigner {
    fn address(&self) -> Address {
        self.address
    }

    async fn sign_personal_message(&self, message: &[u8]) -> Result<SignatureProof, SignatureError> {
        sign_prehash(&hash_personal_message(message), &self.key)
    }
}

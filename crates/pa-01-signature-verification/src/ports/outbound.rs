//! # Outbound Ports (Driven Ports / SPI)
//!
//! Traits that define dependencies this crate needs.

use crate::domain::entities::SignatureProof;
use crate::domain::errors::SignatureError;
use async_trait::async_trait;
use shared_types::{Address, LedgerClient, LedgerError, SignerRole};

/// Read access to the accounts registry.
///
/// Every [`LedgerClient`] is a signer directory.
#[async_trait]
pub trait SignerDirectory: Send + Sync {
    /// True if `address` is a registered account.
    async fn is_registered_account(&self, address: &Address) -> Result<bool, LedgerError>;

    /// Delegate signer of `address` for `role` (the account itself if none).
    async fn delegate_signer(
        &self,
        address: &Address,
        role: SignerRole,
    ) -> Result<Address, LedgerError>;
}

#[async_trait]
impl<L: LedgerClient + ?Sized> SignerDirectory for L {
    async fn is_registered_account(&self, address: &Address) -> Result<bool, LedgerError> {
        LedgerClient::is_registered_account(self, address).await
    }

    async fn delegate_signer(
        &self,
        address: &Address,
        role: SignerRole,
    ) -> Result<Address, LedgerError> {
        LedgerClient::delegate_signer(self, address, role).await
    }
}

/// Holder of the local account key.
///
/// Key storage is owned by the caller; this port only signs.
#[async_trait]
pub trait MessageSigner: Send + Sync {
    /// Address of the signing key.
    fn address(&self) -> Address;

    /// Sign the personal-message hash of `message`.
    async fn sign_personal_message(&self, message: &[u8]) -> Result<SignatureProof, SignatureError>;
}

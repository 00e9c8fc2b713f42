//! Signer directory for running without a chain connection.

use async_trait::async_trait;
use pa_01_signature_verification::SignerDirectory;
use shared_types::{Address, LedgerError, SignerRole};

/// Knows no registered accounts, so only direct signatures verify.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineDirectory;

#[async_trait]
impl SignerDirectory for OfflineDirectory {
    async fn is_registered_account(&self, _address: &Address) -> Result<bool, LedgerError> {
        Ok(false)
    }

    async fn delegate_signer(
        &self,
        address: &Address,
        _role: SignerRole,
    ) -> Result<Address, LedgerError> {
        Ok(*address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_nothing_is_registered() {
        let directory = OfflineDirectory;
        assert!(!directory.is_registered_account(&[1; 20]).await.unwrap());
        assert_eq!(
            directory.delegate_signer(&[1; 20], SignerRole::Vote).await.unwrap(),
            [1; 20]
        );
    }
}

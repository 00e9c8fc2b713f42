//! # Signature Verification Service
//!
//! Application service layer that implements the `SignatureVerificationApi` trait.
//!
//! ## Architecture
//!
//! - Implements the inbound port (`SignatureVerificationApi`)
//! - Uses the outbound port (`SignerDirectory`) for the delegate fallback
//! - Delegates cryptographic operations to the domain layer

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{address_hex, Address, Hash, SignerRole};
use tracing::debug;

use crate::domain::address::{self, ChecksumAddress};
use crate::domain::ecdsa;
use crate::domain::entities::SignerMatch;
use crate::domain::errors::SignatureError;
use crate::ports::inbound::SignatureVerificationApi;
use crate::ports::outbound::SignerDirectory;

/// Signature Verification Service.
///
/// Direct verification first; then, for registered accounts only, the
/// delegate roles in [`SignerRole::FALLBACK_ORDER`], stopping at the first
/// match.
pub struct SignatureVerificationService<D: SignerDirectory + ?Sized> {
    directory: Arc<D>,
}

impl<D: SignerDirectory + ?Sized> Clone for SignatureVerificationService<D> {
    fn clone(&self) -> Self {
        Self {
            directory: Arc::clone(&self.directory),
        }
    }
}

impl<D: SignerDirectory + ?Sized> SignatureVerificationService<D> {
    /// Create a new signature verification service.
    pub fn new(directory: Arc<D>) -> Self {
        Self { directory }
    }
}

#[async_trait]
impl<D: SignerDirectory + ?Sized> SignatureVerificationApi for SignatureVerificationService<D> {
    fn checksum(&self, input: &str) -> Result<ChecksumAddress, SignatureError> {
        address::checksum(input)
    }

    fn verify(&self, message_hash: &Hash, signature: &[u8], expected: &Address) -> bool {
        ecdsa::verify_signature(message_hash, signature, expected)
    }

    async fn verify_signer_for_address(
        &self,
        message_hash: &Hash,
        signature: &[u8],
        address: &Address,
    ) -> Result<Option<SignerMatch>, SignatureError> {
        if ecdsa::verify_signature(message_hash, signature, address) {
            return Ok(Some(SignerMatch::Direct));
        }

        if !self.directory.is_registered_account(address).await? {
            debug!(
                account = %address_hex(address),
                "signature mismatch and signer is not a registered account"
            );
            return Ok(None);
        }

        for role in SignerRole::FALLBACK_ORDER {
            let signer = self.directory.delegate_signer(address, role).await?;
            if ecdsa::verify_signature(message_hash, signature, &signer) {
                debug!(
                    account = %address_hex(address),
                    ?role,
                    "signature verified by delegate signer"
                );
                return Ok(Some(SignerMatch::Delegate(role)));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ecdsa::hash_personal_message;
    use crate::domain::ecdsa::test_helpers::{generate_keypair, sign_personal};
    use shared_types::mocks::{LedgerCall, MockLedger};
    use shared_types::LedgerError;

    fn service(ledger: &Arc<MockLedger>) -> SignatureVerificationService<MockLedger> {
        SignatureVerificationService::new(Arc::clone(ledger))
    }

    #[tokio::test]
    async fn test_direct_match_skips_registry() {
        let ledger = Arc::new(MockLedger::default());
        ledger.fail(LedgerCall::IsRegistered);
        let (key, address) = generate_keypair();
        let proof = sign_personal(b"doc", &key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_rsv_bytes(), &address)
            .await;
        assert_eq!(result, Ok(Some(SignerMatch::Direct)));
    }

    #[tokio::test]
    async fn test_unregistered_account_has_no_fallback() {
        let ledger = Arc::new(MockLedger::default());
        let (delegate_key, delegate) = generate_keypair();
        let account = [0x55; 20];
        ledger.set_delegate(account, SignerRole::Vote, delegate);
        let proof = sign_personal(b"doc", &delegate_key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_rsv_bytes(), &account)
            .await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_fallback_reaches_attestation_signer() {
        let ledger = Arc::new(MockLedger::default());
        let (delegate_key, delegate) = generate_keypair();
        let account = [0x66; 20];
        ledger.register_account(account);
        ledger.set_delegate(account, SignerRole::Attestation, delegate);
        let proof = sign_personal(b"doc", &delegate_key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_vrs_bytes(), &account)
            .await;
        assert_eq!(result, Ok(Some(SignerMatch::Delegate(SignerRole::Attestation))));
    }

    #[tokio::test]
    async fn test_fallback_stops_at_first_role() {
        let ledger = Arc::new(MockLedger::default());
        let (delegate_key, delegate) = generate_keypair();
        let account = [0x77; 20];
        ledger.register_account(account);
        ledger.set_delegate(account, SignerRole::Vote, delegate);
        ledger.set_delegate(account, SignerRole::Validator, delegate);
        let proof = sign_personal(b"doc", &delegate_key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_rsv_bytes(), &account)
            .await;
        assert_eq!(result, Ok(Some(SignerMatch::Delegate(SignerRole::Vote))));
    }

    #[tokio::test]
    async fn test_no_delegate_matches() {
        let ledger = Arc::new(MockLedger::default());
        let (stranger_key, _) = generate_keypair();
        let account = [0x88; 20];
        ledger.register_account(account);
        let proof = sign_personal(b"doc", &stranger_key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_rsv_bytes(), &account)
            .await;
        assert_eq!(result, Ok(None));
    }

    #[tokio::test]
    async fn test_registry_failure_is_surfaced() {
        let ledger = Arc::new(MockLedger::default());
        ledger.fail(LedgerCall::IsRegistered);
        let (key, _) = generate_keypair();
        let proof = sign_personal(b"doc", &key);

        let result = service(&ledger)
            .verify_signer_for_address(&hash_personal_message(b"doc"), &proof.to_rsv_bytes(), &[0x99; 20])
            .await;
        assert!(matches!(
            result,
            Err(SignatureError::Ledger(LedgerError::Transport(_)))
        ));
    }

    #[test]
    fn test_checksum_through_api() {
        let ledger = Arc::new(MockLedger::default());
        let encoded = service(&ledger)
            .checksum("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed")
            .unwrap();
        assert_eq!(encoded.as_str(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }
}

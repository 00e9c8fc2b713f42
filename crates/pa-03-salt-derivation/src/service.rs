//! # Salt Derivation Service
//!
//! Runs the blind-signature exchange:
//!
//! 1. blind the phone number locally
//! 2. sign `{account, timestamp, blindedQueryPhoneNumber, authenticationMethod}`
//!    with the account key (`Authorization: 0x‖v‖r‖s`)
//! 3. POST it to the oracle, with retry
//! 4. unblind and verify the answer under the oracle key
//! 5. pepper = first 13 chars of `base64(sha256(signature))`

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pa_01_signature_verification::checksum_bytes;
use pa_telemetry::log_event;

use crate::domain::config::OdisConfig;
use crate::domain::errors::{BlindingError, SaltError, SaltingCause};
use crate::domain::pepper::Pepper;
use crate::domain::phone::PhoneNumber;
use crate::domain::request::SignMessageRequest;
use crate::ports::inbound::SaltDerivationApi;
use crate::ports::outbound::{BlindSignatureOracle, BlindingScheme, MessageSigner};

/// Pepper derivation for the account behind `signer`.
pub struct SaltDerivationService<B, O, S>
where
    B: BlindingScheme,
    O: BlindSignatureOracle,
    S: MessageSigner + ?Sized,
{
    blinding: B,
    oracle: O,
    signer: Arc<S>,
    oracle_public_key: Vec<u8>,
}

impl<B, O, S> SaltDerivationService<B, O, S>
where
    B: BlindingScheme,
    O: BlindSignatureOracle,
    S: MessageSigner + ?Sized,
{
    pub fn new(blinding: B, oracle: O, signer: Arc<S>, oracle_public_key: Vec<u8>) -> Self {
        Self {
            blinding,
            oracle,
            signer,
            oracle_public_key,
        }
    }

    /// Take the oracle public key from `config`.
    ///
    /// Fails without contacting the oracle if `config` names a curve other
    /// than the scheme's, or a key the scheme cannot decode.
    pub fn from_config(
        blinding: B,
        oracle: O,
        signer: Arc<S>,
        config: &OdisConfig,
    ) -> Result<Self, SaltError> {
        if config.curve != blinding.curve() {
            return Err(SaltError::Blinding(BlindingError::UnsupportedCurve {
                scheme: blinding.curve(),
                oracle: config.curve,
            }));
        }
        let key = config.public_key_bytes().map_err(SaltError::Blinding)?;
        blinding.check_public_key(&key).map_err(SaltError::Blinding)?;
        Ok(Self::new(blinding, oracle, signer, key))
    }

    /// Validate `raw` as E.164, then derive.
    pub async fn derive_pepper_for(&self, raw: &str) -> Result<Pepper, SaltError> {
        let phone = PhoneNumber::parse(raw)
            .map_err(|e| SaltError::Salting(SaltingCause::InvalidPhoneNumber(e)))?;
        self.derive_pepper(&phone).await
    }
}

#[async_trait]
impl<B, O, S> SaltDerivationApi for SaltDerivationService<B, O, S>
where
    B: BlindingScheme,
    O: BlindSignatureOracle,
    S: MessageSigner + ?Sized,
{
    async fn derive_pepper(&self, phone: &PhoneNumber) -> Result<Pepper, SaltError> {
        let query = self
            .blinding
            .blind(phone.as_str().as_bytes())
            .map_err(SaltError::Blinding)?;

        let account = checksum_bytes(&self.signer.address());
        let request = SignMessageRequest::wallet_key(
            account.to_string(),
            unix_millis(),
            STANDARD.encode(query.blinded()),
        );
        let body = serde_json::to_string(&request)
            .map_err(|e| SaltError::Salting(SaltingCause::Encoding(e.to_string())))?;

        let proof = self
            .signer
            .sign_personal_message(body.as_bytes())
            .await
            .map_err(|e| SaltError::Salting(SaltingCause::Signing(e)))?;

        log_event!(debug, "salt", "requesting blind signature", %account, %phone);
        let combined = self
            .oracle
            .sign_blinded(&body, &proof.to_vrs_hex())
            .await
            .map_err(SaltError::Odis)?;

        let blind_signature = STANDARD.decode(combined.trim()).map_err(|e| {
            SaltError::Unblinding(BlindingError::InvalidEncoding(e.to_string()))
        })?;
        let signature = self
            .blinding
            .unblind(&query, &blind_signature, &self.oracle_public_key)
            .map_err(SaltError::Unblinding)?;

        log_event!(info, "salt", "pepper derived", %account, %phone);
        Ok(Pepper::from_signature(&signature))
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{BlsBlindingScheme, OdisHttpClient};
    use crate::domain::blinding::PairingCurve;
    use crate::domain::config::OdisNetwork;
    use crate::domain::errors::{OdisError, PhoneNumberError};
    use crate::mocks::MockOdis;
    use pa_01_signature_verification::LocalKeySigner;
    use shared_types::mocks::MockTransport;

    const ODIS_URL: &str = "http://odis.test";

    type Service = SaltDerivationService<BlsBlindingScheme, OdisHttpClient<MockTransport>, LocalKeySigner>;

    fn setup() -> (Arc<MockOdis>, Arc<MockTransport>, Service) {
        let odis = MockOdis::new(&[3u8; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());
        odis.install(&transport, ODIS_URL);

        let config = OdisConfig::for_testing(ODIS_URL, odis.public_key_base64());
        let signer = Arc::new(LocalKeySigner::from_bytes(&[9u8; 32]).unwrap());
        let service = SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&transport), config.clone()),
            signer,
            &config,
        )
        .unwrap();
        (odis, transport, service)
    }

    #[tokio::test]
    async fn test_pepper_matches_plain_signature() {
        let (odis, _, service) = setup();
        let phone = PhoneNumber::parse("+15555550123").unwrap();

        let pepper = service.derive_pepper(&phone).await.unwrap();
        let expected = Pepper::from_signature(&odis.expected_signature(b"+15555550123"));
        assert_eq!(pepper, expected);
        assert_eq!(odis.served(), 1);
    }

    #[tokio::test]
    async fn test_pepper_is_stable_across_blindings() {
        let (_, _, service) = setup();
        let phone = PhoneNumber::parse("+4915112345678").unwrap();

        let first = service.derive_pepper(&phone).await.unwrap();
        let second = service.derive_pepper(&phone).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_phone_number_never_sent() {
        let (_, transport, service) = setup();
        service.derive_pepper_for("+15555550123").await.unwrap();

        for request in transport.requests() {
            assert!(!request.body.contains("5555550123"));
            assert!(request.body.contains("\"authenticationMethod\":\"wallet_key\""));
        }
    }

    #[tokio::test]
    async fn test_invalid_phone_number() {
        let (_, transport, service) = setup();
        let result = service.derive_pepper_for("5555550123").await;

        assert_eq!(
            result,
            Err(SaltError::Salting(SaltingCause::InvalidPhoneNumber(
                PhoneNumberError::MissingPrefix
            )))
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_quota_exhausted_after_retries() {
        let (odis, transport, service) = setup();
        odis.set_quota(0);

        let result = service.derive_pepper_for("+15555550123").await;
        assert_eq!(result, Err(SaltError::Odis(OdisError::QuotaExceeded)));
        assert_eq!(transport.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_wrong_oracle_key_is_unblinding_error() {
        let (_, transport, _) = setup();
        let impostor = MockOdis::new(&[4u8; 32]).unwrap();
        let config = OdisConfig::for_testing(ODIS_URL, impostor.public_key_base64());
        let service = SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[9u8; 32]).unwrap()),
            &config,
        )
        .unwrap();

        let result = service.derive_pepper_for("+15555550123").await;
        assert_eq!(
            result,
            Err(SaltError::Unblinding(BlindingError::VerificationFailed))
        );
    }

    #[test]
    fn test_hosted_network_rejected_before_any_request() {
        let transport = Arc::new(MockTransport::new());
        let config = OdisConfig::for_network(OdisNetwork::Alfajores);
        let result = SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[9u8; 32]).unwrap()),
            &config,
        );

        assert_eq!(
            result.err(),
            Some(SaltError::Blinding(BlindingError::UnsupportedCurve {
                scheme: PairingCurve::Bls12_381,
                oracle: PairingCurve::Bls12_377,
            }))
        );
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_undecodable_key_rejected_at_construction() {
        let transport = Arc::new(MockTransport::new());
        let mut config = OdisConfig::for_network(OdisNetwork::Mainnet);
        config.curve = PairingCurve::Bls12_381;
        let result = SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[9u8; 32]).unwrap()),
            &config,
        );

        assert_eq!(
            result.err(),
            Some(SaltError::Blinding(BlindingError::InvalidPublicKey))
        );
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_unreachable_oracle() {
        let transport = Arc::new(MockTransport::new());
        let odis = MockOdis::new(&[3u8; 32]).unwrap();
        let config = OdisConfig::for_testing(ODIS_URL, odis.public_key_base64());
        let service = SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[9u8; 32]).unwrap()),
            &config,
        )
        .unwrap();

        let err = service.derive_pepper_for("+15555550123").await.unwrap_err();
        assert!(matches!(err, SaltError::Odis(OdisError::Transport(_))));
        assert!(err.main_cause().to_string().contains("Cannot connect"));
    }
}

//! # Salt Flow
//!
//! Phone number → blinded oracle exchange → pepper → on-chain identifier.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pa_01_signature_verification::{keccak256, LocalKeySigner, MessageSigner};
    use pa_03_salt_derivation::mocks::MockOdis;
    use pa_03_salt_derivation::{
        derive_identifier, unpeppered_identifier, BlsBlindingScheme, OdisConfig, OdisHttpClient,
        PhoneNumber, SaltDerivationApi, SaltDerivationService, PEPPER_LENGTH,
    };
    use shared_types::mocks::MockTransport;

    const ODIS_URL: &str = "https://odis.test";
    const PHONE: &str = "+15555550123";

    fn service(
        odis: &Arc<MockOdis>,
        transport: &Arc<MockTransport>,
        key_seed: u8,
    ) -> SaltDerivationService<BlsBlindingScheme, OdisHttpClient<MockTransport>, LocalKeySigner> {
        let config = OdisConfig::for_testing(ODIS_URL, odis.public_key_base64());
        SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[key_seed; 32]).unwrap()),
            &config,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_identifier_from_derived_pepper() {
        let odis = MockOdis::new(&[1u8; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());
        odis.install(&transport, ODIS_URL);

        let phone = PhoneNumber::parse(PHONE).unwrap();
        let pepper = service(&odis, &transport, 5).derive_pepper(&phone).await.unwrap();
        assert_eq!(pepper.as_str().len(), PEPPER_LENGTH);

        let identifier = derive_identifier(&phone, &pepper);
        let expected = keccak256(format!("{PHONE}__{}", pepper.as_str()).as_bytes());
        assert_eq!(identifier.as_bytes(), &expected);
        assert_ne!(identifier, unpeppered_identifier(&phone));
    }

    #[tokio::test]
    async fn test_pepper_is_per_number_not_per_account() {
        let odis = MockOdis::new(&[1u8; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());
        odis.install(&transport, ODIS_URL);
        let phone = PhoneNumber::parse(PHONE).unwrap();

        let alice = service(&odis, &transport, 5).derive_pepper(&phone).await.unwrap();
        let bob = service(&odis, &transport, 6).derive_pepper(&phone).await.unwrap();
        assert_eq!(alice, bob);

        let other = PhoneNumber::parse("+15555550124").unwrap();
        let different = service(&odis, &transport, 5).derive_pepper(&other).await.unwrap();
        assert_ne!(alice, different);
    }

    #[tokio::test]
    async fn test_oracle_sees_only_blinded_requests_from_the_account() {
        let odis = MockOdis::new(&[1u8; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());
        odis.install(&transport, ODIS_URL);
        let signer = LocalKeySigner::from_bytes(&[5u8; 32]).unwrap();

        service(&odis, &transport, 5)
            .derive_pepper_for(PHONE)
            .await
            .unwrap();

        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        let body: serde_json::Value = serde_json::from_str(&requests[0].body).unwrap();
        assert_eq!(
            body["account"].as_str().map(str::to_lowercase),
            Some(format!("0x{}", hex::encode(signer.address())))
        );
        assert!(!requests[0].body.contains("5555550123"));
        assert_eq!(odis.served(), 1);
    }
}

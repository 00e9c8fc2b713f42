//! # Attestation Flow
//!
//! Pepper from the oracle → full round against the simulated registry →
//! association status and public lookup.
//!
//! ## Flow Tested:
//!
//! 1. Derive the pepper through the blind-signature exchange
//! 2. Run the two-pass round on a background task via the coordinator
//! 3. Issuers resolve through signed metadata and `/status`, then get reveals
//! 4. The registry maps the identifier to the account; status and lookup see it

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pa_01_signature_verification::{LocalKeySigner, MessageSigner};
    use pa_02_issuer_discovery::MetadataBuilder;
    use pa_03_salt_derivation::mocks::MockOdis;
    use pa_03_salt_derivation::{
        derive_identifier, unpeppered_identifier, BlsBlindingScheme, OdisConfig, OdisHttpClient,
        Pepper, PhoneNumber, SaltDerivationService,
    };
    use pa_04_attestation::{
        AttestationApi, AttestationConfig, AttestationService, DefaultDiscovery, NoProgress, PhoneNumberLookup,
        PhoneNumberStatus, RoundCoordinator, RoundOutcome,
    };
    use serde_json::json;
    use shared_types::mocks::{MockLedger, MockTransport};
    use shared_types::{Address, AttestationStat, SignerRole};
    use tokio::sync::mpsc;

    const ODIS_URL: &str = "https://odis.test";
    const PHONE: &str = "+15555550123";

    // =========================================================================
    // FIXTURES
    // =========================================================================

    struct Network {
        ledger: Arc<MockLedger>,
        transport: Arc<MockTransport>,
        account: LocalKeySigner,
    }

    /// Healthy issuers `0..count`, each signing its own metadata.
    async fn network(count: u8) -> Network {
        let account = LocalKeySigner::from_bytes(&[0x42; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());

        let mut pool: Vec<(Address, String)> = Vec::new();
        for i in 0..count {
            let key = LocalKeySigner::from_bytes(&[0x60 + i; 32]).unwrap();
            let (metadata_url, service_url) = issuer_urls(i);
            let document = MetadataBuilder::new()
                .claim(json!({"timestamp": 1, "type": "ATTESTATION_SERVICE_URL", "url": service_url}))
                .claim(json!({"timestamp": 2, "type": "NAME", "name": format!("Validator {i}")}))
                .sign(&key)
                .await
                .unwrap();
            serve_issuer(&transport, &metadata_url, &service_url, document);
            pool.push((key.address(), metadata_url));
        }

        let ledger = MockLedger::new(Some(account.address()))
            .with_auto_complete(true)
            .with_issuers(pool);
        Network {
            ledger: Arc::new(ledger),
            transport,
            account,
        }
    }

    fn issuer_urls(i: u8) -> (String, String) {
        (
            format!("https://validator{i}.example/metadata.json"),
            format!("https://attestation{i}.example"),
        )
    }

    fn serve_issuer(transport: &MockTransport, metadata_url: &str, service_url: &str, document: String) {
        transport.route(metadata_url, 200, document);
        transport.route(format!("{service_url}/status"), 200, r#"{"status":"ok","version":"1.1.0"}"#);
        transport.route(format!("{service_url}/attestations"), 201, r#"{"success":true}"#);
    }

    async fn derive_pepper(network: &Network) -> Pepper {
        let odis = MockOdis::new(&[9u8; 32]).unwrap();
        odis.install(&network.transport, ODIS_URL);
        let config = OdisConfig::for_testing(ODIS_URL, odis.public_key_base64());

        SaltDerivationService::from_config(
            BlsBlindingScheme,
            OdisHttpClient::new(Arc::clone(&network.transport), config.clone()),
            Arc::new(LocalKeySigner::from_bytes(&[0x42; 32]).unwrap()),
            &config,
        )
        .unwrap()
        .derive_pepper_for(PHONE)
        .await
        .unwrap()
    }

    type Service = AttestationService<MockLedger, MockTransport, DefaultDiscovery<MockLedger, MockTransport>>;

    fn attestation(network: &Network) -> Service {
        AttestationService::with_default_discovery(
            Arc::clone(&network.ledger),
            Arc::clone(&network.transport),
            AttestationConfig::for_testing(),
        )
    }

    // =========================================================================
    // END-TO-END
    // =========================================================================

    #[tokio::test]
    async fn test_fresh_account_is_fully_attested() {
        let network = network(3).await;
        let pepper = derive_pepper(&network).await;
        let service = attestation(&network);

        let report = service
            .request_attestations(PHONE, &pepper, true, &NoProgress)
            .await;

        assert_eq!(report.outcome, RoundOutcome::Success);
        assert_eq!(report.stat, AttestationStat { completed: 3, total: 3 });
        assert!(report.issuer_failures.is_empty());
        assert!(report.non_compliant_issuers.is_empty());

        // Every reveal carries the derived pepper for the same identifier.
        let phone = PhoneNumber::parse(PHONE).unwrap();
        let identifier = derive_identifier(&phone, &pepper);
        assert!(network.ledger.requests().iter().all(|(id, _, _)| *id == identifier));
        for i in 0..3 {
            let (_, service_url) = issuer_urls(i);
            let reveals = network.transport.requests_to(&format!("{service_url}/attestations"));
            assert_eq!(reveals.len(), 1);
            let body: serde_json::Value = serde_json::from_str(&reveals[0].body).unwrap();
            assert_eq!(body["salt"], pepper.as_str());
        }
    }

    #[tokio::test]
    async fn test_status_and_lookup_after_completion() {
        let network = network(3).await;
        let pepper = derive_pepper(&network).await;
        let service = attestation(&network);
        let phone = PhoneNumber::parse(PHONE).unwrap();

        assert_eq!(
            service.phone_number_status(PHONE, &pepper).await,
            Ok(PhoneNumberStatus::Unverified)
        );

        service
            .request_attestations(PHONE, &pepper, true, &NoProgress)
            .await;
        assert_eq!(
            service.phone_number_status(PHONE, &pepper).await,
            Ok(PhoneNumberStatus::Pending { completed: 3, total: 3 })
        );

        // The registry publishes the mapping once attestations complete.
        let account = network.account.address();
        network
            .ledger
            .set_accounts_for_identifier(derive_identifier(&phone, &pepper), vec![account]);
        network
            .ledger
            .set_accounts_for_identifier(unpeppered_identifier(&phone), vec![account]);

        assert_eq!(
            service.phone_number_status(PHONE, &pepper).await,
            Ok(PhoneNumberStatus::Verified)
        );
        let lookup = PhoneNumberLookup::new(Arc::clone(&network.ledger));
        assert_eq!(lookup.query(&phone).await, Ok(Some(account)));
    }

    #[tokio::test]
    async fn test_delegate_signed_issuer_is_actionable() {
        let account = LocalKeySigner::from_bytes(&[0x42; 32]).unwrap();
        let issuer = LocalKeySigner::from_bytes(&[0x70; 32]).unwrap();
        let delegate = LocalKeySigner::from_bytes(&[0x71; 32]).unwrap();
        let transport = Arc::new(MockTransport::new());

        let (metadata_url, service_url) = issuer_urls(7);
        let document = MetadataBuilder::new()
            .claim(json!({"timestamp": 1, "type": "ATTESTATION_SERVICE_URL", "url": service_url}))
            .sign_for(&issuer.address(), &delegate)
            .await
            .unwrap();
        serve_issuer(&transport, &metadata_url, &service_url, document);

        let ledger = MockLedger::new(Some(account.address()))
            .with_auto_complete(true)
            .with_issuers(vec![(issuer.address(), metadata_url)]);
        ledger.register_account(issuer.address());
        ledger.set_delegate(issuer.address(), SignerRole::Validator, delegate.address());
        let network = Network {
            ledger: Arc::new(ledger),
            transport,
            account,
        };

        let pepper = derive_pepper(&network).await;
        let report = attestation(&network)
            .request_attestations(PHONE, &pepper, false, &NoProgress)
            .await;

        assert!(report.is_success());
        assert!(report.non_compliant_issuers.is_empty());
        // One issuer in the pool answers every selection.
        assert_eq!(
            network
                .transport
                .requests_to(&format!("{service_url}/attestations"))
                .len(),
            3
        );
    }

    #[tokio::test]
    async fn test_coordinator_runs_round_in_background() {
        let network = network(3).await;
        let pepper = derive_pepper(&network).await;
        let coordinator = RoundCoordinator::new(Arc::new(attestation(&network)));
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = coordinator.attest(PHONE, pepper.clone(), Some(tx));
        let duplicate = coordinator.attest(PHONE, pepper, None);
        assert!(duplicate.joined_existing());

        let report = first.wait().await.unwrap();
        assert_eq!(report.final_outcome(), RoundOutcome::Success);
        assert!(report.fallback.is_none());
        assert_eq!(duplicate.wait().await.unwrap(), report);
        assert_eq!(network.ledger.selections(), 3);

        let mut messages = Vec::new();
        while let Some(event) = rx.recv().await {
            messages.push(event.message);
        }
        assert_eq!(messages.first().map(String::as_str), Some("Attestation stat is 0/0"));
        assert_eq!(messages.last().map(String::as_str), Some("Attestation stat is 3/3"));
    }
}

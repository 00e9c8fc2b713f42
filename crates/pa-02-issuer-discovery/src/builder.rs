//! Authoring signed metadata documents.

use pa_01_signature_verification::{checksum_bytes, keccak256, MessageSigner, SignatureError};
use serde_json::{json, Value};
use shared_types::Address;

use crate::domain::claims::aggregate_claims_hash;

/// Collects claims and signs them into a metadata document.
///
/// Each claim is serialized once; the exact bytes are both hashed and
/// written into the document, so the result verifies with
/// [`crate::ClaimDocument::claims_hash`].
#[derive(Debug, Default, Clone)]
pub struct MetadataBuilder {
    claims: Vec<String>,
}

impl MetadataBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a claim object.
    pub fn claim(mut self, claim: Value) -> Self {
        self.claims.push(claim.to_string());
        self
    }

    /// Sign as `signer` for its own address.
    pub async fn sign<S: MessageSigner + ?Sized>(&self, signer: &S) -> Result<String, SignatureError> {
        self.sign_for(&signer.address(), signer).await
    }

    /// Sign with `signer` on behalf of `account`, e.g. as its delegate.
    pub async fn sign_for<S: MessageSigner + ?Sized>(
        &self,
        account: &Address,
        signer: &S,
    ) -> Result<String, SignatureError> {
        let aggregate = aggregate_claims_hash(self.claims.iter().map(|c| keccak256(c.as_bytes())));
        let proof = signer.sign_personal_message(&aggregate).await?;

        let meta = json!({
            "address": checksum_bytes(account).as_str(),
            "signature": format!("0x{}", hex::encode(proof.to_rsv_bytes())),
        });
        Ok(format!(
            "{{\"claims\":[{}],\"meta\":{}}}",
            self.claims.join(","),
            meta
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::claims::ClaimDocument;
    use pa_01_signature_verification::{hash_personal_message, verify_signature, LocalKeySigner};

    #[tokio::test]
    async fn test_signed_document_parses_and_verifies() {
        let signer = LocalKeySigner::from_bytes(&[7; 32]).unwrap();
        let body = MetadataBuilder::new()
            .claim(json!({"timestamp": 10, "type": "NAME", "name": "Issuer"}))
            .claim(json!({"timestamp": 11, "type": "DOMAIN", "domain": "issuer.example"}))
            .sign(&signer)
            .await
            .unwrap();

        let doc = ClaimDocument::parse(&body).unwrap();
        assert_eq!(doc.claims.len(), 2);
        assert_eq!(doc.meta.address.to_bytes(), signer.address());
        assert!(verify_signature(
            &hash_personal_message(&doc.claims_hash()),
            &doc.meta.signature,
            &signer.address()
        ));
    }
}

//! Body of `POST <service>/attestations`.

use pa_01_signature_verification::checksum_bytes;
use pa_03_salt_derivation::{Pepper, PhoneNumber};
use serde::Serialize;
use shared_types::Address;

/// Issuer endpoint that sends the verification code.
pub const ATTESTATIONS_ENDPOINT: &str = "attestations";

/// Reveal of the phone number and salt to one selected issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRequest {
    pub phone_number: String,
    pub account: String,
    pub issuer: String,
    pub salt: String,
    pub sms_retriever_app_sig: Option<String>,
    pub security_code_prefix: Option<String>,
    pub language: Option<String>,
}

impl RevealRequest {
    pub fn new(
        phone: &PhoneNumber,
        account: &Address,
        issuer: &Address,
        pepper: &Pepper,
        security_code_prefix: Option<String>,
    ) -> Self {
        Self {
            phone_number: phone.as_str().to_string(),
            account: checksum_bytes(account).to_string(),
            issuer: checksum_bytes(issuer).to_string(),
            salt: pepper.as_str().to_string(),
            sms_retriever_app_sig: None,
            security_code_prefix,
            language: None,
        }
    }
}

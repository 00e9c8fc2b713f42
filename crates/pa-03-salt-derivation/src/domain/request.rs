//! Oracle wire messages.

use serde::{Deserialize, Serialize};

/// The oracle authenticates the request by the account's wallet key.
pub const AUTHENTICATION_METHOD_WALLET_KEY: &str = "wallet_key";

/// Body of `POST /getBlindedMessageSig`.
///
/// The authorization header signs the exact serialized body, so it is
/// serialized once and sent as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageRequest {
    /// Checksummed account address.
    pub account: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    /// Base64 of the blinded message.
    pub blinded_query_phone_number: String,
    pub authentication_method: String,
}

impl SignMessageRequest {
    pub fn wallet_key(account: String, timestamp: u64, blinded_query_phone_number: String) -> Self {
        Self {
            account,
            timestamp,
            blinded_query_phone_number,
            authentication_method: AUTHENTICATION_METHOD_WALLET_KEY.to_string(),
        }
    }
}

/// 2xx answer of the sign endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignMessageResponse {
    pub success: bool,
    /// Base64 of the blind signature.
    pub combined_signature: String,
}

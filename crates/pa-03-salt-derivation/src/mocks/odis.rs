//! In-process blind-signature oracle for tests.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use pa_01_signature_verification::{hash_personal_message, parse_address, verify_signature};
use parking_lot::Mutex;
use serde_json::json;
use shared_types::mocks::{MockTransport, RecordedRequest};
use shared_types::{join_url, HttpResponse};

use crate::adapters::bls::BlsBlindSigner;
use crate::domain::config::SIGN_MESSAGE_ENDPOINT;
use crate::domain::errors::BlindingError;
use crate::domain::request::SignMessageRequest;

/// Oracle that really blind-signs, served through a [`MockTransport`] route.
///
/// It checks the authorization header against the request's account and
/// answers 401 on mismatch, 400 on a bad body and 403 once its quota is used.
pub struct MockOdis {
    signer: BlsBlindSigner,
    state: Mutex<OdisState>,
}

struct OdisState {
    quota: Option<usize>,
    served: usize,
}

impl MockOdis {
    pub fn new(seed: &[u8; 32]) -> Result<Arc<Self>, BlindingError> {
        Ok(Arc::new(Self {
            signer: BlsBlindSigner::from_seed(seed)?,
            state: Mutex::new(OdisState {
                quota: None,
                served: 0,
            }),
        }))
    }

    /// Answer 403 after `quota` successful signatures.
    pub fn set_quota(&self, quota: usize) {
        self.state.lock().quota = Some(quota);
    }

    /// Base64 public key, as found in an oracle config.
    pub fn public_key_base64(&self) -> String {
        STANDARD.encode(self.signer.public_key())
    }

    /// Plain signature on `message`, for comparing against unblinded output.
    pub fn expected_signature(&self, message: &[u8]) -> Vec<u8> {
        self.signer.sign(message)
    }

    /// Signatures served so far.
    pub fn served(&self) -> usize {
        self.state.lock().served
    }

    /// Serve the sign endpoint under `base_url` on `transport`.
    pub fn install(self: &Arc<Self>, transport: &MockTransport, base_url: &str) {
        let oracle = Arc::clone(self);
        transport.route_handler(join_url(base_url, SIGN_MESSAGE_ENDPOINT), move |request| {
            Ok(oracle.handle(request))
        });
    }

    fn handle(&self, request: &RecordedRequest) -> HttpResponse {
        let Ok(body) = serde_json::from_str::<SignMessageRequest>(&request.body) else {
            return HttpResponse::new(400, "invalid request");
        };

        if !self.authorized(request, &body) {
            return HttpResponse::new(401, "signature mismatch");
        }

        let mut state = self.state.lock();
        if state.quota.is_some_and(|quota| state.served >= quota) {
            return HttpResponse::new(403, "out of quota");
        }

        let signed = STANDARD
            .decode(&body.blinded_query_phone_number)
            .map_err(|_| ())
            .and_then(|blinded| self.signer.sign_blinded(&blinded).map_err(|_| ()));
        match signed {
            Ok(signature) => {
                state.served += 1;
                let response = json!({
                    "success": true,
                    "combinedSignature": STANDARD.encode(signature),
                });
                HttpResponse::new(200, response.to_string())
            }
            Err(()) => HttpResponse::new(400, "invalid blinded message"),
        }
    }

    fn authorized(&self, request: &RecordedRequest, body: &SignMessageRequest) -> bool {
        let Some((_, header)) = request
            .headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("authorization"))
        else {
            return false;
        };
        let Ok(signature) = hex::decode(header.strip_prefix("0x").unwrap_or(header)) else {
            return false;
        };
        let Ok(account) = parse_address(&body.account) else {
            return false;
        };
        verify_signature(
            &hash_personal_message(request.body.as_bytes()),
            &signature,
            &account,
        )
    }
}

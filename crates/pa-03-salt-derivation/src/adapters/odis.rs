//! HTTP client for the oracle sign endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{join_url, HttpTransport, TransportError};
use pa_telemetry::log_event;

use crate::domain::config::{OdisConfig, SIGN_MESSAGE_ENDPOINT};
use crate::domain::errors::OdisError;
use crate::domain::request::SignMessageResponse;
use crate::ports::outbound::BlindSignatureOracle;

/// [`BlindSignatureOracle`] over an [`HttpTransport`], with retry and
/// exponential backoff.
pub struct OdisHttpClient<T: HttpTransport + ?Sized> {
    transport: Arc<T>,
    config: OdisConfig,
}

impl<T: HttpTransport + ?Sized> OdisHttpClient<T> {
    pub fn new(transport: Arc<T>, config: OdisConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &OdisConfig {
        &self.config
    }

    async fn attempt(&self, url: &str, body: &str, authorization: &str) -> Result<String, OdisError> {
        let headers = [("Authorization", authorization), ("Accept", "application/json")];
        let response = tokio::time::timeout(
            self.config.request_timeout,
            self.transport.post_json(url, body, &headers),
        )
        .await
        .map_err(|_| OdisError::Transport(TransportError::Timeout(url.to_string())))?
        .map_err(OdisError::Transport)?;

        if !response.is_success() {
            return Err(OdisError::from_status(response.status));
        }

        let parsed: SignMessageResponse = serde_json::from_str(&response.body)
            .map_err(|e| OdisError::MalformedResponse(e.to_string()))?;
        if !parsed.success {
            return Err(OdisError::MalformedResponse("success is false".into()));
        }
        Ok(parsed.combined_signature)
    }
}

#[async_trait]
impl<T: HttpTransport + ?Sized> BlindSignatureOracle for OdisHttpClient<T> {
    async fn sign_blinded(&self, body: &str, authorization: &str) -> Result<String, OdisError> {
        let url = join_url(&self.config.url, SIGN_MESSAGE_ENDPOINT);
        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.attempt(&url, body, authorization).await {
                Ok(signature) => {
                    log_event!(debug, "salt", "oracle returned blind signature", attempt);
                    return Ok(signature);
                }
                Err(e) if e.is_retryable() && attempt < max_attempts => {
                    let delay = self.config.backoff_for(attempt);
                    log_event!(
                        warn,
                        "salt",
                        "oracle call failed, retrying",
                        attempt,
                        max_attempts,
                        ?delay,
                        error = %e
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::mocks::MockTransport;
    use shared_types::HttpResponse;

    const URL: &str = "http://odis.test/getBlindedMessageSig";

    fn client(transport: &Arc<MockTransport>) -> OdisHttpClient<MockTransport> {
        OdisHttpClient::new(
            Arc::clone(transport),
            OdisConfig::for_testing("http://odis.test/", "unused"),
        )
    }

    #[tokio::test]
    async fn test_success_sends_headers() {
        let transport = Arc::new(MockTransport::new());
        transport.route(URL, 200, r#"{"success":true,"combinedSignature":"c2ln"}"#);

        let signature = client(&transport).sign_blinded("{}", "0xauth").await.unwrap();
        assert_eq!(signature, "c2ln");

        let requests = transport.requests_to(URL);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].body, "{}");
        assert!(requests[0]
            .headers
            .contains(&("Authorization".to_string(), "0xauth".to_string())));
    }

    #[tokio::test]
    async fn test_classified_errors_retried_to_budget() {
        let transport = Arc::new(MockTransport::new());
        transport.route(URL, 403, "quota");

        let result = client(&transport).sign_blinded("{}", "0xauth").await;
        assert_eq!(result, Err(OdisError::QuotaExceeded));
        assert_eq!(transport.requests_to(URL).len(), 3);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failure() {
        let transport = Arc::new(MockTransport::new());
        transport.route_sequence(
            URL,
            vec![
                Err(TransportError::Connection("odis.test".into())),
                Ok(HttpResponse::new(500, "")),
                Ok(HttpResponse::new(200, r#"{"success":true,"combinedSignature":"b2s="}"#)),
            ],
        );

        let signature = client(&transport).sign_blinded("{}", "0xauth").await.unwrap();
        assert_eq!(signature, "b2s=");
        assert_eq!(transport.requests_to(URL).len(), 3);
    }

    #[tokio::test]
    async fn test_malformed_body_not_retried() {
        let transport = Arc::new(MockTransport::new());
        transport.route(URL, 200, r#"{"success":true}"#);

        let result = client(&transport).sign_blinded("{}", "0xauth").await;
        assert!(matches!(result, Err(OdisError::MalformedResponse(_))));
        assert_eq!(transport.requests_to(URL).len(), 1);
    }

    #[tokio::test]
    async fn test_unsuccessful_body_rejected() {
        let transport = Arc::new(MockTransport::new());
        transport.route(URL, 200, r#"{"success":false,"combinedSignature":""}"#);

        let result = client(&transport).sign_blinded("{}", "0xauth").await;
        assert!(matches!(result, Err(OdisError::MalformedResponse(_))));
    }
}

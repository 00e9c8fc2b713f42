//! # HTTP Transport Port
//!
//! Issuer services, metadata documents and the salt oracle are all reached
//! over plain HTTP(S). Services depend on this trait, not on a client
//! library, so tests can route requests to in-memory fakes.

use crate::errors::TransportError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Status code and body of an HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response body as text.
    pub body: String,
}

impl HttpResponse {
    /// Build a response.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Minimal HTTP client used by every outbound call.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// `GET url`, following redirects.
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError>;

    /// `POST url` with a JSON `body` sent byte-for-byte and extra `headers`.
    async fn post_json(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError>;
}

/// Timeouts applied by the HTTP adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Whole-request timeout.
    pub request_timeout: Duration,
    /// TCP/TLS connect timeout.
    pub connect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(10),
            connect_timeout: Duration::from_secs(5),
        }
    }
}

/// Join `base` and `path` with exactly one slash between them.
pub fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_url_without_trailing_slash() {
        assert_eq!(
            join_url("https://issuer.example", "status"),
            "https://issuer.example/status"
        );
    }

    #[test]
    fn test_join_url_with_trailing_slash() {
        assert_eq!(
            join_url("https://issuer.example/", "/attestations"),
            "https://issuer.example/attestations"
        );
    }

    #[test]
    fn test_success_range() {
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}

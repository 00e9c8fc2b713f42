//! reqwest-backed [`HttpTransport`].

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, trace};

use crate::errors::TransportError;
use crate::transport::{HttpResponse, HttpTransport, TransportConfig};

/// HTTP transport over a shared `reqwest` client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Create a transport with the given timeouts.
    pub fn new(config: &TransportConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .build()
            .map_err(|e| TransportError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client })
    }
}

fn map_error(url: &str, e: reqwest::Error) -> TransportError {
    let error = if e.is_connect() {
        TransportError::Connection(format!("Cannot connect to {url}"))
    } else if e.is_timeout() {
        TransportError::Timeout(url.to_string())
    } else {
        TransportError::Request(e.to_string())
    };
    debug!(url, error = %e, mapped = %error, "HTTP request failed");
    error
}

async fn into_response(url: &str, response: reqwest::Response) -> Result<HttpResponse, TransportError> {
    let status = response.status().as_u16();
    let body = response.text().await.map_err(|e| map_error(url, e))?;
    trace!(url, status, bytes = body.len(), "HTTP response");
    Ok(HttpResponse { status, body })
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, url: &str) -> Result<HttpResponse, TransportError> {
        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| map_error(url, e))?;

        into_response(url, response).await
    }

    async fn post_json(
        &self,
        url: &str,
        body: &str,
        headers: &[(&str, &str)],
    ) -> Result<HttpResponse, TransportError> {
        let mut request = self
            .client
            .post(url)
            .header("Accept", "application/json")
            .header("Content-Type", "application/json")
            .body(body.to_owned());

        for (name, value) in headers {
            request = request.header(*name, *value);
        }

        let response = request.send().await.map_err(|e| map_error(url, e))?;
        into_response(url, response).await
    }
}

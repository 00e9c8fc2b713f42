//! # Error Types
//!
//! Errors raised by the two external collaborators: the ledger client and
//! the HTTP transport.

use thiserror::Error;

/// Errors returned by a [`crate::ledger::LedgerClient`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Node unreachable or the RPC call failed in transit.
    #[error("Ledger transport error: {0}")]
    Transport(String),

    /// The transaction or call was reverted by the contract.
    #[error("Contract call reverted: {0}")]
    Reverted(String),

    /// The node answered with data the client could not decode.
    #[error("Malformed ledger response: {0}")]
    Malformed(String),
}

/// Errors returned by a [`crate::transport::HttpTransport`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// Could not connect to the remote host.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The request timed out.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Any other request failure (TLS, body read, bad URL).
    #[error("HTTP request failed: {0}")]
    Request(String),
}

/// Last error in the `source()` chain of `error`, or `error` itself.
pub fn innermost_cause<'a>(error: &'a (dyn std::error::Error + 'static)) -> &'a (dyn std::error::Error + 'static) {
    let mut current = error;
    while let Some(next) = current.source() {
        current = next;
    }
    current
}

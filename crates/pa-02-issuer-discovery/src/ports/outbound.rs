//! # Outbound Ports (Driven Ports / SPI)
//!
//! Discovery depends on three collaborators, all defined elsewhere:
//!
//! - [`HttpTransport`]: metadata downloads and status checks
//! - [`LedgerClient`]: completable attestations for an identifier
//! - [`SignatureVerificationApi`]: metadata signature checks with the
//!   delegate-signer fallback

pub use pa_01_signature_verification::SignatureVerificationApi;
pub use shared_types::{HttpTransport, LedgerClient};

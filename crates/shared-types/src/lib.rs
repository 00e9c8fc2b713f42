//! # Shared Types Crate
//!
//! Data model, external-collaborator ports and test doubles shared by every
//! phone-attestation crate.
//!
//! ## Contents
//!
//! - **Entities**: `Identifier`, `AttestationStat`, `UnselectedRequest`,
//!   `CompletableAttestations`, `SignerRole`.
//! - **Ports**: `LedgerClient` (attestation registry and chain head) and
//!   `HttpTransport` (issuer services, metadata documents, salt oracle).
//! - **Adapters**: `ReqwestTransport`.
//! - **Mocks**: `MockLedger`, `MockTransport`.
//!
//! ## Design Principles
//!
//! - **Explicit session**: one `LedgerClient` per active account and network,
//!   constructed by the caller and passed down. No global handles.
//! - **Sequential ledger access**: a round awaits each ledger call before
//!   issuing the next.

pub mod adapters;
pub mod entities;
pub mod errors;
pub mod ledger;
pub mod mocks;
pub mod transport;

pub use adapters::ReqwestTransport;
pub use entities::*;
pub use errors::*;
pub use ledger::LedgerClient;
pub use transport::{join_url, HttpResponse, HttpTransport, TransportConfig};

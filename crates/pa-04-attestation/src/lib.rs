//! # Attestation (PA-04)
//!
//! Drives an account's attestation round against the registry: request,
//! wait for the selection window, select issuers, resolve them and reveal
//! the phone number to each.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): outcomes, error taxonomy, reveal body,
//!   security-code prefix, configuration
//! - **Ports Layer** (`ports/`): `AttestationApi` in; `LedgerClient`,
//!   `HttpTransport`, `IssuerDiscoveryApi` and `ProgressSink` out
//! - **Service Layer** (`service.rs`): the state machine and two-pass policy
//! - **Coordination** (`coordinator.rs`, `lookup.rs`, `inflight.rs`):
//!   background rounds and lookups, de-duplicated per phone number
//!
//! ## Failure Classes
//!
//! | Error | Outcome | Retried |
//! |-------|---------|---------|
//! | `NoAddress` | `NO_ADDRESS` | no |
//! | `InvalidInput` | `BAD_PHONE_NUMBER` | no |
//! | `TransientNetwork` | `NETWORK_ERROR` | by the caller |
//! | `UntrustedData` | `NETWORK_ERROR` | no |
//! | `ProtocolTimeout` | `SELECTION_TIMEOUT` | by the caller |
//! | `InconsistentState` | `INCONSISTENT_STATE` | no |
//!
//! Reveal failures for a single issuer are not errors: they are collected in
//! the round report.

pub mod coordinator;
pub mod domain;
pub mod inflight;
pub mod lookup;
pub mod ports;
pub mod service;

pub use coordinator::{RoundCoordinator, RoundHandle};
pub use domain::config::AttestationConfig;
pub use domain::entities::{
    IssuerFailure, PhoneNumberStatus, ProgressEvent, RevealFailure, RoundOutcome, RoundReport,
    RoundState, TwoPassReport,
};
pub use domain::errors::AttestationError;
pub use domain::reveal::{RevealRequest, ATTESTATIONS_ENDPOINT};
pub use domain::security::security_code_prefix;
pub use inflight::{InflightMap, LeaderGuard, Slot};
pub use lookup::PhoneNumberLookup;
pub use ports::inbound::AttestationApi;
pub use ports::outbound::{NoProgress, ProgressSink};
pub use service::{AttestationService, DefaultDiscovery};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

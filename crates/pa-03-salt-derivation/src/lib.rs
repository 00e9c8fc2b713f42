//! # Salt Derivation (PA-03)
//!
//! Derives the per-account pepper for a phone number through a blind
//! signature oracle, and the on-chain identifier built from it.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): phone numbers, identifiers, peppers,
//!   oracle messages, configuration
//! - **Ports Layer** (`ports/`): `SaltDerivationApi` in; `BlindingScheme`,
//!   `BlindSignatureOracle` and `MessageSigner` out
//! - **Adapters** (`adapters/`): BLS12-381 blinding over `blst`, oracle HTTP
//!   client. The hosted oracle deployments sign over BLS12-377; the service
//!   refuses a config whose curve or key the scheme cannot use.
//! - **Service Layer** (`service.rs`): the exchange itself
//!
//! ## Privacy
//!
//! The phone number leaves the process only blinded. Peppers and phone
//! numbers are redacted in `Debug` output and masked in logs.

pub mod adapters;
pub mod domain;
pub mod mocks;
pub mod ports;
pub mod service;

pub use adapters::{BlsBlindSigner, BlsBlindingScheme, OdisHttpClient};
pub use domain::blinding::{BlindedQuery, PairingCurve};
pub use domain::config::{OdisConfig, OdisNetwork, SIGN_MESSAGE_ENDPOINT};
pub use domain::errors::{BlindingError, OdisError, PhoneNumberError, SaltError, SaltingCause};
pub use domain::identifier::{derive_identifier, unpeppered_identifier, PEPPER_SEPARATOR};
pub use domain::pepper::{Pepper, PEPPER_LENGTH};
pub use domain::phone::PhoneNumber;
pub use domain::request::{SignMessageRequest, SignMessageResponse, AUTHENTICATION_METHOD_WALLET_KEY};
pub use ports::inbound::SaltDerivationApi;
pub use ports::outbound::{BlindSignatureOracle, BlindingScheme};
pub use service::SaltDerivationService;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

//! # Adapters
//!
//! - `bls`: BLS12-381 blinding scheme and blind signer
//! - `odis`: HTTP client for the oracle sign endpoint

pub mod bls;
pub mod odis;

pub use bls::{BlsBlindSigner, BlsBlindingScheme};
pub use odis::OdisHttpClient;

//! # Adapters Module
//!
//! Infrastructure adapters implementing the ports.

pub mod local_signer;

pub use local_signer::LocalKeySigner;

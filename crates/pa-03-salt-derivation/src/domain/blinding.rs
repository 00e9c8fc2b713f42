//! Blinded query state kept between blinding and unblinding.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Pairing curve a blind signature scheme works over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PairingCurve {
    #[serde(rename = "bls12-381")]
    Bls12_381,
    #[serde(rename = "bls12-377")]
    Bls12_377,
}

impl PairingCurve {
    /// Parse `bls12-381` or `bls12-377` (`_` also accepted).
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().replace('_', "-").as_str() {
            "bls12-381" => Some(Self::Bls12_381),
            "bls12-377" => Some(Self::Bls12_377),
            _ => None,
        }
    }
}

impl fmt::Display for PairingCurve {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Bls12_381 => "bls12-381",
            Self::Bls12_377 => "bls12-377",
        })
    }
}

/// A blinded message together with the secret needed to unblind the answer.
pub struct BlindedQuery {
    message: Vec<u8>,
    blinded: Vec<u8>,
    factor: Zeroizing<Vec<u8>>,
}

impl BlindedQuery {
    pub fn new(message: Vec<u8>, blinded: Vec<u8>, factor: Vec<u8>) -> Self {
        Self {
            message,
            blinded,
            factor: Zeroizing::new(factor),
        }
    }

    /// The original message. Never sent anywhere.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// What the oracle gets to see.
    pub fn blinded(&self) -> &[u8] {
        &self.blinded
    }

    pub fn factor(&self) -> &[u8] {
        &self.factor
    }
}

impl fmt::Debug for BlindedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BlindedQuery")
            .field("blinded", &hex::encode(&self.blinded))
            .finish_non_exhaustive()
    }
}

//! Pepper derivation from the unblinded oracle signature.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

/// Visible characters kept from the encoded digest.
pub const PEPPER_LENGTH: usize = 13;

/// Per-account secret mixed into the phone number hash.
#[derive(Clone, PartialEq, Eq)]
pub struct Pepper(String);

impl Pepper {
    /// `base64(sha256(signature))`, truncated to [`PEPPER_LENGTH`].
    pub fn from_signature(signature: &[u8]) -> Self {
        let mut encoded = STANDARD.encode(Sha256::digest(signature));
        let pepper = encoded[..PEPPER_LENGTH].to_string();
        encoded.zeroize();
        Self(pepper)
    }

    /// Wrap a pepper obtained elsewhere (e.g. persisted by the caller).
    pub fn from_string(pepper: impl Into<String>) -> Self {
        Self(pepper.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Pepper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Pepper(<redacted>)")
    }
}

impl Drop for Pepper {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

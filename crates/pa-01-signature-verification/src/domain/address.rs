//! # Checksum Addresses
//!
//! Mixed-case address encoding: hex digit `i` is upper-cased when nibble `i`
//! of keccak256(lower-case hex digits) is 8 or more.

use super::ecdsa::keccak256;
use super::errors::SignatureError;
use shared_types::Address;
use std::fmt;

/// A `0x`-prefixed address in checksum case.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChecksumAddress {
    encoded: String,
    bytes: Address,
}

impl ChecksumAddress {
    /// The encoded string.
    pub fn as_str(&self) -> &str {
        &self.encoded
    }

    /// Decoded 20 bytes.
    pub fn to_bytes(&self) -> Address {
        self.bytes
    }
}

impl fmt::Display for ChecksumAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded)
    }
}

impl AsRef<str> for ChecksumAddress {
    fn as_ref(&self) -> &str {
        &self.encoded
    }
}

/// True if `input` is `0x` followed by exactly 40 hex digits (any case).
pub fn is_valid_address(input: &str) -> bool {
    match input.strip_prefix("0x") {
        Some(digits) => digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()),
        None => false,
    }
}

/// Checksum-encode a textual address.
///
/// # Errors
/// `InvalidAddress` unless `input` passes [`is_valid_address`].
pub fn checksum(input: &str) -> Result<ChecksumAddress, SignatureError> {
    let address = parse_address(input)?;
    Ok(checksum_bytes(&address))
}

/// Checksum-encode raw address bytes.
pub fn checksum_bytes(address: &Address) -> ChecksumAddress {
    let lower = hex::encode(address);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let byte = hash[i / 2];
        let nibble = if i % 2 == 0 { byte >> 4 } else { byte & 0x0f };
        if nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    ChecksumAddress {
        encoded: out,
        bytes: *address,
    }
}

/// Parse a `0x`-prefixed address, ignoring case.
pub fn parse_address(input: &str) -> Result<Address, SignatureError> {
    if !is_valid_address(input) {
        return Err(SignatureError::InvalidAddress(input.to_string()));
    }
    let mut address = [0u8; 20];
    hex::decode_to_slice(&input[2..], &mut address)
        .map_err(|_| SignatureError::InvalidAddress(input.to_string()))?;
    Ok(address)
}

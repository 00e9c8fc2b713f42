//! On-chain identifiers for phone numbers.

use pa_01_signature_verification::keccak256;
use shared_types::Identifier;

use super::pepper::Pepper;
use super::phone::PhoneNumber;

/// Joins the phone number and the pepper before hashing.
pub const PEPPER_SEPARATOR: &str = "__";

/// `keccak256(phone ‖ "__" ‖ pepper)`.
pub fn derive_identifier(phone: &PhoneNumber, pepper: &Pepper) -> Identifier {
    let mut preimage =
        String::with_capacity(phone.as_str().len() + PEPPER_SEPARATOR.len() + pepper.as_str().len());
    preimage.push_str(phone.as_str());
    preimage.push_str(PEPPER_SEPARATOR);
    preimage.push_str(pepper.as_str());
    Identifier::from_bytes(keccak256(preimage.as_bytes()))
}

/// `keccak256(phone)`, used by the public lookup path.
pub fn unpeppered_identifier(phone: &PhoneNumber) -> Identifier {
    Identifier::from_bytes(keccak256(phone.as_str().as_bytes()))
}

//! # ECDSA Recovery (secp256k1)
//!
//! Pure domain logic for personal-message hashing, signature parsing and
//! signer recovery.
//!
//! ## Security Notes
//!
//! - **Malleability**: recovery accepts high-S signatures by normalizing S and
//!   flipping the recovery parity; signing only ever emits low-S (EIP-2)
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - **Constant-Time Operations**: Uses `subtle` crate for side-channel resistance
//! - Uses k256 crate for cryptographic operations

use super::entities::{SignatureLayout, SignatureProof, SIGNATURE_LENGTH};
use super::errors::SignatureError;
use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};
use shared_types::{Address, Hash};
use subtle::{Choice, ConstantTimeEq};
use tracing::trace;

/// secp256k1 curve order n
/// n = 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFEBAAEDCE6AF48A03BBFD25E8CD0364141
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order (low-S boundary).
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

const PERSONAL_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n";

// =============================================================================
// HASHING
// =============================================================================

/// Keccak256 hash function.
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(data);
    let result = hasher.finalize();
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&result);
    hash
}

/// Personal-message hash:
/// `keccak256("\x19Ethereum Signed Message:\n" || len(message) || message)`,
/// with the length in decimal ASCII.
pub fn hash_personal_message(message: &[u8]) -> Hash {
    let mut hasher = Keccak256::new();
    hasher.update(PERSONAL_MESSAGE_PREFIX);
    hasher.update(message.len().to_string().as_bytes());
    hasher.update(message);
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&hasher.finalize());
    hash
}

// =============================================================================
// PARSING AND RECOVERY
// =============================================================================

/// Split a 65-byte signature according to `layout`, normalizing `v < 27`
/// by adding 27.
pub fn parse_signature(
    signature: &[u8],
    layout: SignatureLayout,
) -> Result<SignatureProof, SignatureError> {
    if signature.len() != SIGNATURE_LENGTH {
        return Err(SignatureError::InvalidLength {
            expected: SIGNATURE_LENGTH,
            actual: signature.len(),
        });
    }

    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    let v = match layout {
        SignatureLayout::Rsv => {
            r.copy_from_slice(&signature[..32]);
            s.copy_from_slice(&signature[32..64]);
            signature[64]
        }
        SignatureLayout::Vrs => {
            r.copy_from_slice(&signature[1..33]);
            s.copy_from_slice(&signature[33..65]);
            signature[0]
        }
    };

    let v = if v < 27 { v.wrapping_add(27) } else { v };
    Ok(SignatureProof { r, s, v })
}

/// Recover the signer's address from a prehashed message.
///
/// Rejects out-of-range scalars. A high-S signature recovers the same
/// signer as its low-S twin.
pub fn recover_address(message_hash: &Hash, proof: &SignatureProof) -> Result<Address, SignatureError> {
    use zeroize::Zeroize;

    if !is_valid_scalar(&proof.r) || !is_valid_scalar(&proof.s) {
        return Err(SignatureError::InvalidFormat);
    }

    let recovery_id = parse_recovery_id(proof.v)?;

    // Negating S flips the recovery parity.
    let (s, recovery_id) = if is_low_s(&proof.s) {
        (proof.s, recovery_id)
    } else {
        (
            invert_s(&proof.s),
            RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
        )
    };

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&proof.r);
    sig_bytes[32..].copy_from_slice(&s);

    let sig = Signature::from_slice(&sig_bytes);
    sig_bytes.zeroize();
    let sig = sig.map_err(|_| SignatureError::InvalidFormat)?;

    let recovered_key = VerifyingKey::recover_from_prehash(message_hash, &sig, recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;

    Ok(address_from_pubkey(&recovered_key))
}

/// Check that `signature`, in either supported layout, recovers to `expected`.
///
/// Layouts are tried `(r,s,v)` first, then `(v,r,s)`; the first match wins.
pub fn verify_signature(message_hash: &Hash, signature: &[u8], expected: &Address) -> bool {
    for layout in SignatureLayout::ATTEMPT_ORDER {
        let recovered = parse_signature(signature, layout)
            .and_then(|proof| recover_address(message_hash, &proof));

        match recovered {
            Ok(address) if bool::from(address[..].ct_eq(&expected[..])) => {
                trace!(?layout, "signature matched");
                return true;
            }
            Ok(_) => trace!(?layout, "recovered a different signer"),
            Err(e) => trace!(?layout, error = %e, "layout did not recover"),
        }
    }
    false
}

/// Derive Ethereum address from public key.
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let pubkey_bytes = public_key.to_encoded_point(false);
    let pubkey_slice = pubkey_bytes.as_bytes();

    // Keccak256 hash of public key (without 0x04 prefix)
    let hash = keccak256(&pubkey_slice[1..]);

    let mut address = [0u8; 20];
    address.copy_from_slice(&hash[12..]);
    address
}

// =============================================================================
// SIGNING
// =============================================================================

/// Sign a prehashed message, returning a low-S signature with `v` in {27, 28}.
pub fn sign_prehash(message_hash: &Hash, key: &SigningKey) -> Result<SignatureProof, SignatureError> {
    let (sig, recid) = key
        .sign_prehash_recoverable(message_hash)
        .map_err(|e| SignatureError::SigningFailed(e.to_string()))?;

    let sig_bytes = sig.to_bytes();
    let mut r = [0u8; 32];
    let mut s = [0u8; 32];
    r.copy_from_slice(&sig_bytes[..32]);
    s.copy_from_slice(&sig_bytes[32..]);

    // Normalize S to low value (EIP-2); negating S flips the recovery parity.
    let (s, parity) = if is_low_s(&s) {
        (s, recid.is_y_odd())
    } else {
        (invert_s(&s), !recid.is_y_odd())
    };

    Ok(SignatureProof {
        r,
        s,
        v: 27 + u8::from(parity),
    })
}

// =============================================================================
// HELPER FUNCTIONS
// =============================================================================

/// Check if S value is in lower half of curve order (EIP-2 malleability protection).
///
/// Constant-time: the loop never exits early.
fn is_low_s(s: &[u8; 32]) -> bool {
    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = s[i];
        let h_byte = SECP256K1_HALF_ORDER[i];

        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < h_byte) as u8);
        let byte_greater = Choice::from((s_byte > h_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    less.into()
}

/// Check if a scalar value is in valid range [1, n-1] for ECDSA.
fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let mut is_zero = Choice::from(1u8);
    for &byte in scalar {
        is_zero &= byte.ct_eq(&0u8);
    }

    let mut less = Choice::from(0u8);
    let mut greater = Choice::from(0u8);

    for i in 0..32 {
        let s_byte = scalar[i];
        let n_byte = SECP256K1_ORDER[i];

        let not_decided = !(less | greater);
        let byte_less = Choice::from((s_byte < n_byte) as u8);
        let byte_greater = Choice::from((s_byte > n_byte) as u8);

        less |= not_decided & byte_less;
        greater |= not_decided & byte_greater;
    }

    (!is_zero & less).into()
}

/// Parse recovery ID from v value.
///
/// Valid v values: 0, 1, 27, 28
fn parse_recovery_id(v: u8) -> Result<RecoveryId, SignatureError> {
    let id = match v {
        0 | 27 => 0,
        1 | 28 => 1,
        _ => return Err(SignatureError::InvalidRecoveryId(v)),
    };

    RecoveryId::try_from(id).map_err(|_| SignatureError::InvalidRecoveryId(v))
}

/// s' = n - s
fn invert_s(s: &[u8; 32]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let mut borrow: i32 = 0;

    for i in (0..32).rev() {
        let diff = (SECP256K1_ORDER[i] as i32) - (s[i] as i32) - borrow;
        if diff < 0 {
            result[i] = (diff + 256) as u8;
            borrow = 1;
        } else {
            result[i] = diff as u8;
            borrow = 0;
        }
    }

    result
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;

    /// Generate a new ECDSA keypair and its address.
    pub fn generate_keypair() -> (SigningKey, Address) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(signing_key.verifying_key());
        (signing_key, address)
    }

    /// Sign the personal-message hash of `message`.
    pub fn sign_personal(message: &[u8], key: &SigningKey) -> SignatureProof {
        sign_prehash(&hash_personal_message(message), key).unwrap()
    }
}

// =============================================================================
// UNIT TESTS
// =============================================================================

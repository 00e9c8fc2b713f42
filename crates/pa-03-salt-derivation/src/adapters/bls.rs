//! BLS12-381 blind signatures (min-sig: signatures in G1, keys in G2).
//!
//! Blinding multiplies `H(m)` by a random non-zero scalar `r`; the signer
//! multiplies by its secret key; unblinding multiplies by `r⁻¹`. The
//! result equals a plain BLS signature on `m` and is verified as one.

use blst::min_sig::{PublicKey, SecretKey, Signature};
use blst::{
    blst_bendian_from_scalar, blst_hash_to_g1, blst_p1, blst_p1_affine, blst_p1_affine_in_g1,
    blst_p1_affine_is_inf, blst_p1_compress, blst_p1_from_affine, blst_p1_mult, blst_p1_uncompress,
    blst_scalar, blst_scalar_from_bendian, blst_sk_inverse, BLST_ERROR,
};
use rand::RngCore;
use zeroize::Zeroize;

use crate::domain::blinding::{BlindedQuery, PairingCurve};
use crate::domain::errors::BlindingError;
use crate::ports::outbound::BlindingScheme;

/// Hash-to-curve domain separation tag of the basic min-sig scheme.
pub const DST: &[u8] = b"BLS_SIG_BLS12381G1_XMD:SHA-256_SSWU_RO_NUL_";

const G1_COMPRESSED_LEN: usize = 48;
const SCALAR_BITS: usize = 255;

/// Client side of the exchange.
#[derive(Debug, Default, Clone, Copy)]
pub struct BlsBlindingScheme;

impl BlindingScheme for BlsBlindingScheme {
    fn curve(&self) -> PairingCurve {
        PairingCurve::Bls12_381
    }

    fn check_public_key(&self, public_key: &[u8]) -> Result<(), BlindingError> {
        PublicKey::key_validate(public_key)
            .map(|_| ())
            .map_err(|_| BlindingError::InvalidPublicKey)
    }

    fn blind(&self, message: &[u8]) -> Result<BlindedQuery, BlindingError> {
        let hashed = hash_to_g1(message);
        let factor = random_secret()?;
        let mut factor_bytes = factor.to_bytes();

        let blinded = mul_g1(&hashed, &factor_bytes);
        let query = BlindedQuery::new(
            message.to_vec(),
            compress_g1(&blinded).to_vec(),
            factor_bytes.to_vec(),
        );
        factor_bytes.zeroize();
        Ok(query)
    }

    fn unblind(
        &self,
        query: &BlindedQuery,
        blind_signature: &[u8],
        public_key: &[u8],
    ) -> Result<Vec<u8>, BlindingError> {
        let public_key =
            PublicKey::from_bytes(public_key).map_err(|_| BlindingError::InvalidPublicKey)?;
        let point = decompress_g1(blind_signature)?;

        let factor: &[u8; 32] = query
            .factor()
            .try_into()
            .map_err(|_| BlindingError::InvalidEncoding("blinding factor".into()))?;
        let mut inverse = invert(factor);
        let unblinded = mul_g1(&point, &inverse);
        inverse.zeroize();

        let encoded = compress_g1(&unblinded);
        let signature = Signature::from_bytes(&encoded).map_err(|_| BlindingError::InvalidPoint)?;
        let result = signature.verify(true, query.message(), DST, &[], &public_key, true);
        if result != BLST_ERROR::BLST_SUCCESS {
            return Err(BlindingError::VerificationFailed);
        }
        Ok(encoded.to_vec())
    }
}

/// Oracle side of the exchange: signs blinded points it cannot read.
pub struct BlsBlindSigner {
    secret: SecretKey,
}

impl BlsBlindSigner {
    /// Derive a key from at least 32 bytes of input keying material.
    pub fn from_seed(seed: &[u8]) -> Result<Self, BlindingError> {
        let secret = SecretKey::key_gen(seed, &[])
            .map_err(|_| BlindingError::InvalidEncoding("seed shorter than 32 bytes".into()))?;
        Ok(Self { secret })
    }

    /// Compressed G2 public key.
    pub fn public_key(&self) -> Vec<u8> {
        self.secret.sk_to_pk().to_bytes().to_vec()
    }

    /// Multiply a blinded G1 point by the secret key.
    pub fn sign_blinded(&self, blinded: &[u8]) -> Result<Vec<u8>, BlindingError> {
        let point = decompress_g1(blinded)?;
        let mut secret = self.secret.to_bytes();
        let signed = mul_g1(&point, &secret);
        secret.zeroize();
        Ok(compress_g1(&signed).to_vec())
    }

    /// Plain (unblinded) signature on `message`.
    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        self.secret.sign(message, DST, &[]).to_bytes().to_vec()
    }
}

fn random_secret() -> Result<SecretKey, BlindingError> {
    let mut ikm = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut ikm);
    let secret = SecretKey::key_gen(&ikm, &[]);
    ikm.zeroize();
    secret.map_err(|_| BlindingError::InvalidEncoding("blinding factor".into()))
}

fn hash_to_g1(message: &[u8]) -> blst_p1 {
    let mut out = blst_p1::default();
    // SAFETY: all pointers are valid for the lengths passed; `aug` is empty.
    unsafe {
        blst_hash_to_g1(
            &mut out,
            message.as_ptr(),
            message.len(),
            DST.as_ptr(),
            DST.len(),
            std::ptr::null(),
            0,
        );
    }
    out
}

/// `point * scalar` for a big-endian scalar.
fn mul_g1(point: &blst_p1, scalar_be: &[u8; 32]) -> blst_p1 {
    let mut scalar = blst_scalar::default();
    let mut out = blst_p1::default();
    // SAFETY: `scalar_be` is 32 bytes; `scalar.b` holds 255 significant bits.
    unsafe {
        blst_scalar_from_bendian(&mut scalar, scalar_be.as_ptr());
        blst_p1_mult(&mut out, point, scalar.b.as_ptr(), SCALAR_BITS);
    }
    scalar.b.zeroize();
    out
}

/// Modular inverse of a big-endian scalar, big-endian out.
fn invert(scalar_be: &[u8; 32]) -> [u8; 32] {
    let mut scalar = blst_scalar::default();
    let mut inverse = blst_scalar::default();
    let mut out = [0u8; 32];
    // SAFETY: fixed-size buffers of the lengths blst expects.
    unsafe {
        blst_scalar_from_bendian(&mut scalar, scalar_be.as_ptr());
        blst_sk_inverse(&mut inverse, &scalar);
        blst_bendian_from_scalar(out.as_mut_ptr(), &inverse);
    }
    scalar.b.zeroize();
    inverse.b.zeroize();
    out
}

fn compress_g1(point: &blst_p1) -> [u8; G1_COMPRESSED_LEN] {
    let mut out = [0u8; G1_COMPRESSED_LEN];
    // SAFETY: `out` has room for a compressed G1 point.
    unsafe { blst_p1_compress(out.as_mut_ptr(), point) };
    out
}

/// Decode a compressed G1 point, rejecting infinity and points off the subgroup.
fn decompress_g1(bytes: &[u8]) -> Result<blst_p1, BlindingError> {
    if bytes.len() != G1_COMPRESSED_LEN {
        return Err(BlindingError::InvalidEncoding(format!(
            "expected {G1_COMPRESSED_LEN} bytes, got {}",
            bytes.len()
        )));
    }
    let mut affine = blst_p1_affine::default();
    // SAFETY: `bytes` is exactly one compressed G1 point long.
    let result = unsafe { blst_p1_uncompress(&mut affine, bytes.as_ptr()) };
    if result != BLST_ERROR::BLST_SUCCESS {
        return Err(BlindingError::InvalidPoint);
    }
    // SAFETY: `affine` was initialised by the successful uncompress.
    let valid = unsafe { blst_p1_affine_in_g1(&affine) && !blst_p1_affine_is_inf(&affine) };
    if !valid {
        return Err(BlindingError::InvalidPoint);
    }
    let mut point = blst_p1::default();
    // SAFETY: both structs are valid.
    unsafe { blst_p1_from_affine(&mut point, &affine) };
    Ok(point)
}

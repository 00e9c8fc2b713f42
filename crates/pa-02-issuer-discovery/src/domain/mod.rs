//! # Domain Layer
//!
//! Document parsing, claim hashing and packed-string decoding. No I/O.

pub mod claims;
pub mod entities;
pub mod errors;
pub mod packed;

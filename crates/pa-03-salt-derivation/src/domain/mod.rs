//! # Domain Layer
//!
//! Phone numbers, identifiers, peppers and oracle messages. No I/O.

pub mod blinding;
pub mod config;
pub mod errors;
pub mod identifier;
pub mod pepper;
pub mod phone;
pub mod request;

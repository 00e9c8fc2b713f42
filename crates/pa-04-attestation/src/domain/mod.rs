//! # Domain Layer
//!
//! Round outcomes, the error taxonomy, configuration and reveal messages.

pub mod config;
pub mod entities;
pub mod errors;
pub mod reveal;
pub mod security;

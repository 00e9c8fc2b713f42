//! # Ports Layer
//!
//! - **Inbound (Driving)**: API that external callers use
//! - **Outbound (Driven)**: Dependencies this crate needs

pub mod inbound;
pub mod outbound;

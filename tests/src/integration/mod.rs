//! Cross-crate flows.

mod attestation_flow;
mod salt_flow;

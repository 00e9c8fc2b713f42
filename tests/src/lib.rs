//! # Phone-Attest Test Suite
//!
//! End-to-end flows across the workspace crates, run against the in-memory
//! ledger, transport and oracle.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── salt_flow.rs         # phone number → pepper → identifier
//!     └── attestation_flow.rs  # pepper → full round → status and lookup
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p pa-tests
//! cargo test -p pa-tests integration::attestation_flow
//! ```

pub mod integration;

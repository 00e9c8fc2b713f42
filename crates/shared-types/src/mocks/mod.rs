//! In-memory collaborators shared by every crate's tests.

mod ledger;
mod transport;

pub use ledger::{LedgerCall, MockLedger};
pub use transport::{MockTransport, RecordedRequest};

//! # Outbound Ports (Driven Ports / SPI)
//!
//! - [`LedgerClient`]: registry reads and writes, chain height
//! - [`HttpTransport`]: reveals to attestation services
//! - [`IssuerDiscoveryApi`]: resolution of the selected issuers
//! - [`ProgressSink`]: one-way progress reporting to the caller

use tokio::sync::mpsc;

pub use pa_02_issuer_discovery::IssuerDiscoveryApi;
pub use shared_types::{HttpTransport, LedgerClient};

use crate::domain::entities::ProgressEvent;

/// Receives progress events. Must not block.
pub trait ProgressSink: Send + Sync {
    fn report(&self, event: ProgressEvent);
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn report(&self, _event: ProgressEvent) {}
}

/// Forwards events to the caller's task. A closed receiver is ignored.
impl ProgressSink for mpsc::UnboundedSender<ProgressEvent> {
    fn report(&self, event: ProgressEvent) {
        let _ = self.send(event);
    }
}

//! Background attestation rounds, de-duplicated by phone number.
//!
//! Each round runs on its own tokio task. The caller's task receives the
//! final report over a oneshot channel and progress over an unbounded
//! mpsc channel, so nothing blocks the caller while the round waits on
//! the chain.

use std::sync::Arc;

use pa_03_salt_derivation::Pepper;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info};

use crate::domain::entities::{ProgressEvent, TwoPassReport};
use crate::inflight::{InflightMap, Slot};
use crate::ports::inbound::AttestationApi;
use crate::ports::outbound::NoProgress;

/// Starts rounds and hands late callers the result of the running one.
pub struct RoundCoordinator<A: AttestationApi + 'static> {
    service: Arc<A>,
    inflight: InflightMap<TwoPassReport>,
}

/// Pending result of [`RoundCoordinator::attest`].
pub struct RoundHandle {
    joined_existing: bool,
    receiver: oneshot::Receiver<TwoPassReport>,
}

impl RoundHandle {
    /// True if this call queued behind a round already running for the
    /// same phone number. Progress is only delivered to the first caller.
    pub fn joined_existing(&self) -> bool {
        self.joined_existing
    }

    /// Wait for the report. `None` if the round task died without one.
    pub async fn wait(self) -> Option<TwoPassReport> {
        self.receiver.await.ok()
    }
}

impl<A: AttestationApi + 'static> RoundCoordinator<A> {
    pub fn new(service: Arc<A>) -> Self {
        Self {
            service,
            inflight: InflightMap::new(),
        }
    }

    /// Start the two-pass round for `phone`, or join the one in flight.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attest(
        &self,
        phone: &str,
        pepper: Pepper,
        progress: Option<mpsc::UnboundedSender<ProgressEvent>>,
    ) -> RoundHandle {
        let guard = match self.inflight.join(phone) {
            Slot::Follower(receiver) => {
                debug!("attestation round already running, queued");
                return RoundHandle {
                    joined_existing: true,
                    receiver,
                };
            }
            Slot::Leader(guard) => guard,
        };

        let (sender, receiver) = oneshot::channel();
        let service = Arc::clone(&self.service);
        let phone = phone.to_string();

        tokio::spawn(async move {
            let report = match &progress {
                Some(sink) => {
                    service
                        .attest_with_security_code_fallback(&phone, &pepper, sink)
                        .await
                }
                None => {
                    service
                        .attest_with_security_code_fallback(&phone, &pepper, &NoProgress)
                        .await
                }
            };

            let queued = guard.complete(report.clone());
            info!(outcome = %report.final_outcome(), queued, "attestation round finished");
            let _ = sender.send(report);
        });

        RoundHandle {
            joined_existing: false,
            receiver,
        }
    }

    /// Phone numbers with a round running.
    pub fn rounds_in_flight(&self) -> usize {
        self.inflight.in_flight()
    }
}

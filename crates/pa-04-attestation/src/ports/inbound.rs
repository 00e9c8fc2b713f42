//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;
use pa_03_salt_derivation::Pepper;

use crate::domain::entities::{PhoneNumberStatus, RoundReport, TwoPassReport};
use crate::domain::errors::AttestationError;
use crate::ports::outbound::ProgressSink;

/// Attestation rounds for the ledger client's local account.
#[async_trait]
pub trait AttestationApi: Send + Sync {
    /// Run one pass of the state machine until the configured number of
    /// attestations has been requested, or a terminal failure.
    ///
    /// Never returns an error: failures are the report's outcome.
    async fn request_attestations(
        &self,
        phone: &str,
        pepper: &Pepper,
        use_security_code: bool,
        progress: &dyn ProgressSink,
    ) -> RoundReport;

    /// First pass with the security-code prefix; if it does not succeed,
    /// a second pass without it.
    async fn attest_with_security_code_fallback(
        &self,
        phone: &str,
        pepper: &Pepper,
        progress: &dyn ProgressSink,
    ) -> TwoPassReport;

    /// Whether the registry maps `phone` to the local account.
    async fn phone_number_status(
        &self,
        phone: &str,
        pepper: &Pepper,
    ) -> Result<PhoneNumberStatus, AttestationError>;
}

//! # Domain Entities
//!
//! Outcomes, progress events and reports of an attestation round.

use std::fmt;

use serde::Serialize;
use shared_types::{Address, AttestationStat, TransportError};

use crate::domain::errors::AttestationError;

/// Terminal outcome of a round, with the numeric codes callers persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoundOutcome {
    Success,
    NoAddress,
    BadPhoneNumber,
    NetworkError,
    InconsistentState,
    SelectionTimeout,
}

impl RoundOutcome {
    pub fn code(&self) -> u8 {
        match self {
            Self::Success => 0,
            Self::NoAddress => 1,
            Self::BadPhoneNumber => 2,
            Self::NetworkError => 3,
            Self::InconsistentState => 4,
            Self::SelectionTimeout => 5,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }
}

impl fmt::Display for RoundOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::NoAddress => "NO_ADDRESS",
            Self::BadPhoneNumber => "BAD_PHONE_NUMBER",
            Self::NetworkError => "NETWORK_ERROR",
            Self::InconsistentState => "INCONSISTENT_STATE",
            Self::SelectionTimeout => "SELECTION_TIMEOUT",
        };
        f.write_str(name)
    }
}

/// States of the round state machine, in loop order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RoundState {
    StatCheck,
    FeeCheck,
    Request,
    WaitWindow,
    SelectIssuers,
    DiscoverUrls,
    RevealToIssuers,
}

/// Advisory progress message. Never affects control flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub state: RoundState,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(state: RoundState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// Why a reveal to one issuer failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevealFailure {
    /// The attestation service answered outside 2xx.
    Http { status: u16, body: String },
    /// The attestation service could not be reached.
    Transport(TransportError),
    /// The reveal body could not be built.
    Encoding(String),
}

impl fmt::Display for RevealFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Http { status, body } => write!(f, "status {status}: {body}"),
            Self::Transport(e) => write!(f, "{e}"),
            Self::Encoding(e) => write!(f, "encoding failed: {e}"),
        }
    }
}

/// Soft, per-issuer reveal failure. Collected, never fatal to the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerFailure {
    pub issuer: Address,
    pub name: Option<String>,
    pub service_url: String,
    pub failure: RevealFailure,
}

/// Result of one pass of the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    pub outcome: RoundOutcome,
    /// Last stat read from the registry.
    pub stat: AttestationStat,
    /// Attestations requested by this pass.
    pub iterations: u32,
    pub issuer_failures: Vec<IssuerFailure>,
    /// Issuers that failed resolution, de-duplicated.
    pub non_compliant_issuers: Vec<Address>,
    /// Cause of a non-success outcome.
    pub error: Option<AttestationError>,
}

impl RoundReport {
    /// A pass that ended before touching the registry.
    pub fn rejected(error: AttestationError) -> Self {
        Self {
            outcome: error.outcome(),
            stat: AttestationStat::default(),
            iterations: 0,
            issuer_failures: Vec::new(),
            non_compliant_issuers: Vec::new(),
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// Result of the two-pass security-code policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoPassReport {
    /// First pass; sent the security-code prefix when `security_code_used`.
    pub first: RoundReport,
    pub security_code_used: bool,
    /// Second pass without the prefix, run only if the first failed.
    pub fallback: Option<RoundReport>,
}

impl TwoPassReport {
    /// The pass that decided the result.
    pub fn final_report(&self) -> &RoundReport {
        self.fallback.as_ref().unwrap_or(&self.first)
    }

    pub fn final_outcome(&self) -> RoundOutcome {
        self.final_report().outcome
    }
}

/// Association between the local account and a phone number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PhoneNumberStatus {
    /// The registry maps the number to the local account.
    Verified,
    /// Attestations were requested but the mapping is not in place yet.
    Pending { completed: u32, total: u32 },
    /// Nothing was ever requested.
    Unverified,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_codes() {
        let codes: Vec<u8> = [
            RoundOutcome::Success,
            RoundOutcome::NoAddress,
            RoundOutcome::BadPhoneNumber,
            RoundOutcome::NetworkError,
            RoundOutcome::InconsistentState,
            RoundOutcome::SelectionTimeout,
        ]
        .iter()
        .map(RoundOutcome::code)
        .collect();
        assert_eq!(codes, vec![0, 1, 2, 3, 4, 5]);
        assert_eq!(RoundOutcome::SelectionTimeout.to_string(), "SELECTION_TIMEOUT");
    }

    #[test]
    fn test_two_pass_final_report() {
        let first = RoundReport::rejected(AttestationError::NoAddress);
        let mut report = TwoPassReport {
            first: first.clone(),
            security_code_used: true,
            fallback: None,
        };
        assert_eq!(report.final_outcome(), RoundOutcome::NoAddress);

        let mut second = first;
        second.outcome = RoundOutcome::Success;
        second.error = None;
        report.fallback = Some(second);
        assert!(report.final_report().is_success());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_string(&PhoneNumberStatus::Pending {
            completed: 1,
            total: 3,
        })
        .unwrap();
        assert_eq!(json, r#"{"status":"pending","completed":1,"total":3}"#);
    }
}

//! # Attestation Service
//!
//! The round state machine:
//!
//! ```text
//! STAT_CHECK ─(total ≥ cap)─▶ SUCCESS
//!     │
//!     ▼
//! FEE_CHECK ─(unexpired request pending)─┐
//!     │                                  │
//!     ▼                                  │
//! REQUEST ───────────────────────────────┤
//!                                        ▼
//!                                   WAIT_WINDOW ─(120 s)─▶ SELECTION_TIMEOUT
//!                                        │
//!                                        ▼
//!                 SELECT_ISSUERS ─▶ DISCOVER_URLS ─▶ REVEAL_TO_ISSUERS ─▶ STAT_CHECK
//! ```
//!
//! Exactly one attestation is requested per iteration. Ledger calls are
//! awaited one at a time. Reveal failures are collected per issuer and
//! never end the round.

use std::sync::Arc;

use async_trait::async_trait;
use pa_01_signature_verification::SignatureVerificationService;
use pa_02_issuer_discovery::{IssuerDiscoveryService, IssuerPartition, IssuerRecord, MetadataFetcher};
use pa_03_salt_derivation::{derive_identifier, Pepper, PhoneNumber};
use pa_telemetry::{log_event, log_round_event};
use shared_types::{address_hex, join_url, Address, AttestationStat, Identifier, LedgerError, U256};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::domain::config::AttestationConfig;
use crate::domain::entities::{
    IssuerFailure, PhoneNumberStatus, ProgressEvent, RevealFailure, RoundOutcome, RoundReport,
    RoundState, TwoPassReport,
};
use crate::domain::errors::AttestationError;
use crate::domain::reveal::{RevealRequest, ATTESTATIONS_ENDPOINT};
use crate::domain::security::security_code_prefix;
use crate::ports::inbound::AttestationApi;
use crate::ports::outbound::{HttpTransport, IssuerDiscoveryApi, LedgerClient, ProgressSink};

/// Attestations requested per iteration.
const ATTESTATIONS_PER_ITERATION: u32 = 1;

/// Issuer discovery over the same ledger and transport, verifying metadata
/// with the delegate-signer fallback.
pub type DefaultDiscovery<L, T> =
    IssuerDiscoveryService<L, T, MetadataFetcher<T, SignatureVerificationService<L>>>;

/// Runs attestation rounds for the ledger client's local account.
pub struct AttestationService<L, T, D>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    D: IssuerDiscoveryApi,
{
    ledger: Arc<L>,
    transport: Arc<T>,
    discovery: D,
    config: AttestationConfig,
}

impl<L, T> AttestationService<L, T, DefaultDiscovery<L, T>>
where
    L: LedgerClient,
    T: HttpTransport,
{
    /// Wire the standard discovery stack from `config`.
    pub fn with_default_discovery(ledger: Arc<L>, transport: Arc<T>, config: AttestationConfig) -> Self {
        let fetcher = MetadataFetcher::new(
            Arc::clone(&transport),
            SignatureVerificationService::new(Arc::clone(&ledger)),
        );
        let discovery = IssuerDiscoveryService::new(Arc::clone(&ledger), Arc::clone(&transport), fetcher)
            .with_metadata_attempts(config.metadata_fetch_attempts);
        Self::new(ledger, transport, discovery, config)
    }
}

impl<L, T, D> AttestationService<L, T, D>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    D: IssuerDiscoveryApi,
{
    pub fn new(ledger: Arc<L>, transport: Arc<T>, discovery: D, config: AttestationConfig) -> Self {
        Self {
            ledger,
            transport,
            discovery,
            config,
        }
    }

    pub fn config(&self) -> &AttestationConfig {
        &self.config
    }

    // =========================================================================
    // STATE MACHINE
    // =========================================================================

    async fn drive(&self, round: &mut Round<'_>) -> Result<(), AttestationError> {
        loop {
            let stat = self
                .ledger
                .attestation_stat(&round.identifier, &round.account)
                .await
                .map_err(AttestationError::network("reading the attestation stat"))?;

            if round.iterations > 0 && stat.total <= round.stat.total {
                return Err(AttestationError::inconsistent(format!(
                    "issuer selection did not add an attestation (total stays {})",
                    stat.total
                )));
            }
            round.stat = stat;
            round.emit(
                RoundState::StatCheck,
                format!("Attestation stat is {}/{}", stat.completed, stat.total),
            );

            if stat.total >= self.config.max_attestations {
                return Ok(());
            }

            round.iterations += 1;
            self.ensure_request(round).await?;
            self.wait_for_selection_window(round).await?;
            self.select_issuers(round).await?;
            let actionable = self.discover(round).await?;
            self.reveal_to_issuers(round, &actionable).await;
        }
    }

    /// FEE_CHECK and REQUEST: reuse an unexpired unselected request or pay
    /// for a new one.
    async fn ensure_request(&self, round: &mut Round<'_>) -> Result<(), AttestationError> {
        round.emit(RoundState::FeeCheck, "Requesting 1 more attestation");
        round.emit(RoundState::FeeCheck, "Getting an unselected request");
        let pending = self
            .ledger
            .unselected_request(&round.identifier, &round.account)
            .await
            .map_err(AttestationError::network("reading the unselected request"))?;

        let needs_request = if pending.is_pending() {
            round.emit(RoundState::FeeCheck, "Checking if unselected attestation is expired");
            let expiry_blocks = self
                .ledger
                .attestation_expiry_blocks()
                .await
                .map_err(AttestationError::network("reading the expiry window"))?;
            let current = self
                .ledger
                .current_block_number()
                .await
                .map_err(AttestationError::network("reading the block number"))?;
            pending.is_expired(current, expiry_blocks)
        } else {
            true
        };

        if !needs_request {
            debug!(block = pending.block_number, "reusing unselected request");
            return Ok(());
        }

        round.emit(
            RoundState::FeeCheck,
            "Figured we have to select a new issuer. Approving the attestation fee",
        );
        let fee_token = self.ledger.fee_token();
        let fee = self
            .ledger
            .attestation_request_fee(&fee_token)
            .await
            .map_err(AttestationError::network("reading the attestation fee"))?;
        let amount = fee.saturating_mul(U256::from(ATTESTATIONS_PER_ITERATION));
        self.ledger
            .approve_spend(&self.ledger.attestations_contract(), amount)
            .await
            .map_err(AttestationError::network("approving the attestation fee"))?;

        round.emit(RoundState::Request, "Requesting the attestation");
        self.ledger
            .request_attestations(&round.identifier, ATTESTATIONS_PER_ITERATION, &fee_token)
            .await
            .map_err(AttestationError::network("requesting the attestation"))?;
        round.emit(RoundState::Request, "Attestation requested");
        Ok(())
    }

    /// WAIT_WINDOW: poll the chain height until selection is allowed.
    async fn wait_for_selection_window(&self, round: &mut Round<'_>) -> Result<(), AttestationError> {
        round.emit(RoundState::WaitWindow, "Waiting enough time to call the select");
        let request = self
            .ledger
            .unselected_request(&round.identifier, &round.account)
            .await
            .map_err(AttestationError::network("reading the unselected request"))?;
        if !request.is_pending() {
            return Err(AttestationError::inconsistent(
                "no unselected request after requesting an attestation",
            ));
        }

        let wait_blocks = self
            .ledger
            .select_issuers_wait_blocks()
            .await
            .map_err(AttestationError::network("reading the selection wait"))?;
        let target_block = request.block_number.saturating_add(wait_blocks);

        let started = Instant::now();
        loop {
            match self.ledger.current_block_number().await {
                Ok(current) if current >= target_block => return Ok(()),
                Ok(current) => debug!(current, target_block, "selection window not open yet"),
                Err(e) => warn!(error = %e, target_block, "block height read failed, polling again"),
            }

            let waited = started.elapsed();
            if waited >= self.config.selection_timeout {
                return Err(AttestationError::ProtocolTimeout {
                    waited,
                    target_block,
                });
            }
            tokio::time::sleep(self.config.block_poll_interval).await;
        }
    }

    /// SELECT_ISSUERS. A revert means the request vanished under us.
    async fn select_issuers(&self, round: &mut Round<'_>) -> Result<(), AttestationError> {
        round.emit(RoundState::SelectIssuers, "Calling to select issuers");
        self.ledger
            .select_issuers(&round.identifier)
            .await
            .map_err(|e| match e {
                LedgerError::Reverted(_) => AttestationError::InconsistentState {
                    reason: "issuer selection reverted".to_string(),
                    source: Some(e),
                },
                other => AttestationError::network("selecting issuers")(other),
            })?;
        round.emit(RoundState::SelectIssuers, "Issuers selected");
        Ok(())
    }

    /// DISCOVER_URLS: resolve every completable attestation's issuer.
    async fn discover(&self, round: &mut Round<'_>) -> Result<Vec<IssuerRecord>, AttestationError> {
        round.emit(
            RoundState::DiscoverUrls,
            "Getting actionable attestations and non compliant issuers",
        );
        let records = self
            .discovery
            .resolve(&round.identifier, &round.account)
            .await
            .map_err(AttestationError::from_discovery)?;

        let partition = IssuerPartition::from_records(records);
        for issuer in partition.non_compliant {
            if !round.non_compliant.contains(&issuer) {
                round.non_compliant.push(issuer);
            }
        }
        Ok(partition.actionable)
    }

    /// REVEAL_TO_ISSUERS: one POST per actionable issuer, failures collected.
    async fn reveal_to_issuers(&self, round: &mut Round<'_>, actionable: &[IssuerRecord]) {
        round.emit(
            RoundState::RevealToIssuers,
            format!("Requesting attestation from issuers. Count is {}", actionable.len()),
        );

        for record in actionable {
            let Some(service_url) = record.attestation_service_url.as_deref() else {
                continue;
            };
            let url = join_url(service_url, ATTESTATIONS_ENDPOINT);

            match self.reveal(round, record, &url).await {
                Ok(()) => round.emit(
                    RoundState::RevealToIssuers,
                    format!("Success. Attestation requested from issuer: {url}"),
                ),
                Err(failure) => {
                    warn!(
                        issuer = %address_hex(&record.issuer),
                        %url,
                        error = %failure,
                        "reveal to issuer failed"
                    );
                    round.emit(
                        RoundState::RevealToIssuers,
                        format!("Failed. Issuer {url} answered: {failure}"),
                    );
                    round.issuer_failures.push(IssuerFailure {
                        issuer: record.issuer,
                        name: record.name.clone(),
                        service_url: service_url.to_string(),
                        failure,
                    });
                }
            }
        }
    }

    async fn reveal(&self, round: &Round<'_>, record: &IssuerRecord, url: &str) -> Result<(), RevealFailure> {
        let request = RevealRequest::new(
            &round.phone,
            &round.account,
            &record.issuer,
            round.pepper,
            round.security_code_prefix.clone(),
        );
        let body = serde_json::to_string(&request).map_err(|e| RevealFailure::Encoding(e.to_string()))?;

        let response = self
            .transport
            .post_json(url, &body, &[])
            .await
            .map_err(RevealFailure::Transport)?;
        if !response.is_success() {
            return Err(RevealFailure::Http {
                status: response.status,
                body: response.body,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl<L, T, D> AttestationApi for AttestationService<L, T, D>
where
    L: LedgerClient + ?Sized,
    T: HttpTransport + ?Sized,
    D: IssuerDiscoveryApi,
{
    async fn request_attestations(
        &self,
        phone: &str,
        pepper: &Pepper,
        use_security_code: bool,
        progress: &dyn ProgressSink,
    ) -> RoundReport {
        let Some(account) = self.ledger.address() else {
            return RoundReport::rejected(AttestationError::NoAddress);
        };
        let phone = match PhoneNumber::parse(phone) {
            Ok(phone) => phone,
            Err(e) => return RoundReport::rejected(e.into()),
        };

        let mut round = Round {
            identifier: derive_identifier(&phone, pepper),
            security_code_prefix: use_security_code.then(|| security_code_prefix(&account)),
            phone,
            pepper,
            account,
            progress,
            stat: AttestationStat::default(),
            iterations: 0,
            issuer_failures: Vec::new(),
            non_compliant: Vec::new(),
        };

        log_event!(
            info,
            "round",
            "starting attestation round",
            account = %address_hex(&account),
            phone = %round.phone,
            use_security_code,
            cap = self.config.max_attestations
        );
        let result = self.drive(&mut round).await;
        round.finish(result)
    }

    async fn attest_with_security_code_fallback(
        &self,
        phone: &str,
        pepper: &Pepper,
        progress: &dyn ProgressSink,
    ) -> TwoPassReport {
        let security_code_used = self.config.use_security_code;
        let first = self
            .request_attestations(phone, pepper, security_code_used, progress)
            .await;
        if first.is_success() || !security_code_used {
            return TwoPassReport {
                first,
                security_code_used,
                fallback: None,
            };
        }

        let message = format!(
            "Verify with security failed ({}). Trying without it.",
            first.outcome.code()
        );
        debug!(outcome = %first.outcome, "{message}");
        progress.report(ProgressEvent::new(RoundState::StatCheck, message));

        let fallback = self.request_attestations(phone, pepper, false, progress).await;
        TwoPassReport {
            first,
            security_code_used,
            fallback: Some(fallback),
        }
    }

    async fn phone_number_status(
        &self,
        phone: &str,
        pepper: &Pepper,
    ) -> Result<PhoneNumberStatus, AttestationError> {
        let account = self.ledger.address().ok_or(AttestationError::NoAddress)?;
        let phone = PhoneNumber::parse(phone)?;
        let identifier = derive_identifier(&phone, pepper);

        let accounts = self
            .ledger
            .lookup_accounts_for_identifier(&identifier)
            .await
            .map_err(AttestationError::network("looking up accounts for the identifier"))?;
        if accounts.contains(&account) {
            return Ok(PhoneNumberStatus::Verified);
        }

        let stat = self
            .ledger
            .attestation_stat(&identifier, &account)
            .await
            .map_err(AttestationError::network("reading the attestation stat"))?;
        Ok(if stat.total > 0 {
            PhoneNumberStatus::Pending {
                completed: stat.completed,
                total: stat.total,
            }
        } else {
            PhoneNumberStatus::Unverified
        })
    }
}

/// Working state of one pass.
struct Round<'a> {
    phone: PhoneNumber,
    pepper: &'a Pepper,
    identifier: Identifier,
    account: Address,
    security_code_prefix: Option<String>,
    progress: &'a dyn ProgressSink,
    stat: AttestationStat,
    iterations: u32,
    issuer_failures: Vec<IssuerFailure>,
    non_compliant: Vec<Address>,
}

impl Round<'_> {
    fn emit(&self, state: RoundState, message: impl Into<String>) {
        let message = message.into();
        log_round_event!(debug, state, self.phone, message);
        self.progress.report(ProgressEvent::new(state, message));
    }

    fn finish(self, result: Result<(), AttestationError>) -> RoundReport {
        let (outcome, error) = match result {
            Ok(()) => (RoundOutcome::Success, None),
            Err(e) => (e.outcome(), Some(e)),
        };

        match &error {
            None => log_event!(
                info,
                "round",
                "attestation round succeeded",
                phone = %self.phone,
                completed = self.stat.completed,
                total = self.stat.total,
                iterations = self.iterations,
                soft_failures = self.issuer_failures.len()
            ),
            Some(e) => log_event!(
                warn,
                "round",
                "attestation round failed",
                phone = %self.phone,
                %outcome,
                error = %e,
                cause = %e.root_cause()
            ),
        }

        RoundReport {
            outcome,
            stat: self.stat,
            iterations: self.iterations,
            issuer_failures: self.issuer_failures,
            non_compliant_issuers: self.non_compliant,
            error,
        }
    }
}

//! # Ledger Client Port
//!
//! The blockchain client is an external collaborator: it signs and sends
//! transactions, reads contract state and prices gas. The attestation core
//! only sees the operations below.
//!
//! One client exists per active account and network. A round issues its
//! calls one after another and never joins two ledger futures, so nonce
//! ordering of submitted transactions stays with the adapter.

use crate::entities::{
    Address, AttestationStat, CompletableAttestations, Identifier, SignerRole, TxHash,
    UnselectedRequest, U256,
};
use crate::errors::LedgerError;
use async_trait::async_trait;

/// Attestation registry, accounts registry and chain-head access.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Address of the local account, if one is configured.
    fn address(&self) -> Option<Address>;

    /// Token the attestation fee is paid in.
    fn fee_token(&self) -> Address;

    /// Address of the attestation registry contract (the fee spender).
    fn attestations_contract(&self) -> Address;

    /// Completed/total attestations for `(identifier, account)`.
    async fn attestation_stat(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<AttestationStat, LedgerError>;

    /// Pending request not yet bound to issuers.
    async fn unselected_request(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<UnselectedRequest, LedgerError>;

    /// Fee per attestation in `token`.
    async fn attestation_request_fee(&self, token: &Address) -> Result<U256, LedgerError>;

    /// Approve `spender` to move `amount` of the fee token.
    async fn approve_spend(&self, spender: &Address, amount: U256) -> Result<TxHash, LedgerError>;

    /// Request `count` attestations, paying in `fee_token`.
    async fn request_attestations(
        &self,
        identifier: &Identifier,
        count: u32,
        fee_token: &Address,
    ) -> Result<TxHash, LedgerError>;

    /// Bind the pending request to issuers.
    async fn select_issuers(&self, identifier: &Identifier) -> Result<TxHash, LedgerError>;

    /// Blocks that must pass between a request and issuer selection.
    async fn select_issuers_wait_blocks(&self) -> Result<u64, LedgerError>;

    /// Blocks after which an unselected request expires.
    async fn attestation_expiry_blocks(&self) -> Result<u64, LedgerError>;

    /// Current chain height.
    async fn current_block_number(&self) -> Result<u64, LedgerError>;

    /// Attestations the account can still complete, with packed metadata URLs.
    async fn completable_attestations(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<CompletableAttestations, LedgerError>;

    /// Accounts that completed attestation for `identifier`.
    async fn lookup_accounts_for_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Vec<Address>, LedgerError>;

    /// True if `address` is a registered account.
    async fn is_registered_account(&self, address: &Address) -> Result<bool, LedgerError>;

    /// Delegate signer of `address` for `role`. The registry answers with the
    /// account itself when no delegate is authorized.
    async fn delegate_signer(
        &self,
        address: &Address,
        role: SignerRole,
    ) -> Result<Address, LedgerError>;
}

//! Simulated attestation registry.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::entities::{
    Address, AttestationStat, CompletableAttestations, Identifier, SignerRole, TxHash,
    UnselectedRequest, U256,
};
use crate::errors::LedgerError;
use crate::ledger::LedgerClient;

/// Ledger operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedgerCall {
    AttestationStat,
    UnselectedRequest,
    RequestFee,
    ApproveSpend,
    RequestAttestations,
    SelectIssuers,
    WaitBlocks,
    ExpiryBlocks,
    CurrentBlock,
    CompletableAttestations,
    LookupAccounts,
    IsRegistered,
    DelegateSigner,
}

#[derive(Default)]
struct State {
    block_number: u64,
    block_advance: u64,
    wait_blocks: u64,
    expiry_blocks: u64,
    fee: U256,
    auto_complete: bool,
    swallow_requests: bool,
    stats: HashMap<(Identifier, Address), AttestationStat>,
    unselected: HashMap<(Identifier, Address), UnselectedRequest>,
    completable: HashMap<(Identifier, Address), Vec<(u64, Address, String)>>,
    issuer_pool: Vec<(Address, String)>,
    next_issuer: usize,
    accounts: HashMap<Identifier, Vec<Address>>,
    registered: HashSet<Address>,
    delegates: HashMap<(Address, SignerRole), Address>,
    failures: HashMap<LedgerCall, usize>,
    approvals: Vec<(Address, U256)>,
    requests: Vec<(Identifier, u32, Address)>,
    selections: usize,
    tx_counter: u64,
}

/// In-memory [`LedgerClient`] that behaves like the attestation registry.
///
/// - `current_block_number` returns the height, then advances it by
///   `block_advance`.
/// - `request_attestations` records an unselected request at the current height.
/// - `select_issuers` reverts unless a request is pending and its wait window
///   has elapsed; otherwise it assigns issuers from the pool round-robin and
///   bumps the total.
/// - With `auto_complete`, reading a stat completes every selected attestation.
pub struct MockLedger {
    address: Option<Address>,
    fee_token: Address,
    attestations_contract: Address,
    state: Mutex<State>,
}

impl Default for MockLedger {
    fn default() -> Self {
        Self::new(Some([0x11; 20]))
    }
}

impl MockLedger {
    /// Ledger for `address` with 1 block per read, 4 wait blocks and
    /// 100 expiry blocks.
    pub fn new(address: Option<Address>) -> Self {
        Self {
            address,
            fee_token: [0xFE; 20],
            attestations_contract: [0xA7; 20],
            state: Mutex::new(State {
                block_number: 100,
                block_advance: 1,
                wait_blocks: 4,
                expiry_blocks: 100,
                fee: U256::from(1_000_000_000_000_000u64),
                ..State::default()
            }),
        }
    }

    /// Complete selected attestations on the next stat read.
    pub fn with_auto_complete(self, enabled: bool) -> Self {
        self.state.lock().auto_complete = enabled;
        self
    }

    /// Issuers assigned by `select_issuers`, as `(address, metadata_url)`.
    pub fn with_issuers(self, issuers: Vec<(Address, String)>) -> Self {
        self.state.lock().issuer_pool = issuers;
        self
    }

    /// Blocks added per height read.
    pub fn with_block_advance(self, blocks: u64) -> Self {
        self.state.lock().block_advance = blocks;
        self
    }

    /// Blocks between request and selection.
    pub fn with_wait_blocks(self, blocks: u64) -> Self {
        self.state.lock().wait_blocks = blocks;
        self
    }

    /// Blocks until an unselected request expires.
    pub fn with_expiry_blocks(self, blocks: u64) -> Self {
        self.state.lock().expiry_blocks = blocks;
        self
    }

    /// Fee per attestation.
    pub fn with_fee(self, fee: U256) -> Self {
        self.state.lock().fee = fee;
        self
    }

    /// Accept request transactions without recording them.
    pub fn with_swallowed_requests(self) -> Self {
        self.state.lock().swallow_requests = true;
        self
    }

    /// Set the chain height.
    pub fn set_block_number(&self, block: u64) {
        self.state.lock().block_number = block;
    }

    /// Overwrite the stat for `(identifier, account)`.
    pub fn set_stat(&self, identifier: Identifier, account: Address, stat: AttestationStat) {
        self.state.lock().stats.insert((identifier, account), stat);
    }

    /// Overwrite the unselected request for `(identifier, account)`.
    pub fn set_unselected_request(
        &self,
        identifier: Identifier,
        account: Address,
        request: UnselectedRequest,
    ) {
        self.state
            .lock()
            .unselected
            .insert((identifier, account), request);
    }

    /// Overwrite the completable attestations for `(identifier, account)`.
    pub fn set_completable(
        &self,
        identifier: Identifier,
        account: Address,
        entries: Vec<(u64, Address, String)>,
    ) {
        self.state
            .lock()
            .completable
            .insert((identifier, account), entries);
    }

    /// Map `identifier` to accounts that completed attestation.
    pub fn set_accounts_for_identifier(&self, identifier: Identifier, accounts: Vec<Address>) {
        self.state.lock().accounts.insert(identifier, accounts);
    }

    /// Mark `address` as a registered account.
    pub fn register_account(&self, address: Address) {
        self.state.lock().registered.insert(address);
    }

    /// Authorize `signer` as `account`'s delegate for `role`.
    pub fn set_delegate(&self, account: Address, role: SignerRole, signer: Address) {
        self.state.lock().delegates.insert((account, role), signer);
    }

    /// Fail every future call of `call`.
    pub fn fail(&self, call: LedgerCall) {
        self.state.lock().failures.insert(call, usize::MAX);
    }

    /// Fail the next `times` calls of `call`.
    pub fn fail_times(&self, call: LedgerCall, times: usize) {
        self.state.lock().failures.insert(call, times);
    }

    /// Recorded `(spender, amount)` approvals.
    pub fn approvals(&self) -> Vec<(Address, U256)> {
        self.state.lock().approvals.clone()
    }

    /// Recorded `(identifier, count, fee_token)` requests.
    pub fn requests(&self) -> Vec<(Identifier, u32, Address)> {
        self.state.lock().requests.clone()
    }

    /// Number of successful `select_issuers` calls.
    pub fn selections(&self) -> usize {
        self.state.lock().selections
    }

    /// Current chain height, without advancing it.
    pub fn block_number(&self) -> u64 {
        self.state.lock().block_number
    }

    fn check(state: &mut State, call: LedgerCall) -> Result<(), LedgerError> {
        match state.failures.get_mut(&call) {
            Some(0) | None => Ok(()),
            Some(remaining) => {
                if *remaining != usize::MAX {
                    *remaining -= 1;
                }
                Err(LedgerError::Transport(format!("injected failure: {call:?}")))
            }
        }
    }

    fn next_tx(state: &mut State) -> TxHash {
        state.tx_counter += 1;
        let mut hash = [0u8; 32];
        hash[24..].copy_from_slice(&state.tx_counter.to_be_bytes());
        hash
    }

    fn account(&self) -> Result<Address, LedgerError> {
        self.address
            .ok_or_else(|| LedgerError::Reverted("no account configured".to_string()))
    }
}

#[async_trait]
impl LedgerClient for MockLedger {
    fn address(&self) -> Option<Address> {
        self.address
    }

    fn fee_token(&self) -> Address {
        self.fee_token
    }

    fn attestations_contract(&self) -> Address {
        self.attestations_contract
    }

    async fn attestation_stat(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<AttestationStat, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::AttestationStat)?;

        let key = (*identifier, *account);
        if state.auto_complete {
            let done = state
                .completable
                .remove(&key)
                .map(|entries| entries.len() as u32)
                .unwrap_or(0);
            let stat = state.stats.entry(key).or_default();
            stat.completed = (stat.completed + done).min(stat.total);
        }
        Ok(state.stats.get(&key).copied().unwrap_or_default())
    }

    async fn unselected_request(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<UnselectedRequest, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::UnselectedRequest)?;
        Ok(state
            .unselected
            .get(&(*identifier, *account))
            .copied()
            .unwrap_or_default())
    }

    async fn attestation_request_fee(&self, _token: &Address) -> Result<U256, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::RequestFee)?;
        Ok(state.fee)
    }

    async fn approve_spend(&self, spender: &Address, amount: U256) -> Result<TxHash, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::ApproveSpend)?;
        state.approvals.push((*spender, amount));
        Ok(Self::next_tx(&mut state))
    }

    async fn request_attestations(
        &self,
        identifier: &Identifier,
        count: u32,
        fee_token: &Address,
    ) -> Result<TxHash, LedgerError> {
        let account = self.account()?;
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::RequestAttestations)?;

        state.requests.push((*identifier, count, *fee_token));
        if !state.swallow_requests {
            let request = UnselectedRequest {
                block_number: state.block_number,
                attestations_requested: count,
                fee_token: *fee_token,
            };
            state.unselected.insert((*identifier, account), request);
        }
        Ok(Self::next_tx(&mut state))
    }

    async fn select_issuers(&self, identifier: &Identifier) -> Result<TxHash, LedgerError> {
        let account = self.account()?;
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::SelectIssuers)?;

        let key = (*identifier, account);
        let request = state.unselected.get(&key).copied().unwrap_or_default();
        if !request.is_pending() {
            return Err(LedgerError::Reverted("no unselected attestation request".to_string()));
        }
        if state.block_number < request.block_number + state.wait_blocks {
            return Err(LedgerError::Reverted("selection wait window not elapsed".to_string()));
        }
        state.unselected.remove(&key);

        let mut selected = Vec::new();
        if !state.issuer_pool.is_empty() {
            for _ in 0..request.attestations_requested {
                let index = state.next_issuer % state.issuer_pool.len();
                let (issuer, url) = state.issuer_pool[index].clone();
                state.next_issuer += 1;
                selected.push((request.block_number, issuer, url));
            }
        }
        state.completable.entry(key).or_default().extend(selected);
        state.stats.entry(key).or_default().total += request.attestations_requested;
        state.selections += 1;
        Ok(Self::next_tx(&mut state))
    }

    async fn select_issuers_wait_blocks(&self) -> Result<u64, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::WaitBlocks)?;
        Ok(state.wait_blocks)
    }

    async fn attestation_expiry_blocks(&self) -> Result<u64, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::ExpiryBlocks)?;
        Ok(state.expiry_blocks)
    }

    async fn current_block_number(&self) -> Result<u64, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::CurrentBlock)?;
        let block = state.block_number;
        state.block_number += state.block_advance;
        Ok(block)
    }

    async fn completable_attestations(
        &self,
        identifier: &Identifier,
        account: &Address,
    ) -> Result<CompletableAttestations, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::CompletableAttestations)?;
        let entries = state
            .completable
            .get(&(*identifier, *account))
            .cloned()
            .unwrap_or_default();
        Ok(CompletableAttestations::pack(&entries))
    }

    async fn lookup_accounts_for_identifier(
        &self,
        identifier: &Identifier,
    ) -> Result<Vec<Address>, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::LookupAccounts)?;
        Ok(state.accounts.get(identifier).cloned().unwrap_or_default())
    }

    async fn is_registered_account(&self, address: &Address) -> Result<bool, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::IsRegistered)?;
        Ok(state.registered.contains(address))
    }

    async fn delegate_signer(
        &self,
        address: &Address,
        role: SignerRole,
    ) -> Result<Address, LedgerError> {
        let mut state = self.state.lock();
        Self::check(&mut state, LedgerCall::DelegateSigner)?;
        Ok(state
            .delegates
            .get(&(*address, role))
            .copied()
            .unwrap_or(*address))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id() -> Identifier {
        Identifier::from_bytes([7u8; 32])
    }

    #[tokio::test]
    async fn test_select_before_window_reverts() {
        let ledger = MockLedger::default().with_block_advance(0);
        let fee_token = ledger.fee_token();
        ledger.request_attestations(&id(), 1, &fee_token).await.unwrap();

        let result = ledger.select_issuers(&id()).await;
        assert!(matches!(result, Err(LedgerError::Reverted(_))));
    }

    #[tokio::test]
    async fn test_select_without_request_reverts() {
        let ledger = MockLedger::default();
        let result = ledger.select_issuers(&id()).await;
        assert!(matches!(result, Err(LedgerError::Reverted(_))));
    }

    #[tokio::test]
    async fn test_request_select_and_auto_complete() {
        let ledger = MockLedger::default()
            .with_auto_complete(true)
            .with_issuers(vec![([0x22; 20], "https://meta.example".to_string())]);
        let account = ledger.address().unwrap();
        let fee_token = ledger.fee_token();

        ledger.request_attestations(&id(), 1, &fee_token).await.unwrap();
        ledger.set_block_number(ledger.block_number() + 4);
        ledger.select_issuers(&id()).await.unwrap();

        let completable = ledger.completable_attestations(&id(), &account).await.unwrap();
        assert_eq!(completable.len(), 1);

        let stat = ledger.attestation_stat(&id(), &account).await.unwrap();
        assert_eq!(stat, AttestationStat { completed: 1, total: 1 });
        assert!(!ledger.unselected_request(&id(), &account).await.unwrap().is_pending());
    }

    #[tokio::test]
    async fn test_block_advances_per_read() {
        let ledger = MockLedger::default().with_block_advance(2);
        let first = ledger.current_block_number().await.unwrap();
        let second = ledger.current_block_number().await.unwrap();
        assert_eq!(second, first + 2);
    }

    #[tokio::test]
    async fn test_fail_times_then_recovers() {
        let ledger = MockLedger::default();
        ledger.fail_times(LedgerCall::CurrentBlock, 2);

        assert!(ledger.current_block_number().await.is_err());
        assert!(ledger.current_block_number().await.is_err());
        assert!(ledger.current_block_number().await.is_ok());
    }

    #[tokio::test]
    async fn test_delegate_defaults_to_account() {
        let ledger = MockLedger::default();
        let account = [0x33; 20];
        assert_eq!(
            ledger.delegate_signer(&account, SignerRole::Vote).await.unwrap(),
            account
        );

        ledger.set_delegate(account, SignerRole::Vote, [0x44; 20]);
        assert_eq!(
            ledger.delegate_signer(&account, SignerRole::Vote).await.unwrap(),
            [0x44; 20]
        );
    }
}

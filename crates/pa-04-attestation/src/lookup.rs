//! Public phone-number lookup over the un-peppered identifier.

use std::sync::Arc;

use pa_03_salt_derivation::{unpeppered_identifier, PhoneNumber};
use shared_types::{address_hex, Address};
use tracing::debug;

use crate::domain::errors::AttestationError;
use crate::inflight::{InflightMap, Slot};
use crate::ports::outbound::LedgerClient;

type LookupResult = Result<Option<Address>, AttestationError>;

/// Finds the account a phone number is registered to.
///
/// Concurrent queries for the same number share one ledger read.
pub struct PhoneNumberLookup<L: LedgerClient + ?Sized> {
    ledger: Arc<L>,
    inflight: InflightMap<LookupResult>,
}

impl<L: LedgerClient + ?Sized> PhoneNumberLookup<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self {
            ledger,
            inflight: InflightMap::new(),
        }
    }

    /// First account mapped to `phone`, if any.
    pub async fn query(&self, phone: &PhoneNumber) -> LookupResult {
        loop {
            match self.inflight.join(phone.as_str()) {
                Slot::Leader(guard) => {
                    let result = self.lookup(phone).await;
                    let followers = guard.complete(result.clone());
                    debug!(%phone, followers, "phone number lookup finished");
                    return result;
                }
                Slot::Follower(receiver) => match receiver.await {
                    Ok(result) => return result,
                    // Leader went away without an answer; take over.
                    Err(_) => continue,
                },
            }
        }
    }

    /// Validate `raw` as E.164, then query.
    pub async fn query_str(&self, raw: &str) -> LookupResult {
        let phone = PhoneNumber::parse(raw)?;
        self.query(&phone).await
    }

    async fn lookup(&self, phone: &PhoneNumber) -> LookupResult {
        let identifier = unpeppered_identifier(phone);
        let accounts = self
            .ledger
            .lookup_accounts_for_identifier(&identifier)
            .await
            .map_err(AttestationError::network("looking up accounts for the phone number"))?;

        let first = accounts.first().copied();
        if let Some(account) = &first {
            debug!(%phone, account = %address_hex(account), matches = accounts.len(), "phone number is registered");
        }
        Ok(first)
    }
}

//! # Inbound Ports (Driving Ports / API)

use async_trait::async_trait;

use crate::domain::errors::SaltError;
use crate::domain::pepper::Pepper;
use crate::domain::phone::PhoneNumber;

/// Pepper derivation for the local account.
#[async_trait]
pub trait SaltDerivationApi: Send + Sync {
    /// Run the blind-signature exchange for `phone` and derive its pepper.
    ///
    /// The phone number only leaves the process blinded.
    async fn derive_pepper(&self, phone: &PhoneNumber) -> Result<Pepper, SaltError>;
}

//! Wallet abstraction.
//!
//! The wallet holds the keys and talks to the chain; this crate only
//! describes what it must do for the name service flows. Implementations
//! wrap a browser extension, a test double, or any other signer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::amount::{Coin, Fee};
use crate::config::ChainConfig;
use crate::name::NilName;
use crate::{Address, Result, TxHash};

/// A connected signing identity on a specific chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletIdentity {
    /// Chain the wallet is connected to
    pub chain_id: String,
    /// Account address controlled by the wallet
    pub address: Address,
}

/// A transfer for the wallet to sign and submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Sending address
    pub from: Address,
    /// Receiving address
    pub to: Address,
    /// Transfer amount in base units
    pub amount: Coin,
    /// Flat fee and gas budget
    pub fee: Fee,
    /// Memo attached to the transaction
    pub memo: String,
}

impl TransferRequest {
    /// Build a registration transaction.
    ///
    /// Registration is a minimal-value transfer from the connected address
    /// to itself carrying the canonical name as memo. The registry treats
    /// memo-as-name plus sender-as-owner as the registration claim, so the
    /// self-transfer shape must be preserved exactly.
    pub fn registration(identity: &WalletIdentity, config: &ChainConfig, name: &NilName) -> Self {
        Self {
            from: identity.address.clone(),
            to: identity.address.clone(),
            amount: config.registration_transfer(),
            fee: config.fee(),
            memo: name.as_memo().to_string(),
        }
    }

    /// Build a payment transaction to a resolved recipient address.
    pub fn payment(
        identity: &WalletIdentity,
        to: Address,
        amount: Coin,
        config: &ChainConfig,
        recipient: &NilName,
    ) -> Self {
        Self {
            from: identity.address.clone(),
            to,
            amount,
            fee: config.fee(),
            memo: recipient.payment_memo(),
        }
    }
}

/// Interface to the external wallet.
///
/// Implementations may prompt the user on every call; connection caching is
/// the session layer's concern.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait WalletProvider {
    /// Connect to the given chain and return the active identity.
    ///
    /// Errors: `WalletUnavailable` when no provider is present,
    /// `UserRejected` when the user declines the connection prompt.
    async fn connect(&self, chain_id: &str) -> Result<WalletIdentity>;

    /// Sign and submit a transfer as one logical step.
    ///
    /// Either a transaction hash is returned or an error is returned,
    /// never both and never neither; there is no partially reported
    /// success. Errors: `UserRejected`, `Broadcast`, `Transient`.
    async fn sign_and_broadcast(&self, request: &TransferRequest) -> Result<TxHash>;
}

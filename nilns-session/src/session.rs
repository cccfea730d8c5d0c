//! Wallet connection state.
//!
//! # Thread Safety
//!
//! The cached identity sits behind an `RwLock` that is never held across
//! an await: the lock is released before calling into the provider, so a
//! slow wallet prompt never blocks readers.

use std::sync::{Arc, RwLock};

use nilns_lib::{Result, TransferRequest, TxHash, WalletIdentity, WalletProvider};

/// Caches the wallet connection so repeat operations skip the prompt.
///
/// `ensure_connected` is idempotent per chain: while a connection for the
/// requested chain is live, the provider is not consulted again.
pub struct WalletSession<W> {
    provider: W,
    identity: RwLock<Option<Arc<WalletIdentity>>>,
}

impl<W: WalletProvider> WalletSession<W> {
    /// Wrap a wallet provider with connection caching.
    pub fn new(provider: W) -> Self {
        Self {
            provider,
            identity: RwLock::new(None),
        }
    }

    /// The underlying wallet provider.
    pub fn provider(&self) -> &W {
        &self.provider
    }

    /// The identity from the last successful connect, if any.
    pub fn identity(&self) -> Option<Arc<WalletIdentity>> {
        let cached = self.identity.read().unwrap_or_else(|e| e.into_inner());
        cached.clone()
    }

    /// Connect to the wallet for the given chain, reusing a live
    /// connection when the chain matches.
    ///
    /// A concurrent first call may reach the provider twice; the later
    /// result wins the cache and both callers get a valid identity.
    pub async fn ensure_connected(&self, chain_id: &str) -> Result<Arc<WalletIdentity>> {
        {
            let cached = self.identity.read().unwrap_or_else(|e| e.into_inner());
            if let Some(identity) = cached.as_ref() {
                if identity.chain_id == chain_id {
                    return Ok(identity.clone());
                }
            }
        }

        let identity = Arc::new(self.provider.connect(chain_id).await?);
        let mut cached = self.identity.write().unwrap_or_else(|e| e.into_inner());
        *cached = Some(identity.clone());
        Ok(identity)
    }

    /// Drop the cached identity; the next call connects afresh.
    pub fn disconnect(&self) {
        let mut cached = self.identity.write().unwrap_or_else(|e| e.into_inner());
        *cached = None;
    }

    /// Sign and submit a transfer through the underlying provider.
    ///
    /// Signing and submission are one wallet-side step: a hash comes back
    /// only if the transaction was accepted, otherwise the error explains
    /// which side gave up.
    pub async fn sign_and_broadcast(&self, request: &TransferRequest) -> Result<TxHash> {
        self.provider.sign_and_broadcast(request).await
    }
}

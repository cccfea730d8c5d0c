//! Transaction orchestration for registrations and payments.
//!
//! One orchestrator drives at most one attempt at a time. An attempt
//! moves `Idle -> Signing -> Broadcasting -> Confirming` and ends in
//! `Succeeded` or `Failed`; a failed attempt can be retried (when it
//! never broadcast) or cancelled. A new attempt can start only when no
//! attempt exists or the previous one reached a terminal state.
//!
//! # Thread Safety
//!
//! The current attempt sits behind a `Mutex` that is never held across an
//! await. Status callbacks run after the lock is released, so they may
//! inspect the orchestrator freely.

use std::sync::{Arc, Mutex, RwLock};
#[cfg(feature = "timeout")]
use std::time::Duration;

use nilns_lib::{
    resolve_address, sync_registration, ChainConfig, ConfirmOutcome, NilAmount, NilName,
    RegistryClient, TransferRequest, TxHash, WalletProvider,
};

use crate::attempt::{AttemptKind, AttemptStatus, TransactionAttempt};
use crate::session::WalletSession;
use crate::{Result, SessionError};

#[cfg(feature = "timeout")]
const DEFAULT_BROADCAST_TIMEOUT: Duration = Duration::from_secs(120);
#[cfg(feature = "timeout")]
const DEFAULT_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

/// Callback for attempt status changes.
pub type StatusCallback = Arc<dyn Fn(&TransactionAttempt) + Send + Sync>;

/// Drives registrations and payments through the attempt lifecycle.
///
/// Input validation happens before an attempt exists, so a rejected start
/// comes back as an error and leaves no record. Once an attempt starts,
/// every outcome, including failure, lands on the attempt snapshot that
/// the drive returns.
pub struct TransactionOrchestrator<W, R> {
    wallet: WalletSession<W>,
    registry: R,
    chain: ChainConfig,
    current: Mutex<Option<TransactionAttempt>>,
    callbacks: RwLock<Vec<StatusCallback>>,
    #[cfg(feature = "timeout")]
    broadcast_timeout: Duration,
    #[cfg(feature = "timeout")]
    confirm_timeout: Duration,
}

impl<W, R> TransactionOrchestrator<W, R>
where
    W: WalletProvider,
    R: RegistryClient,
{
    /// Create an orchestrator for the given chain.
    pub fn new(provider: W, registry: R, chain: ChainConfig) -> Self {
        Self {
            wallet: WalletSession::new(provider),
            registry,
            chain,
            current: Mutex::new(None),
            callbacks: RwLock::new(Vec::new()),
            #[cfg(feature = "timeout")]
            broadcast_timeout: DEFAULT_BROADCAST_TIMEOUT,
            #[cfg(feature = "timeout")]
            confirm_timeout: DEFAULT_CONFIRM_TIMEOUT,
        }
    }

    /// Orchestrator preset for the Nillion testnet.
    pub fn nillion_testnet(provider: W, registry: R) -> Self {
        Self::new(provider, registry, ChainConfig::nillion_testnet())
    }

    /// Override the wallet sign-and-broadcast timeout.
    #[cfg(feature = "timeout")]
    pub fn with_broadcast_timeout(mut self, timeout: Duration) -> Self {
        self.broadcast_timeout = timeout;
        self
    }

    /// Override the registry sync timeout.
    #[cfg(feature = "timeout")]
    pub fn with_confirm_timeout(mut self, timeout: Duration) -> Self {
        self.confirm_timeout = timeout;
        self
    }

    /// The wallet session, for direct connection management.
    pub fn wallet(&self) -> &WalletSession<W> {
        &self.wallet
    }

    /// The registry client, for lookups outside the attempt lifecycle.
    pub fn registry(&self) -> &R {
        &self.registry
    }

    /// The chain this orchestrator submits to.
    pub fn chain(&self) -> &ChainConfig {
        &self.chain
    }

    /// Register a callback for attempt status changes.
    pub fn on_status_change(&self, callback: StatusCallback) {
        let mut callbacks = self.callbacks.write().unwrap_or_else(|e| e.into_inner());
        callbacks.push(callback);
    }

    /// Snapshot of the current attempt, if any.
    pub fn current(&self) -> Option<TransactionAttempt> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        current.clone()
    }

    /// Register `name` to the connected wallet's address.
    ///
    /// The name is canonicalized before anything else, so `"alice"` and
    /// `"alice.nil"` register the same name. After the claim transaction
    /// confirms, the registry is notified; a registry that cannot be
    /// reached leaves a warning on the succeeded attempt instead of
    /// failing it, since the chain already holds the claim.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn register(&self, name: &str) -> Result<TransactionAttempt> {
        self.ensure_can_start()?;
        let name = NilName::canonicalize(name)?;

        let attempt = self.begin_attempt(AttemptKind::Registration { name })?;
        Ok(self.drive(attempt).await)
    }

    /// Pay `amount` display units to the owner of `recipient`.
    ///
    /// The recipient is canonicalized and resolved freshly, and the
    /// amount is validated, before the attempt starts; a name with no
    /// binding or an amount below one base unit never reaches the wallet.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn pay(&self, recipient: &str, amount: &str) -> Result<TransactionAttempt> {
        self.ensure_can_start()?;
        let recipient = NilName::canonicalize(recipient)?;
        let amount = NilAmount::parse(amount)?.to_coin(self.chain.denom.as_str())?;
        let to = resolve_address(&self.registry, recipient.as_str()).await?;

        let attempt = self.begin_attempt(AttemptKind::Payment {
            recipient,
            to,
            amount,
        })?;
        Ok(self.drive(attempt).await)
    }

    /// Re-run the current failed attempt with the same inputs.
    ///
    /// Only a failed attempt that never produced a broadcast hash can be
    /// retried; once a hash exists the on-chain outcome is unknown and
    /// re-submitting could pay twice.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn retry(&self) -> Result<TransactionAttempt> {
        let renewed = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            let existing = current.as_ref().ok_or(SessionError::NoAttempt)?;
            if existing.status != AttemptStatus::Failed {
                return Err(SessionError::InvalidTransition {
                    event: "retry",
                    status: existing.status,
                });
            }
            if let Some(hash) = &existing.tx_hash {
                return Err(SessionError::AlreadyBroadcast(hash.clone()));
            }
            let renewed = existing.renewed();
            *current = Some(renewed.clone());
            renewed
        };
        self.notify(&renewed);
        Ok(self.drive(renewed).await)
    }

    /// Discard the current failed attempt.
    pub fn cancel(&self) -> Result<TransactionAttempt> {
        let cancelled = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            let existing = current.as_ref().ok_or(SessionError::NoAttempt)?;
            if existing.status != AttemptStatus::Failed {
                return Err(SessionError::InvalidTransition {
                    event: "cancel",
                    status: existing.status,
                });
            }
            let mut cancelled = existing.clone();
            cancelled.advance(AttemptStatus::Cancelled);
            *current = None;
            cancelled
        };
        self.notify(&cancelled);
        Ok(cancelled)
    }

    /// Re-notify the registry for a succeeded registration that carries a
    /// sync warning.
    ///
    /// Never touches the wallet: the claim transaction already confirmed.
    /// On success the warning is cleared; on another registry failure the
    /// warning is refreshed and the attempt stays succeeded.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self)))]
    pub async fn retry_registry_sync(&self) -> Result<TransactionAttempt> {
        let mut attempt = {
            let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            let existing = current.as_ref().ok_or(SessionError::NoAttempt)?;
            if !matches!(existing.kind, AttemptKind::Registration { .. })
                || existing.status != AttemptStatus::Succeeded
            {
                return Err(SessionError::InvalidTransition {
                    event: "retry registry sync",
                    status: existing.status,
                });
            }
            existing.clone()
        };

        // Nothing pending when there is no warning or no hash to report.
        if attempt.warning.is_none() {
            return Ok(attempt);
        }
        let Some(hash) = attempt.tx_hash.clone() else {
            return Ok(attempt);
        };

        match self.confirm(&hash).await {
            Ok(_) => attempt.clear_warning(),
            Err(err) => {
                tracing_warn(&format!("registry sync failed: {}", err));
                attempt.set_warning(format!("registry sync failed: {}", err));
            }
        }
        self.store_if_current(&attempt);
        Ok(attempt)
    }

    /// Drive a freshly started attempt to a terminal state.
    ///
    /// The wallet provider signs and submits as one step, so wallet
    /// rejections and broadcast errors both surface from the `Signing`
    /// await; a hash is only ever recorded for an accepted transaction.
    async fn drive(&self, mut attempt: TransactionAttempt) -> TransactionAttempt {
        attempt.advance(AttemptStatus::Signing);
        self.store_and_notify(&attempt);

        let identity = match self.wallet.ensure_connected(&self.chain.chain_id).await {
            Ok(identity) => identity,
            Err(err) => {
                attempt.mark_failed(&err);
                self.store_and_notify(&attempt);
                return attempt;
            }
        };

        let request = match &attempt.kind {
            AttemptKind::Registration { name } => {
                TransferRequest::registration(&identity, &self.chain, name)
            }
            AttemptKind::Payment {
                recipient,
                to,
                amount,
            } => TransferRequest::payment(
                &identity,
                to.clone(),
                amount.clone(),
                &self.chain,
                recipient,
            ),
        };

        let hash = match self.broadcast(&request).await {
            Ok(hash) => hash,
            Err(err) => {
                attempt.mark_failed(&err);
                self.store_and_notify(&attempt);
                return attempt;
            }
        };

        attempt.record_hash(hash.clone());
        attempt.advance(AttemptStatus::Broadcasting);
        self.store_and_notify(&attempt);

        attempt.advance(AttemptStatus::Confirming);
        self.store_and_notify(&attempt);

        if matches!(attempt.kind, AttemptKind::Registration { .. }) {
            if let Err(err) = self.confirm(&hash).await {
                tracing_warn(&format!("registry sync failed: {}", err));
                attempt.set_warning(format!("registry sync failed: {}", err));
            }
        }

        attempt.advance(AttemptStatus::Succeeded);
        self.store_and_notify(&attempt);
        attempt
    }

    async fn broadcast(&self, request: &TransferRequest) -> nilns_lib::Result<TxHash> {
        #[cfg(feature = "timeout")]
        let result = tokio::time::timeout(
            self.broadcast_timeout,
            self.wallet.sign_and_broadcast(request),
        )
        .await
        .unwrap_or_else(|_| {
            Err(nilns_lib::NilnsError::Timeout {
                operation: "sign and broadcast".to_string(),
                timeout_ms: self.broadcast_timeout.as_millis() as u64,
            })
        });

        #[cfg(not(feature = "timeout"))]
        let result = self.wallet.sign_and_broadcast(request).await;

        result
    }

    async fn confirm(&self, hash: &TxHash) -> nilns_lib::Result<ConfirmOutcome> {
        #[cfg(feature = "timeout")]
        let result = tokio::time::timeout(
            self.confirm_timeout,
            sync_registration(&self.registry, hash),
        )
        .await
        .unwrap_or_else(|_| {
            Err(nilns_lib::NilnsError::Timeout {
                operation: "registry sync".to_string(),
                timeout_ms: self.confirm_timeout.as_millis() as u64,
            })
        });

        #[cfg(not(feature = "timeout"))]
        let result = sync_registration(&self.registry, hash).await;

        result
    }

    fn ensure_can_start(&self) -> Result<()> {
        let current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        match current.as_ref() {
            Some(attempt) if !attempt.status.is_terminal() => Err(SessionError::AttemptInFlight),
            _ => Ok(()),
        }
    }

    /// Claim the attempt slot. Re-checks occupancy under the lock, since
    /// a competing start may have claimed the slot since
    /// `ensure_can_start`. Any non-terminal occupant blocks the claim: an
    /// occupant still at `Idle` belongs to a start that is about to
    /// drive, and replacing it would let two attempts submit.
    fn begin_attempt(&self, kind: AttemptKind) -> Result<TransactionAttempt> {
        let attempt = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(existing) = current.as_ref() {
                if !existing.status.is_terminal() {
                    return Err(SessionError::AttemptInFlight);
                }
            }
            let attempt = TransactionAttempt::new(kind);
            *current = Some(attempt.clone());
            attempt
        };
        self.notify(&attempt);
        Ok(attempt)
    }

    fn store_and_notify(&self, attempt: &TransactionAttempt) {
        {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            *current = Some(attempt.clone());
        }
        self.notify(attempt);
    }

    /// Store only if the slot still holds this attempt. A start from a
    /// terminal state may have replaced it while a re-sync was awaiting.
    fn store_if_current(&self, attempt: &TransactionAttempt) -> bool {
        let stored = {
            let mut current = self.current.lock().unwrap_or_else(|e| e.into_inner());
            match current.as_ref() {
                Some(existing) if existing.id == attempt.id => {
                    *current = Some(attempt.clone());
                    true
                }
                _ => false,
            }
        };
        if stored {
            self.notify(attempt);
        }
        stored
    }

    fn notify(&self, attempt: &TransactionAttempt) {
        let callbacks = self.callbacks.read().unwrap_or_else(|e| e.into_inner());
        for callback in callbacks.iter() {
            callback(attempt);
        }
    }
}

fn tracing_warn(_msg: &str) {
    #[cfg(feature = "tracing")]
    tracing::warn!("{}", _msg);
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use nilns_lib::{Address, Binding, NilnsError, ProfileUpdate, WalletIdentity};

    struct StubWallet;

    #[async_trait]
    impl WalletProvider for StubWallet {
        async fn connect(&self, chain_id: &str) -> nilns_lib::Result<WalletIdentity> {
            Ok(WalletIdentity {
                chain_id: chain_id.to_string(),
                address: Address::new("nillion1me"),
            })
        }

        async fn sign_and_broadcast(
            &self,
            _request: &TransferRequest,
        ) -> nilns_lib::Result<TxHash> {
            Ok(TxHash::new("0xABC"))
        }
    }

    struct StubRegistry;

    #[async_trait]
    impl RegistryClient for StubRegistry {
        async fn confirm_registration(
            &self,
            _tx_hash: &TxHash,
        ) -> nilns_lib::Result<ConfirmOutcome> {
            Ok(ConfirmOutcome::Acknowledged)
        }

        async fn resolve_name(&self, _name: &NilName) -> nilns_lib::Result<Address> {
            Ok(Address::new("nillion1peer"))
        }

        async fn lookup_by_owner(&self, _owner: &Address) -> nilns_lib::Result<Vec<Binding>> {
            Ok(Vec::new())
        }

        async fn update_profile(
            &self,
            _id: &str,
            _owner: &Address,
            _update: &ProfileUpdate,
        ) -> nilns_lib::Result<Binding> {
            Err(NilnsError::Unimplemented("update_profile"))
        }
    }

    fn orchestrator() -> TransactionOrchestrator<StubWallet, StubRegistry> {
        TransactionOrchestrator::nillion_testnet(StubWallet, StubRegistry)
    }

    fn failed_attempt(with_hash: bool) -> TransactionAttempt {
        let mut attempt = TransactionAttempt::new(AttemptKind::Registration {
            name: NilName::canonicalize("alice").unwrap(),
        });
        attempt.advance(AttemptStatus::Signing);
        if with_hash {
            attempt.record_hash(TxHash::new("0xDEAD"));
        }
        attempt.mark_failed(&NilnsError::Broadcast("node rejected".to_string()));
        attempt
    }

    #[tokio::test]
    async fn test_retry_with_broadcast_hash_is_refused() {
        let orch = orchestrator();
        *orch.current.lock().unwrap() = Some(failed_attempt(true));

        let err = orch.retry().await.unwrap_err();

        assert!(matches!(err, SessionError::AlreadyBroadcast(_)));
        // The failed attempt stays in place for inspection.
        assert_eq!(orch.current().unwrap().status, AttemptStatus::Failed);
    }

    #[tokio::test]
    async fn test_retry_without_hash_is_allowed() {
        let orch = orchestrator();
        *orch.current.lock().unwrap() = Some(failed_attempt(false));

        let attempt = orch.retry().await.unwrap();

        assert_eq!(attempt.status, AttemptStatus::Succeeded);
    }

    #[tokio::test]
    async fn test_retry_with_no_attempt() {
        let orch = orchestrator();

        let err = orch.retry().await.unwrap_err();

        assert!(matches!(err, SessionError::NoAttempt));
    }

    #[tokio::test]
    async fn test_start_is_refused_while_a_claim_is_idle() {
        let orch = orchestrator();
        let claim = TransactionAttempt::new(AttemptKind::Registration {
            name: NilName::canonicalize("alice").unwrap(),
        });
        *orch.current.lock().unwrap() = Some(claim.clone());

        let err = orch.register("bob").await.unwrap_err();
        assert!(matches!(err, SessionError::AttemptInFlight));

        // The claim-time re-check refuses an idle occupant as well.
        let err = orch
            .begin_attempt(AttemptKind::Registration {
                name: NilName::canonicalize("bob").unwrap(),
            })
            .unwrap_err();
        assert!(matches!(err, SessionError::AttemptInFlight));

        assert_eq!(orch.current().unwrap().id, claim.id);
    }

    #[tokio::test]
    async fn test_cancel_requires_failed_status() {
        let orch = orchestrator();
        assert!(matches!(orch.cancel(), Err(SessionError::NoAttempt)));

        let succeeded = orch.register("alice").await.unwrap();
        assert_eq!(succeeded.status, AttemptStatus::Succeeded);

        let err = orch.cancel().unwrap_err();
        assert!(matches!(
            err,
            SessionError::InvalidTransition {
                event: "cancel",
                status: AttemptStatus::Succeeded,
            }
        ));
    }

    #[tokio::test]
    async fn test_retry_registry_sync_requires_succeeded_registration() {
        let orch = orchestrator();
        let paid = orch.pay("bob", "1.5").await.unwrap();
        assert_eq!(paid.status, AttemptStatus::Succeeded);

        let err = orch.retry_registry_sync().await.unwrap_err();

        assert!(matches!(err, SessionError::InvalidTransition { .. }));
    }

    #[tokio::test]
    async fn test_retry_registry_sync_without_warning_is_a_no_op() {
        let orch = orchestrator();
        let registered = orch.register("alice").await.unwrap();
        assert!(registered.warning.is_none());

        let attempt = orch.retry_registry_sync().await.unwrap();

        assert_eq!(attempt.id, registered.id);
        assert!(attempt.warning.is_none());
    }
}

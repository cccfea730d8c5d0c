//! Transaction attempt state tracking.
//!
//! A [`TransactionAttempt`] is the observable record of one registration
//! or payment: its lifecycle status, the broadcast hash once known, and
//! any failure or warning picked up along the way. The orchestrator is
//! the only writer; everyone else sees cloned snapshots.

use nilns_lib::{Address, Coin, NilName, NilnsError, NilnsErrorCode, TxHash};
use serde::{Deserialize, Serialize};

/// Attempt lifecycle states.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttemptStatus {
    /// Attempt created, no wallet interaction yet.
    Idle,
    /// Waiting for the wallet to sign and submit.
    Signing,
    /// The chain accepted the transaction for broadcast.
    Broadcasting,
    /// Broadcast done, waiting on confirmation and registry sync.
    Confirming,
    /// The transaction is confirmed.
    Succeeded,
    /// The attempt failed.
    Failed,
    /// A failed attempt was discarded by the user.
    Cancelled,
}

impl AttemptStatus {
    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    /// Check if the attempt is still moving through the pipeline.
    ///
    /// `Idle` is not in flight: an idle attempt has touched nothing yet.
    /// It still occupies the session slot, so the orchestrator refuses
    /// new starts until it reaches a terminal state.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, Self::Signing | Self::Broadcasting | Self::Confirming)
    }

    /// Check if the attempt succeeded.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }
}

/// What the attempt is trying to do.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AttemptKind {
    /// Claim a name with a self-transfer carrying the name as memo.
    Registration { name: NilName },
    /// Send funds to the resolved owner of a name.
    Payment {
        recipient: NilName,
        to: Address,
        amount: Coin,
    },
}

impl AttemptKind {
    /// Short label for logs and traces.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Registration { .. } => "registration",
            Self::Payment { .. } => "payment",
        }
    }
}

/// Why an attempt failed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AttemptFailure {
    /// Stable error code for programmatic handling.
    pub code: NilnsErrorCode,
    /// Human-readable description.
    pub message: String,
}

impl AttemptFailure {
    pub(crate) fn from_error(err: &NilnsError) -> Self {
        Self {
            code: err.code(),
            message: err.to_string(),
        }
    }
}

/// Observable record of one registration or payment attempt.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransactionAttempt {
    /// Unique attempt identifier.
    pub id: String,
    /// What this attempt is doing.
    pub kind: AttemptKind,
    /// Current lifecycle status.
    pub status: AttemptStatus,
    /// Broadcast transaction hash, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    /// Failure details when the status is `Failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<AttemptFailure>,
    /// Non-fatal problem attached to a succeeded attempt, such as a
    /// registry that could not be notified.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    /// Timestamp when the attempt was created (unix epoch seconds).
    pub started_at: i64,
    /// Timestamp when the status last changed.
    pub updated_at: i64,
}

impl TransactionAttempt {
    /// Create a new idle attempt.
    pub fn new(kind: AttemptKind) -> Self {
        let now = current_timestamp();
        Self {
            id: format!("attempt_{}", uuid::Uuid::new_v4()),
            kind,
            status: AttemptStatus::Idle,
            tx_hash: None,
            failure: None,
            warning: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Create a fresh idle attempt re-running the same operation.
    pub(crate) fn renewed(&self) -> Self {
        Self::new(self.kind.clone())
    }

    /// Move to a new lifecycle status.
    pub(crate) fn advance(&mut self, status: AttemptStatus) {
        self.status = status;
        self.updated_at = current_timestamp();
    }

    /// Record the broadcast hash.
    pub(crate) fn record_hash(&mut self, hash: TxHash) {
        self.tx_hash = Some(hash);
        self.updated_at = current_timestamp();
    }

    /// Mark as failed.
    pub(crate) fn mark_failed(&mut self, err: &NilnsError) {
        self.status = AttemptStatus::Failed;
        self.failure = Some(AttemptFailure::from_error(err));
        self.updated_at = current_timestamp();
    }

    /// Attach a non-fatal warning.
    pub(crate) fn set_warning(&mut self, warning: impl Into<String>) {
        self.warning = Some(warning.into());
        self.updated_at = current_timestamp();
    }

    /// Drop the warning after a successful re-sync.
    pub(crate) fn clear_warning(&mut self) {
        self.warning = None;
        self.updated_at = current_timestamp();
    }
}

fn current_timestamp() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs() as i64
}

//! NIL Name Service Session Layer
//!
//! This crate drives registrations and payments end to end on top of the
//! protocol types from `nilns-lib`: wallet connection caching, the
//! one-attempt-at-a-time transaction lifecycle, and registry
//! synchronization with retry.
//!
//! The entry point is [`TransactionOrchestrator`], which owns a
//! [`WalletSession`] and a registry client and exposes `register`, `pay`
//! and the recovery operations. Progress is observable through
//! [`TransactionAttempt`] snapshots and status callbacks.

use nilns_lib::{NilnsError, TxHash};

pub mod attempt;
pub mod orchestrator;
pub mod session;

pub use attempt::{AttemptFailure, AttemptKind, AttemptStatus, TransactionAttempt};
pub use orchestrator::{StatusCallback, TransactionOrchestrator};
pub use session::WalletSession;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, SessionError>;

/// Errors raised before an attempt starts or when a lifecycle event is
/// not legal from the current state.
///
/// Failures of a running attempt are never reported here; they land on
/// the attempt itself as [`AttemptFailure`], so a started transaction
/// always yields an observable record.
#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    /// Another attempt is between signing and confirmation.
    #[error("another attempt is in flight")]
    AttemptInFlight,
    /// The requested event is not legal from the current status.
    #[error("{event} is not allowed in status {status:?}")]
    InvalidTransition {
        event: &'static str,
        status: AttemptStatus,
    },
    /// The failed attempt already broadcast a transaction; its on-chain
    /// outcome is unknown, so re-running it could double-submit.
    #[error("attempt already broadcast as {0}, not retrying")]
    AlreadyBroadcast(TxHash),
    /// No attempt exists to operate on.
    #[error("no attempt to operate on")]
    NoAttempt,
    /// Validation or protocol failure before any attempt was created.
    #[error(transparent)]
    Core(#[from] NilnsError),
}

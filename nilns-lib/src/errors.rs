//! Error types for NIL name service operations.
//!
//! This module provides structured error types for the protocol library,
//! enabling callers to distinguish input mistakes, wallet refusals, chain
//! rejections and transient transport failures from each other.

use std::fmt;

/// Error codes for FFI and UI integration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[repr(i32)]
pub enum NilnsErrorCode {
    /// Feature not implemented
    Unimplemented = 1000,
    /// Bad user input, caught before any external call
    InvalidInput = 2000,
    /// Payment amount rounds to zero base units
    AmountTooSmall = 2001,
    /// No wallet provider present
    WalletUnavailable = 3000,
    /// Signing declined by the user
    UserRejected = 3001,
    /// Transaction submission rejected by the chain
    Broadcast = 4000,
    /// Network failure, retryable
    Transient = 5000,
    /// Bounded wait elapsed, retryable
    Timeout = 5001,
    /// Name or record has no binding
    NotFound = 6000,
    /// Registry refused the request
    RegistryRejected = 6001,
    /// Post-broadcast registry notification failed
    RegistrySync = 6002,
    /// Serialization error
    Serialization = 7000,
    /// Internal/unexpected error
    Internal = 9999,
}

/// Comprehensive error type for name service operations.
#[derive(Debug)]
pub enum NilnsError {
    /// Feature not implemented yet.
    Unimplemented(&'static str),

    /// Invalid user input, rejected before any wallet or network call.
    InvalidInput {
        /// Field or parameter name
        field: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Positive payment amount whose base-unit conversion floors to zero.
    AmountTooSmall {
        /// The offending amount, as entered
        amount: String,
        /// Smallest representable amount in display units
        minimum: String,
    },

    /// No wallet provider is available.
    WalletUnavailable(String),

    /// The user declined the signing request.
    UserRejected,

    /// The chain rejected the signed transaction.
    Broadcast(String),

    /// Network-level failure; retrying the same call may succeed.
    Transient(String),

    /// An operation did not return within its bounded window.
    Timeout {
        /// Operation that timed out
        operation: String,
        /// Timeout duration in milliseconds
        timeout_ms: u64,
    },

    /// Resource not found (name, binding, transaction).
    NotFound {
        /// Type of resource (e.g., "name", "binding")
        resource_type: String,
        /// Resource identifier
        identifier: String,
    },

    /// The registry refused the request.
    RegistryRejected {
        /// HTTP status returned by the registry
        status: u16,
        /// Reason given by the registry
        reason: String,
    },

    /// Registry notification failed after a successful broadcast.
    ///
    /// The funds moved; only the off-chain record is behind. Surfaced as a
    /// warning on a succeeded attempt, never as an attempt failure.
    RegistrySync(String),

    /// Serialization/deserialization error.
    Serialization(String),

    /// Internal/unexpected error.
    Internal(String),
}

impl NilnsError {
    /// Get the error code for FFI/UI integration.
    pub fn code(&self) -> NilnsErrorCode {
        match self {
            Self::Unimplemented(_) => NilnsErrorCode::Unimplemented,
            Self::InvalidInput { .. } => NilnsErrorCode::InvalidInput,
            Self::AmountTooSmall { .. } => NilnsErrorCode::AmountTooSmall,
            Self::WalletUnavailable(_) => NilnsErrorCode::WalletUnavailable,
            Self::UserRejected => NilnsErrorCode::UserRejected,
            Self::Broadcast(_) => NilnsErrorCode::Broadcast,
            Self::Transient(_) => NilnsErrorCode::Transient,
            Self::Timeout { .. } => NilnsErrorCode::Timeout,
            Self::NotFound { .. } => NilnsErrorCode::NotFound,
            Self::RegistryRejected { .. } => NilnsErrorCode::RegistryRejected,
            Self::RegistrySync(_) => NilnsErrorCode::RegistrySync,
            Self::Serialization(_) => NilnsErrorCode::Serialization,
            Self::Internal(_) => NilnsErrorCode::Internal,
        }
    }

    /// Get the error message as an owned String (useful for FFI).
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Returns true if this error is potentially recoverable by retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transient(_) | Self::Timeout { .. } | Self::RegistrySync(_)
        )
    }

    /// Returns a suggested retry delay in milliseconds, if applicable.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            Self::Transient(_) => Some(1000),
            Self::Timeout { .. } => Some(1000),
            Self::RegistrySync(_) => Some(2000),
            _ => None,
        }
    }

    /// Create a transient error from any error type.
    pub fn transient<E: std::error::Error>(err: E) -> Self {
        Self::Transient(err.to_string())
    }

    /// Create a not found error.
    pub fn not_found(resource_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            identifier: identifier.into(),
        }
    }

    /// Create an invalid input error.
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NilnsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unimplemented(label) => write!(f, "{} is not implemented yet", label),
            Self::InvalidInput { field, reason } => {
                write!(f, "invalid {}: {}", field, reason)
            }
            Self::AmountTooSmall { amount, minimum } => {
                write!(
                    f,
                    "amount too small: {} NIL is below the minimum of {} NIL",
                    amount, minimum
                )
            }
            Self::WalletUnavailable(msg) => write!(f, "wallet unavailable: {}", msg),
            Self::UserRejected => write!(f, "signing request rejected by the user"),
            Self::Broadcast(msg) => write!(f, "broadcast rejected: {}", msg),
            Self::Transient(msg) => write!(f, "transient network error: {}", msg),
            Self::Timeout {
                operation,
                timeout_ms,
            } => {
                write!(f, "{} timed out after {}ms", operation, timeout_ms)
            }
            Self::NotFound {
                resource_type,
                identifier,
            } => {
                write!(f, "{} not found: {}", resource_type, identifier)
            }
            Self::RegistryRejected { status, reason } => {
                write!(f, "registry rejected the request ({}): {}", status, reason)
            }
            Self::RegistrySync(msg) => write!(f, "registry sync failed: {}", msg),
            Self::Serialization(msg) => write!(f, "serialization error: {}", msg),
            Self::Internal(msg) => write!(f, "internal error: {}", msg),
        }
    }
}

impl std::error::Error for NilnsError {}

impl From<serde_json::Error> for NilnsError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

//! Name canonicalization and memo encoding.
//!
//! A candidate name becomes canonical by appending the `.nil` suffix
//! exactly once. The canonical string doubles as the on-chain memo of a
//! registration transaction, so nothing else in the workspace builds memo
//! strings by hand.

use serde::{Deserialize, Serialize};

use crate::{NilnsError, Result};

/// Suffix carried by every canonical name.
pub const NAME_SUFFIX: &str = ".nil";

/// A canonical `.nil` name.
///
/// Construct through [`NilName::canonicalize`]; the inner string always
/// ends with [`NAME_SUFFIX`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NilName(String);

impl NilName {
    /// Canonicalize user input: trim, reject empty, append the suffix if absent.
    ///
    /// Idempotent: canonicalizing an already canonical name returns it
    /// unchanged, and the suffix is never duplicated.
    pub fn canonicalize(input: &str) -> Result<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(NilnsError::invalid_input("name", "name must not be empty"));
        }
        if trimmed.ends_with(NAME_SUFFIX) {
            Ok(Self(trimmed.to_string()))
        } else {
            Ok(Self(format!("{}{}", trimmed, NAME_SUFFIX)))
        }
    }

    /// The canonical name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The registration memo payload. Identity on the canonical name.
    pub fn as_memo(&self) -> &str {
        &self.0
    }

    /// The memo attached to a payment transaction sent to this name.
    pub fn payment_memo(&self) -> String {
        format!("Payment to {}", self.0)
    }
}

impl AsRef<str> for NilName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for NilName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

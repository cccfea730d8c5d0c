//! Registry service interface and records.
//!
//! The registry persists name→address bindings and serves lookups. The
//! core never mutates a binding directly; every change goes through the
//! [`RegistryClient`] trait. The HTTP implementation lives in [`http`].

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::name::NilName;
use crate::{Address, Result, TxHash};

/// Verification fields attached to a binding.
///
/// The core forwards these exactly as the user supplied them; checking
/// them and flipping the verified flag is the registry's job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationInfo {
    /// Link to a twitter.com or x.com profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub twitter_link: Option<String>,
    /// Set by the registry once the link passes its checks
    #[serde(default)]
    pub twitter_verified: bool,
    /// Contact email
    #[serde(rename = "gmail", default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// A persisted name→address association.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    /// Registry-assigned record id
    #[serde(
        rename = "_id",
        alias = "metaId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub id: Option<String>,
    /// Canonical name
    pub name: NilName,
    /// Owning address (the registration transaction's sender)
    pub address: Address,
    /// Verification metadata, flattened on the wire
    #[serde(flatten)]
    pub verification: VerificationInfo,
}

/// Profile fields to change on an existing binding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    /// New twitter/x profile link
    pub twitter_link: Option<String>,
    /// New contact email
    pub email: Option<String>,
}

impl ProfileUpdate {
    /// Create an empty update.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the twitter/x profile link.
    pub fn with_twitter_link(mut self, link: impl Into<String>) -> Self {
        self.twitter_link = Some(link.into());
        self
    }

    /// Set the contact email.
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// True when no field would change.
    pub fn is_empty(&self) -> bool {
        self.twitter_link.is_none() && self.email.is_none()
    }
}

/// Outcome of notifying the registry of a registration transaction.
///
/// Duplicate notifications are tolerated as success: the registry owns
/// name uniqueness, and re-sending a hash it already recorded must not
/// fail the attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfirmOutcome {
    /// The registry recorded the binding and echoed it back.
    Recorded(Binding),
    /// The registry accepted the hash without echoing a record, or had
    /// already recorded it.
    Acknowledged,
}

impl ConfirmOutcome {
    /// The echoed binding, when present.
    pub fn binding(&self) -> Option<&Binding> {
        match self {
            Self::Recorded(binding) => Some(binding),
            Self::Acknowledged => None,
        }
    }
}

/// Interface to the external registry service.
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
pub trait RegistryClient {
    /// Notify the registry of a broadcast registration transaction.
    ///
    /// The registry looks the transaction up by hash and turns
    /// memo-as-name plus sender-as-owner into a binding. Idempotent from
    /// the caller's perspective: a duplicate response is success.
    async fn confirm_registration(&self, tx_hash: &TxHash) -> Result<ConfirmOutcome>;

    /// Resolve a canonical name to its owning address.
    ///
    /// `NotFound` means the name has no binding; transport failures map to
    /// retryable errors and are never conflated with a miss.
    async fn resolve_name(&self, name: &NilName) -> Result<Address>;

    /// Fetch every binding owned by an address.
    ///
    /// Always a fresh fetch; the core keeps no pagination or cache state.
    async fn lookup_by_owner(&self, owner: &Address) -> Result<Vec<Binding>>;

    /// Update profile fields on an existing binding.
    async fn update_profile(
        &self,
        id: &str,
        owner: &Address,
        update: &ProfileUpdate,
    ) -> Result<Binding>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binding_deserializes_wire_records() {
        let json = r#"{
            "_id": "abc-123",
            "name": "bob.nil",
            "address": "nillion1sender",
            "twitter_link": "https://x.com/bob",
            "twitter_verified": true,
            "gmail": "bob@gmail.com"
        }"#;
        let binding: Binding = serde_json::from_str(json).unwrap();

        assert_eq!(binding.id.as_deref(), Some("abc-123"));
        assert_eq!(binding.name.as_str(), "bob.nil");
        assert_eq!(binding.address.as_str(), "nillion1sender");
        assert_eq!(
            binding.verification.twitter_link.as_deref(),
            Some("https://x.com/bob")
        );
        assert!(binding.verification.twitter_verified);
        assert_eq!(binding.verification.email.as_deref(), Some("bob@gmail.com"));
    }

    #[test]
    fn test_binding_accepts_meta_id_alias() {
        let json = r#"{"metaId":"meta-9","name":"carol.nil","address":"nillion1carol"}"#;
        let binding: Binding = serde_json::from_str(json).unwrap();
        assert_eq!(binding.id.as_deref(), Some("meta-9"));
        assert_eq!(binding.verification, VerificationInfo::default());
    }

    #[test]
    fn test_binding_serializes_without_empty_fields() {
        let binding: Binding =
            serde_json::from_str(r#"{"name":"dave.nil","address":"nillion1dave"}"#).unwrap();
        let value = serde_json::to_value(&binding).unwrap();

        assert!(value.get("_id").is_none());
        assert!(value.get("twitter_link").is_none());
        assert!(value.get("gmail").is_none());
        assert_eq!(value["twitter_verified"], false);
    }

    #[test]
    fn test_profile_update_builder() {
        assert!(ProfileUpdate::new().is_empty());

        let update = ProfileUpdate::new()
            .with_twitter_link("https://x.com/bob")
            .with_email("bob@gmail.com");
        assert!(!update.is_empty());
        assert_eq!(update.twitter_link.as_deref(), Some("https://x.com/bob"));
    }

    #[test]
    fn test_confirm_outcome_binding_accessor() {
        let binding: Binding =
            serde_json::from_str(r#"{"name":"bob.nil","address":"nillion1bob"}"#).unwrap();
        assert!(ConfirmOutcome::Recorded(binding).binding().is_some());
        assert!(ConfirmOutcome::Acknowledged.binding().is_none());
    }
}

//! NIL name service protocol library.
//!
//! This crate intentionally stays stateless and delegates signing and
//! persistence to callers through trait-based dependency injection: wallets
//! implement [`WalletProvider`], registries implement [`RegistryClient`].
//!
//! # Features
//!
//! - **Name Codec**: Canonical `.nil` names and on-chain memo encoding
//! - **Resolution**: Fresh name→address lookups that keep "no such name"
//!   distinct from transport failures
//! - **Registry Protocol**: Registration confirmation, owner listings and
//!   profile updates against the registry API
//! - **Wallet Abstraction**: Trait-based design for custom signers
//!
//! # Example
//!
//! ```ignore
//! use nilns_lib::{resolve_address, HttpRegistryClient, RegistryConfig};
//!
//! let registry = HttpRegistryClient::new(RegistryConfig::local())?;
//! let address = resolve_address(&registry, "alice").await?;
//! println!("alice.nil pays to {}", address);
//! ```

pub mod amount;
pub mod config;
pub mod errors;
pub mod name;
pub mod registry;
pub mod wallet;

pub use amount::{Coin, Fee, NilAmount, BASE_UNITS_PER_NIL, MIN_PAYMENT_NIL};
pub use config::{ChainConfig, RegistryConfig};
pub use errors::{NilnsError, NilnsErrorCode};
pub use name::{NilName, NAME_SUFFIX};
pub use registry::http::HttpRegistryClient;
pub use registry::{Binding, ConfirmOutcome, ProfileUpdate, RegistryClient, VerificationInfo};
pub use wallet::{TransferRequest, WalletIdentity, WalletProvider};

/// Common result alias for name service operations.
pub type Result<T> = std::result::Result<T, NilnsError>;

/// Account address on the chain.
///
/// # Example
///
/// ```
/// use nilns_lib::Address;
///
/// // Create from &str
/// let address: Address = "nillion1abc".into();
///
/// // Or explicitly
/// let address = Address::new("nillion1abc");
///
/// // Access the inner value
/// assert!(address.as_str().starts_with("nillion1"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Address(pub String);

impl Address {
    /// Create a new address from a string.
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into())
    }

    /// Get the address as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Address {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Address {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for Address {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hash of a broadcast chain transaction.
///
/// # Example
///
/// ```
/// use nilns_lib::TxHash;
///
/// let hash = TxHash::new("0xABC");
/// assert_eq!(hash.as_str(), "0xABC");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct TxHash(pub String);

impl TxHash {
    /// Create a new transaction hash from a string.
    pub fn new(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// Get the hash as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TxHash {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TxHash {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for TxHash {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves user input to the owning address of the canonical name.
///
/// # Semantics
/// - The input is always canonicalized first, so `"alice"` and
///   `"alice.nil"` resolve identically.
/// - Every call is a fresh query; bindings can change between attempts, so
///   nothing is cached here.
/// - `NotFound` means the name has no binding; transport failures surface
///   as retryable errors and are never conflated with a miss.
///
/// # Examples
/// ```
/// # use nilns_lib::{resolve_address, RegistryClient};
/// # async fn demo(registry: &impl RegistryClient) -> nilns_lib::Result<()> {
/// let address = resolve_address(registry, "alice").await?;
/// println!("alice.nil pays to {}", address);
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(registry)))]
pub async fn resolve_address<R>(registry: &R, input: &str) -> Result<Address>
where
    R: RegistryClient,
{
    let name = NilName::canonicalize(input)?;
    registry
        .resolve_name(&name)
        .await
        .map_err(|err| map_registry_error("resolve_address", err))
}

/// Retrieves every binding owned by the given address.
///
/// # Semantics
/// - Returns an empty vector when the address has not registered any names.
/// - Always re-fetches; the core keeps no pagination or cache state.
///
/// # Examples
/// ```
/// # use nilns_lib::{get_name_list, Address, RegistryClient};
/// # async fn demo(registry: &impl RegistryClient, owner: &Address) -> nilns_lib::Result<()> {
/// for binding in get_name_list(registry, owner).await? {
///     println!("{} -> {}", binding.name, binding.address);
/// }
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(registry)))]
pub async fn get_name_list<R>(registry: &R, owner: &Address) -> Result<Vec<Binding>>
where
    R: RegistryClient,
{
    registry
        .lookup_by_owner(owner)
        .await
        .map_err(|err| map_registry_error("get_name_list", err))
}

/// Updates profile fields on an existing binding.
///
/// An update with no fields set is rejected locally before any request is
/// made. Field validation (link shape, email shape) belongs to the
/// registry; this call only forwards what the user supplied.
///
/// # Examples
/// ```
/// # use nilns_lib::{set_profile_fields, Address, ProfileUpdate, RegistryClient};
/// # async fn demo(registry: &impl RegistryClient, owner: &Address) -> nilns_lib::Result<()> {
/// let update = ProfileUpdate::new().with_twitter_link("https://x.com/alice");
/// let binding = set_profile_fields(registry, "abc-123", owner, &update).await?;
/// assert_eq!(binding.verification.twitter_link.as_deref(), Some("https://x.com/alice"));
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(registry, update)))]
pub async fn set_profile_fields<R>(
    registry: &R,
    id: &str,
    owner: &Address,
    update: &ProfileUpdate,
) -> Result<Binding>
where
    R: RegistryClient,
{
    if update.is_empty() {
        return Err(NilnsError::invalid_input(
            "profile",
            "no updatable fields provided",
        ));
    }
    registry
        .update_profile(id, owner, update)
        .await
        .map_err(|err| map_registry_error("set_profile_fields", err))
}

/// Notifies the registry of a broadcast registration transaction.
///
/// Idempotent from the caller's perspective: a registry that already
/// recorded the hash acknowledges instead of failing.
///
/// # Examples
/// ```
/// # use nilns_lib::{sync_registration, RegistryClient, TxHash};
/// # async fn demo(registry: &impl RegistryClient) -> nilns_lib::Result<()> {
/// let outcome = sync_registration(registry, &TxHash::new("0xABC")).await?;
/// if let Some(binding) = outcome.binding() {
///     println!("registered {}", binding.name);
/// }
/// # Ok(())
/// # }
/// ```
#[cfg_attr(feature = "tracing", tracing::instrument(skip(registry)))]
pub async fn sync_registration<R>(registry: &R, tx_hash: &TxHash) -> Result<ConfirmOutcome>
where
    R: RegistryClient,
{
    registry
        .confirm_registration(tx_hash)
        .await
        .map_err(|err| map_registry_error("sync_registration", err))
}

fn map_registry_error(label: &'static str, err: NilnsError) -> NilnsError {
    match err {
        NilnsError::Transient(msg) => NilnsError::Transient(format!("{}: {}", label, msg)),
        _ => err,
    }
}

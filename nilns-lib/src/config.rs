//! Configuration for the chain and the registry service.
//!
//! The fee policy is fixed: callers pick a chain preset and get the flat
//! fee, gas budget and registration transfer amount with it. Only the
//! endpoints and timeouts are meant to vary between deployments.

use serde::{Deserialize, Serialize};

use crate::amount::{Coin, Fee};

fn default_timeout() -> u64 {
    30
}

fn default_fee_amount() -> u64 {
    5000
}

fn default_gas_limit() -> u64 {
    200_000
}

fn default_registration_amount() -> u64 {
    2000
}

/// Chain connection parameters and the fixed fee policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Chain identifier presented to the wallet
    pub chain_id: String,
    /// RPC endpoint the wallet broadcasts through
    pub rpc_url: String,
    /// Base denomination (e.g. "unil")
    pub denom: String,
    /// Display denomination (e.g. "NIL")
    pub display_denom: String,
    /// Flat fee in base units
    #[serde(default = "default_fee_amount")]
    pub fee_amount: u64,
    /// Gas budget per transaction
    #[serde(default = "default_gas_limit")]
    pub gas_limit: u64,
    /// Self-transfer amount carried by a registration, in base units
    #[serde(default = "default_registration_amount")]
    pub registration_amount: u64,
}

impl ChainConfig {
    /// Create a configuration with the fixed fee policy applied.
    pub fn new(chain_id: impl Into<String>, rpc_url: impl Into<String>) -> Self {
        Self {
            chain_id: chain_id.into(),
            rpc_url: rpc_url.into(),
            denom: "unil".to_string(),
            display_denom: "NIL".to_string(),
            fee_amount: default_fee_amount(),
            gas_limit: default_gas_limit(),
            registration_amount: default_registration_amount(),
        }
    }

    /// The Nillion testnet.
    pub fn nillion_testnet() -> Self {
        Self::new(
            "nillion-chain-testnet-1",
            "https://testnet-nillion-rpc.lavenderfive.com",
        )
    }

    /// Set the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }

    /// The flat fee attached to every transaction.
    pub fn fee(&self) -> Fee {
        Fee::new(Coin::new(self.fee_amount, &self.denom), self.gas_limit)
    }

    /// The self-transfer coin carried by a registration transaction.
    pub fn registration_transfer(&self) -> Coin {
        Coin::new(self.registration_amount, &self.denom)
    }
}

/// Registry service endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Base URL of the registry API
    pub api_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl RegistryConfig {
    /// Create a configuration for the given registry endpoint.
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            timeout_secs: default_timeout(),
        }
    }

    /// A registry running on the local development port.
    pub fn local() -> Self {
        Self::new("http://localhost:3000")
    }

    /// Set the request timeout in seconds.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

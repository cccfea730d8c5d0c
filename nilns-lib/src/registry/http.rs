//! HTTP implementation of the registry client.
//!
//! Talks to the registry REST API over JSON POST endpoints.
//!
//! # Feature Flags
//!
//! This module requires the `http-registry` feature flag (on by default)
//! for actual HTTP requests. Without it, all requests return an
//! `Unimplemented` error.
//!
//! # Example
//!
//! ```rust,ignore
//! use nilns_lib::registry::http::HttpRegistryClient;
//! use nilns_lib::{NilName, RegistryConfig};
//!
//! let client = HttpRegistryClient::new(RegistryConfig::local())?;
//! let name = NilName::canonicalize("alice")?;
//! let address = client.resolve_name(&name).await?;
//! println!("{} is owned by {}", name, address);
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
#[cfg(feature = "http-registry")]
use std::time::Duration;

use super::{Binding, ConfirmOutcome, ProfileUpdate, RegistryClient};
use crate::config::RegistryConfig;
use crate::name::NilName;
use crate::{Address, NilnsError, Result, TxHash};

/// Registry client over the registry's HTTP API.
///
/// All endpoints are JSON POST; failures carry an `{ "error": reason }`
/// body with a meaningful status code. Server errors and rate limiting map
/// to retryable errors, a 404 maps to `NotFound`, and everything the
/// registry explicitly refuses maps to `RegistryRejected`.
pub struct HttpRegistryClient {
    config: RegistryConfig,
    #[cfg(feature = "http-registry")]
    client: reqwest::Client,
}

impl HttpRegistryClient {
    /// Create a new registry client with the given configuration.
    #[cfg(feature = "http-registry")]
    pub fn new(config: RegistryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| NilnsError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create a new registry client with the given configuration (stub when feature disabled).
    #[cfg(not(feature = "http-registry"))]
    pub fn new(config: RegistryConfig) -> Result<Self> {
        Ok(Self { config })
    }

    /// Create a client for a registry on the local development port.
    pub fn local() -> Result<Self> {
        Self::new(RegistryConfig::local())
    }

    /// Get the configuration.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Build the full URL for an API endpoint.
    #[cfg(any(feature = "http-registry", test))]
    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.api_url.trim_end_matches('/'), path)
    }

    /// Make a JSON POST request to the API.
    #[cfg(feature = "http-registry")]
    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let url = self.url(path);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| self.map_reqwest_error(e))?;

        self.handle_response(response).await
    }

    /// Make a JSON POST request to the API (stub when feature disabled).
    #[cfg(not(feature = "http-registry"))]
    async fn post<B: Serialize, T: for<'de> Deserialize<'de>>(
        &self,
        _path: &str,
        _body: &B,
    ) -> Result<T> {
        Err(NilnsError::Unimplemented(
            "registry HTTP client not compiled - enable the 'http-registry' feature",
        ))
    }

    /// Handle an HTTP response, parsing JSON or returning an error.
    #[cfg(feature = "http-registry")]
    async fn handle_response<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(self.map_status_error(status.as_u16(), &error_text));
        }

        response.json::<T>().await.map_err(|e| {
            NilnsError::Serialization(format!("Failed to parse registry response: {}", e))
        })
    }

    /// Map HTTP status codes to NilnsError.
    #[cfg(feature = "http-registry")]
    fn map_status_error(&self, status: u16, error_text: &str) -> NilnsError {
        let reason = extract_error_reason(error_text);
        match status {
            404 => NilnsError::NotFound {
                resource_type: "registry resource".to_string(),
                identifier: reason,
            },
            429 => NilnsError::Transient(format!("registry rate limited: {}", reason)),
            400..=499 => NilnsError::RegistryRejected { status, reason },
            500..=599 => {
                NilnsError::Transient(format!("registry server error ({}): {}", status, reason))
            }
            _ => NilnsError::Transient(format!(
                "registry request failed ({}): {}",
                status, reason
            )),
        }
    }

    /// Map reqwest errors to NilnsError.
    #[cfg(feature = "http-registry")]
    fn map_reqwest_error(&self, e: reqwest::Error) -> NilnsError {
        if e.is_timeout() {
            NilnsError::Timeout {
                operation: "registry request".to_string(),
                timeout_ms: self.config.timeout_secs * 1000,
            }
        } else if e.is_connect() {
            NilnsError::Transient(format!(
                "connection to {} failed: {}",
                self.config.api_url, e
            ))
        } else {
            NilnsError::Transient(format!("registry request failed: {}", e))
        }
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl RegistryClient for HttpRegistryClient {
    async fn confirm_registration(&self, tx_hash: &TxHash) -> Result<ConfirmOutcome> {
        let request = NewNameRequest {
            tx_id: tx_hash.as_str(),
        };
        let response: NewNameResponse = match self.post("new_name", &request).await {
            Ok(response) => response,
            // The registry had already recorded this hash; success by contract.
            Err(NilnsError::RegistryRejected { status: 409, .. }) => {
                return Ok(ConfirmOutcome::Acknowledged);
            }
            Err(e) => return Err(e),
        };

        if let Some(binding) = response.data {
            return Ok(ConfirmOutcome::Recorded(binding));
        }
        if is_success_message(&response.message) {
            return Ok(ConfirmOutcome::Acknowledged);
        }
        // The registry answered 2xx but could not validate the transaction.
        Err(NilnsError::RegistrySync(response.message))
    }

    async fn resolve_name(&self, name: &NilName) -> Result<Address> {
        let request = ResolveNameRequest {
            name: name.as_str(),
        };
        let response: ResolveNameResponse = match self.post("resolve_name", &request).await {
            Ok(response) => response,
            Err(NilnsError::NotFound { .. }) => {
                return Err(NilnsError::not_found("name", name.as_str()));
            }
            Err(e) => return Err(e),
        };

        response.address.ok_or_else(|| {
            NilnsError::Serialization("resolve_name response missing address".to_string())
        })
    }

    async fn lookup_by_owner(&self, owner: &Address) -> Result<Vec<Binding>> {
        let request = OwnerNamesRequest {
            address: owner.as_str(),
        };
        let response: OwnerNamesResponse = self.post("get_names", &request).await?;
        Ok(response.message)
    }

    async fn update_profile(
        &self,
        id: &str,
        owner: &Address,
        update: &ProfileUpdate,
    ) -> Result<Binding> {
        let request = UpdateNameRequest {
            meta_id: id,
            address: owner.as_str(),
            twitter_link: update.twitter_link.as_deref(),
            gmail: update.email.as_deref(),
        };
        let response: UpdateNameResponse = self.post("update_name", &request).await?;
        Ok(response.data)
    }
}

/// True for the success markers the registry uses ("Success", "Success!").
fn is_success_message(message: &str) -> bool {
    message.starts_with("Success")
}

/// Pull the reason out of an `{ "error": reason }` body, falling back to
/// the raw text.
#[cfg(feature = "http-registry")]
fn extract_error_reason(error_text: &str) -> String {
    serde_json::from_str::<ErrorResponse>(error_text)
        .map(|e| e.error)
        .unwrap_or_else(|_| error_text.trim().to_string())
}

#[derive(Serialize)]
struct ResolveNameRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct OwnerNamesRequest<'a> {
    address: &'a str,
}

#[derive(Serialize)]
struct NewNameRequest<'a> {
    #[serde(rename = "txId")]
    tx_id: &'a str,
}

#[derive(Serialize)]
struct UpdateNameRequest<'a> {
    #[serde(rename = "metaId")]
    meta_id: &'a str,
    address: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    twitter_link: Option<&'a str>,
    #[serde(rename = "gmail", skip_serializing_if = "Option::is_none")]
    gmail: Option<&'a str>,
}

/// Response envelope for `resolve_name`.
#[derive(Clone, Debug, Deserialize)]
pub struct ResolveNameResponse {
    /// Status message
    pub message: String,
    /// Owning address when resolution succeeded
    #[serde(default)]
    pub address: Option<Address>,
    /// Echo of the canonical name
    #[serde(default)]
    pub name: Option<String>,
}

/// Response envelope for `get_names`.
#[derive(Clone, Debug, Deserialize)]
pub struct OwnerNamesResponse {
    /// Bindings owned by the queried address
    #[serde(default)]
    pub message: Vec<Binding>,
}

/// Response envelope for `new_name`.
#[derive(Clone, Debug, Deserialize)]
pub struct NewNameResponse {
    /// Status message; anything but a success marker is a sync failure
    pub message: String,
    /// Binding echoed by the registry, when available
    #[serde(default)]
    pub data: Option<Binding>,
}

/// Response envelope for `update_name`.
#[derive(Clone, Debug, Deserialize)]
pub struct UpdateNameResponse {
    /// Status message
    pub message: String,
    /// The updated binding
    pub data: Binding,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = HttpRegistryClient::local();
        assert!(client.is_ok());
        assert_eq!(client.unwrap().config().api_url, "http://localhost:3000");
    }

    #[test]
    fn test_url_building() {
        let client = HttpRegistryClient::new(RegistryConfig::new("http://localhost:3000")).unwrap();
        assert_eq!(client.url("resolve_name"), "http://localhost:3000/resolve_name");

        let client =
            HttpRegistryClient::new(RegistryConfig::new("http://localhost:3000/")).unwrap();
        assert_eq!(client.url("get_names"), "http://localhost:3000/get_names");
    }

    #[test]
    fn test_new_name_request_wire_shape() {
        let request = NewNameRequest { tx_id: "0xABC" };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value, serde_json::json!({ "txId": "0xABC" }));
    }

    #[test]
    fn test_update_request_skips_absent_fields() {
        let request = UpdateNameRequest {
            meta_id: "abc-123",
            address: "nillion1owner",
            twitter_link: Some("https://x.com/bob"),
            gmail: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["metaId"], "abc-123");
        assert_eq!(value["twitter_link"], "https://x.com/bob");
        assert!(value.get("gmail").is_none());
    }

    #[test]
    fn test_resolve_response_parsing() {
        let response: ResolveNameResponse = serde_json::from_str(
            r#"{"message":"Success","address":"nillion1bob","name":"bob.nil"}"#,
        )
        .unwrap();
        assert_eq!(response.address.unwrap().as_str(), "nillion1bob");
        assert!(is_success_message(&response.message));
    }

    #[test]
    fn test_success_marker() {
        assert!(is_success_message("Success"));
        assert!(is_success_message("Success!"));
        assert!(!is_success_message("Error validating transaction"));
    }
}

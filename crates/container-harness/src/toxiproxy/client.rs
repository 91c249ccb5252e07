// crates/container-harness/src/toxiproxy/client.rs
// ============================================================================
// Module: Toxiproxy Control Client
// Description: Async HTTP client for the fault-injection control API.
// Purpose: Create proxies and inject toxics between a client and its backend.
// Dependencies: reqwest, serde
// ============================================================================

//! ## Overview
//! Thin typed wrapper over the proxy server's REST control plane. Every call
//! maps non-2xx responses to [`HarnessError::ControlApi`] with the status and
//! body so tests see the server's own explanation.

use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::Client;
use reqwest::RequestBuilder;
use reqwest::Response;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use tracing::debug;

use super::types::ProxyConfig;
use super::types::ProxyState;
use super::types::Toxic;
use crate::error::HarnessError;

/// Body of `GET /version`.
#[derive(Debug, Deserialize)]
struct ServerVersion {
    /// Release string, for example `2.9.0`.
    version: String,
}

/// Control-plane client bound to one proxy server.
#[derive(Debug, Clone)]
pub struct ToxiproxyClient {
    /// Base URL of the control API, without a trailing slash.
    base_url: String,
    /// Shared HTTP client.
    http: Client,
}

impl ToxiproxyClient {
    /// Creates a client for `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HarnessError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| HarnessError::Client(format!("failed to build http client: {err}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Returns the control API base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the server version string from the `{"version": ..}` body.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails, the server answers non-2xx,
    /// or the body is not a version object.
    pub async fn version(&self) -> Result<String, HarnessError> {
        let response = send(self.http.get(self.url("/version"))).await?;
        let body: ServerVersion = json_body(response).await?;
        Ok(body.version)
    }

    /// Creates a proxy.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the proxy already exists.
    pub async fn create_proxy(&self, proxy: &ProxyConfig) -> Result<ProxyState, HarnessError> {
        debug!(proxy = %proxy.name, listen = %proxy.listen, upstream = %proxy.upstream, "create proxy");
        json_body(send(self.http.post(self.url("/proxies")).json(proxy)).await?).await
    }

    /// Fetches one proxy with its toxics.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the proxy does not exist.
    pub async fn proxy(&self, name: &str) -> Result<ProxyState, HarnessError> {
        json_body(send(self.http.get(self.url(&format!("/proxies/{name}")))).await?).await
    }

    /// Lists every proxy keyed by name.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails.
    pub async fn proxies(&self) -> Result<BTreeMap<String, ProxyState>, HarnessError> {
        json_body(send(self.http.get(self.url("/proxies"))).await?).await
    }

    /// Enables or disables a proxy. Disabling drops live connections.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the proxy does not exist.
    pub async fn set_enabled(&self, name: &str, enabled: bool) -> Result<ProxyState, HarnessError> {
        debug!(proxy = %name, enabled, "update proxy");
        let request =
            self.http.post(self.url(&format!("/proxies/{name}"))).json(&json!({ "enabled": enabled }));
        json_body(send(request).await?).await
    }

    /// Deletes a proxy.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the proxy does not exist.
    pub async fn delete_proxy(&self, name: &str) -> Result<(), HarnessError> {
        send(self.http.delete(self.url(&format!("/proxies/{name}")))).await?;
        Ok(())
    }

    /// Attaches a toxic to a proxy.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] for an invalid toxic, or an error when
    /// the request fails or the server rejects it.
    pub async fn add_toxic(&self, proxy: &str, toxic: &Toxic) -> Result<Toxic, HarnessError> {
        toxic.validate().map_err(HarnessError::Config)?;
        debug!(proxy, toxic = %toxic.name, "add toxic");
        let request = self.http.post(self.url(&format!("/proxies/{proxy}/toxics"))).json(toxic);
        json_body(send(request).await?).await
    }

    /// Lists the toxics attached to a proxy.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the proxy does not exist.
    pub async fn toxics(&self, proxy: &str) -> Result<Vec<Toxic>, HarnessError> {
        json_body(send(self.http.get(self.url(&format!("/proxies/{proxy}/toxics")))).await?).await
    }

    /// Removes one toxic from a proxy.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails or the toxic does not exist.
    pub async fn remove_toxic(&self, proxy: &str, toxic: &str) -> Result<(), HarnessError> {
        debug!(proxy, toxic, "remove toxic");
        send(self.http.delete(self.url(&format!("/proxies/{proxy}/toxics/{toxic}")))).await?;
        Ok(())
    }

    /// Re-enables every proxy and removes every toxic.
    ///
    /// # Errors
    ///
    /// Returns an error when the request fails.
    pub async fn reset(&self) -> Result<(), HarnessError> {
        send(self.http.post(self.url("/reset"))).await?;
        Ok(())
    }

    /// Joins a path onto the base URL.
    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }
}

/// Maps a transport failure into a harness error.
fn transport(err: reqwest::Error) -> HarnessError {
    HarnessError::Client(format!("toxiproxy request failed: {err}"))
}

/// Sends a request and converts non-2xx responses into errors.
async fn send(request: RequestBuilder) -> Result<Response, HarnessError> {
    let response = request.send().await.map_err(transport)?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(HarnessError::ControlApi {
        status: status.as_u16(),
        body,
    })
}

/// Decodes a JSON response body.
async fn json_body<T: DeserializeOwned>(response: Response) -> Result<T, HarnessError> {
    response.json().await.map_err(transport)
}

// crates/container-harness/src/toxiproxy/fixture.rs
// ============================================================================
// Module: Toxiproxy Fixture
// Description: Fault-injection proxy container on a private network.
// Purpose: Expose the control API and one proxy listener to the test process.
// Dependencies: testcontainers, reqwest
// ============================================================================

//! ## Overview
//! [`ToxiproxyFixture`] publishes the control port and one reserved proxy port.
//! A proxy created with [`ToxiproxyFixture::listen_address`] is reachable from
//! the test process at `host():proxy_port()`.

use std::time::Duration;

use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::IntoContainerPort;
use testcontainers::runners::AsyncRunner;
use tracing::info;

use super::client::ToxiproxyClient;
use crate::config::HarnessConfig;
use crate::docker::ScopedNetwork;
use crate::docker::http_endpoint;
use crate::docker::unique_name;
use crate::error::HarnessError;
use crate::readiness::wait_for_http_ok;

/// Service label used in errors and logs.
const SERVICE: &str = "toxiproxy";
/// Control API port.
pub const CONTROL_PORT: u16 = 8474;
/// Port reserved for one proxy listener.
pub const PROXY_PORT: u16 = 8666;
/// Per-request timeout for control calls.
const CONTROL_TIMEOUT: Duration = Duration::from_secs(10);

/// Running proxy server with a control client.
pub struct ToxiproxyFixture {
    /// Host the mapped ports are published on.
    host: String,
    /// Host-mapped port of [`PROXY_PORT`].
    proxy_port: u16,
    /// Control-plane client.
    client: ToxiproxyClient,
    /// Container handle; dropping it removes the container.
    container: ContainerAsync<GenericImage>,
}

impl ToxiproxyFixture {
    /// Starts the proxy server attached to `network` and waits for its
    /// control API.
    ///
    /// # Errors
    ///
    /// Returns an error when the container fails to start, the ports cannot
    /// be resolved, or the control API never answers.
    pub async fn start(
        config: &HarnessConfig,
        network: &ScopedNetwork,
    ) -> Result<Self, HarnessError> {
        let image = &config.toxiproxy_image;
        let container = GenericImage::new(image.name.as_str(), image.tag.as_str())
            .with_exposed_port(CONTROL_PORT.tcp())
            .with_exposed_port(PROXY_PORT.tcp())
            .with_network(network.name())
            .with_container_name(unique_name(SERVICE))
            .with_startup_timeout(config.startup_timeout)
            .start()
            .await
            .map_err(|err| HarnessError::start(SERVICE, err))?;
        let host =
            container.get_host().await.map_err(|err| HarnessError::port(SERVICE, err))?.to_string();
        let control_port = container
            .get_host_port_ipv4(CONTROL_PORT.tcp())
            .await
            .map_err(|err| HarnessError::port(SERVICE, err))?;
        let proxy_port = container
            .get_host_port_ipv4(PROXY_PORT.tcp())
            .await
            .map_err(|err| HarnessError::port(SERVICE, err))?;

        let client = ToxiproxyClient::new(&http_endpoint(&host, control_port), CONTROL_TIMEOUT)?;
        let probe = reqwest::Client::builder()
            .timeout(CONTROL_TIMEOUT)
            .build()
            .map_err(|err| HarnessError::Client(err.to_string()))?;
        wait_for_http_ok(&probe, &format!("{}/version", client.base_url()), config.startup_timeout)
            .await?;
        info!(control = %client.base_url(), proxy_port, image = %image, "fault-injection proxy ready");
        Ok(Self {
            host,
            proxy_port,
            client,
            container,
        })
    }

    /// Returns the control-plane client.
    #[must_use]
    pub const fn client(&self) -> &ToxiproxyClient {
        &self.client
    }

    /// Returns the host the proxy listener is published on.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    /// Returns the host-mapped port of the proxy listener.
    #[must_use]
    pub const fn proxy_port(&self) -> u16 {
        self.proxy_port
    }

    /// Returns the Docker container id.
    #[must_use]
    pub fn container_id(&self) -> &str {
        self.container.id()
    }

    /// Returns the in-container listen address for the reserved port.
    #[must_use]
    pub fn listen_address() -> String {
        format!("0.0.0.0:{PROXY_PORT}")
    }

    /// Removes the proxy container.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Teardown`] when the container cannot be removed.
    pub async fn terminate(self) -> Result<(), HarnessError> {
        self.container
            .rm()
            .await
            .map_err(|err| HarnessError::Teardown(format!("{SERVICE}: {err}")))
    }
}

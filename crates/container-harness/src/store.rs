// crates/container-harness/src/store.rs
// ============================================================================
// Module: Cache Store Fixture
// Description: Redis container reachable by name on a private network.
// Purpose: Provide a backend the fault-injection proxy can forward to.
// Dependencies: testcontainers
// ============================================================================

//! ## Overview
//! [`RedisFixture`] runs the store on a scoped network without publishing its
//! port. Only containers on the same network, such as the fault-injection
//! proxy, reach it through [`RedisFixture::upstream`].

use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::WaitFor;
use testcontainers::runners::AsyncRunner;
use tracing::info;

use crate::config::HarnessConfig;
use crate::docker::ScopedNetwork;
use crate::docker::unique_name;
use crate::error::HarnessError;

/// Service label used in errors and logs.
const SERVICE: &str = "redis";
/// Port the store listens on inside the network.
pub const STORE_PORT: u16 = 6379;

/// Running store, addressable only from its network.
pub struct RedisFixture {
    /// Container name, doubling as the network hostname.
    name: String,
    /// Container handle; dropping it removes the container.
    container: ContainerAsync<GenericImage>,
}

impl RedisFixture {
    /// Starts the store attached to `network` under a unique container name.
    ///
    /// # Errors
    ///
    /// Returns an error when the container fails to start.
    pub async fn start(
        config: &HarnessConfig,
        network: &ScopedNetwork,
    ) -> Result<Self, HarnessError> {
        let image = &config.redis_image;
        let name = unique_name(SERVICE);
        let container = GenericImage::new(image.name.as_str(), image.tag.as_str())
            .with_wait_for(WaitFor::message_on_stdout("Ready to accept connections"))
            .with_network(network.name())
            .with_container_name(name.as_str())
            .with_startup_timeout(config.startup_timeout)
            .start()
            .await
            .map_err(|err| HarnessError::start(SERVICE, err))?;
        info!(store = %name, network = %network.name(), image = %image, "store ready");
        Ok(Self {
            name,
            container,
        })
    }

    /// Returns the container name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the Docker container id.
    #[must_use]
    pub fn container_id(&self) -> &str {
        self.container.id()
    }

    /// Returns `host:port` as resolved from inside the network.
    #[must_use]
    pub fn upstream(&self) -> String {
        upstream_address(&self.name)
    }

    /// Removes the store container.
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

/// Formats the in-network address of a store container.
fn upstream_address(name: &str) -> String {
    format!("{name}:{STORE_PORT}")
}

// crates/container-harness/src/localstack.rs
// ============================================================================
// Module: Storage Emulator Fixture
// Description: LocalStack container with an S3 client factory.
// Purpose: Provide isolated object storage for SDK round-trips.
// Dependencies: testcontainers, aws-config, aws-sdk-s3
// ============================================================================

//! ## Overview
//! [`LocalStackFixture`] runs the emulator, resolves the host-mapped edge port,
//! and builds S3 clients that sign with dummy credentials against that
//! endpoint using path-style addressing.

use aws_config::BehaviorVersion;
use aws_config::Region;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::Credentials;
use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::IntoContainerPort;
use testcontainers::core::WaitFor;
use testcontainers::runners::AsyncRunner;
use tracing::info;

use crate::config::HarnessConfig;
use crate::docker::ensure_docker_available;
use crate::docker::http_endpoint;
use crate::error::HarnessError;

/// Service label used in errors and logs.
const SERVICE: &str = "localstack";
/// Edge port serving every emulated API.
pub const EDGE_PORT: u16 = 4566;
/// Region the emulator is addressed in.
pub const REGION: &str = "us-east-1";
/// Placeholder credential; the emulator accepts any value.
const DUMMY_CREDENTIAL: &str = "noop";

/// Running storage emulator plus its resolved endpoint.
pub struct LocalStackFixture {
    /// Endpoint URL reachable from the test process.
    endpoint: String,
    /// Container handle; dropping it removes the container.
    container: ContainerAsync<GenericImage>,
}

impl LocalStackFixture {
    /// Starts the emulator and resolves its edge endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error when Docker is unavailable, the container fails to
    /// start, or the port mapping cannot be resolved.
    pub async fn start(config: &HarnessConfig) -> Result<Self, HarnessError> {
        ensure_docker_available().await?;
        let image = &config.localstack_image;
        let container = GenericImage::new(image.name.as_str(), image.tag.as_str())
            .with_exposed_port(EDGE_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Ready."))
            .with_env_var("SERVICES", "s3")
            .with_startup_timeout(config.startup_timeout)
            .start()
            .await
            .map_err(|err| HarnessError::start(SERVICE, err))?;
        let host = container.get_host().await.map_err(|err| HarnessError::port(SERVICE, err))?;
        let port = container
            .get_host_port_ipv4(EDGE_PORT.tcp())
            .await
            .map_err(|err| HarnessError::port(SERVICE, err))?;
        let endpoint = http_endpoint(&host.to_string(), port);
        info!(%endpoint, image = %image, "storage emulator ready");
        Ok(Self {
            endpoint,
            container,
        })
    }

    /// Returns the endpoint URL (`http://{host}:{port}`).
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Builds an S3 client bound to the emulator endpoint.
    pub async fn s3_client(&self) -> Client {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(REGION))
            .endpoint_url(self.endpoint.clone())
            .credentials_provider(Credentials::new(
                DUMMY_CREDENTIAL,
                DUMMY_CREDENTIAL,
                Some(DUMMY_CREDENTIAL.to_string()),
                None,
                "container-harness",
            ))
            .load()
            .await;
        let builder = aws_sdk_s3::config::Builder::from(&config).force_path_style(true);
        Client::from_conf(builder.build())
    }

    /// Removes the emulator container.
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

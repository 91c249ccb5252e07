// crates/container-harness/src/vault.rs
// ============================================================================
// Module: Secrets Server Fixture
// Description: Vault dev server with a known root token and init commands.
// Purpose: Provision secrets at startup and hand back an authenticated client.
// Dependencies: testcontainers, vaultrs, reqwest
// ============================================================================

//! ## Overview
//! [`VaultFixture`] runs the secrets server in dev mode (unsealed, in-memory,
//! KV v2 mounted at `secret/`) with a caller-chosen root token. Init commands
//! run through the server CLI inside the container once the HTTP API answers,
//! so secrets exist before the first client call.

use std::time::Duration;

use testcontainers::ContainerAsync;
use testcontainers::GenericImage;
use testcontainers::ImageExt;
use testcontainers::core::CmdWaitFor;
use testcontainers::core::ExecCommand;
use testcontainers::core::IntoContainerPort;
use testcontainers::core::WaitFor;
use testcontainers::runners::AsyncRunner;
use tracing::debug;
use tracing::info;
use vaultrs::client::VaultClient;
use vaultrs::client::VaultClientSettingsBuilder;

use crate::config::HarnessConfig;
use crate::docker::ensure_docker_available;
use crate::docker::http_endpoint;
use crate::error::HarnessError;
use crate::readiness::wait_for_http_ok;

/// Service label used in errors and logs.
const SERVICE: &str = "vault";
/// HTTP API port.
pub const API_PORT: u16 = 8200;
/// Mount path of the KV v2 engine enabled in dev mode.
pub const DEFAULT_KV_MOUNT: &str = "secret";
/// Default client request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Root token used when the builder is not given one.
const DEFAULT_TOKEN: &str = "root";

/// Builder for [`VaultFixture`].
#[derive(Debug, Clone)]
pub struct VaultFixtureBuilder {
    /// Root token the dev server is started with.
    token: String,
    /// CLI commands run after startup, without the leading `vault`.
    init_commands: Vec<String>,
}

impl Default for VaultFixtureBuilder {
    fn default() -> Self {
        Self {
            token: DEFAULT_TOKEN.to_string(),
            init_commands: Vec::new(),
        }
    }
}

impl VaultFixtureBuilder {
    /// Sets the dev-mode root token.
    #[must_use]
    pub fn token(mut self, token: &str) -> Self {
        self.token = token.to_string();
        self
    }

    /// Appends a CLI command, for example `kv put -mount=secret app key=value`.
    #[must_use]
    pub fn init_command(mut self, command: &str) -> Self {
        self.init_commands.push(command.to_string());
        self
    }

    /// Starts the server and runs every init command in order.
    ///
    /// # Errors
    ///
    /// Returns an error when Docker is unavailable, the container fails to
    /// start, the API never becomes healthy, or an init command exits non-zero.
    pub async fn start(self, config: &HarnessConfig) -> Result<VaultFixture, HarnessError> {
        ensure_docker_available().await?;
        let image = &config.vault_image;
        let container = GenericImage::new(image.name.as_str(), image.tag.as_str())
            .with_exposed_port(API_PORT.tcp())
            .with_wait_for(WaitFor::message_on_stdout("Vault server started!"))
            .with_env_var("VAULT_DEV_ROOT_TOKEN_ID", self.token.as_str())
            .with_env_var("VAULT_DEV_LISTEN_ADDRESS", format!("0.0.0.0:{API_PORT}"))
            .with_env_var("VAULT_ADDR", format!("http://127.0.0.1:{API_PORT}"))
            .with_env_var("VAULT_TOKEN", self.token.as_str())
            .with_startup_timeout(config.startup_timeout)
            .start()
            .await
            .map_err(|err| HarnessError::start(SERVICE, err))?;
        let host =
            container.get_host().await.map_err(|err| HarnessError::port(SERVICE, err))?.to_string();
        let port = container
            .get_host_port_ipv4(API_PORT.tcp())
            .await
            .map_err(|err| HarnessError::port(SERVICE, err))?;
        let address = http_endpoint(&host, port);

        let probe = reqwest::Client::builder()
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()
            .map_err(|err| HarnessError::Client(err.to_string()))?;
        wait_for_http_ok(&probe, &format!("{address}/v1/sys/health"), config.startup_timeout)
            .await?;

        for command in &self.init_commands {
            run_init_command(&container, command).await?;
        }
        info!(%address, image = %image, init_commands = self.init_commands.len(), "secrets server ready");
        Ok(VaultFixture {
            address,
            token: self.token,
            container,
        })
    }
}

/// Wraps a CLI command so the container shell handles quoting.
fn shell_command(command: &str) -> [String; 3] {
    ["/bin/sh".to_string(), "-c".to_string(), format!("vault {command}")]
}

/// Runs one CLI command inside the container and checks its exit status.
async fn run_init_command(
    container: &ContainerAsync<GenericImage>,
    command: &str,
) -> Result<(), HarnessError> {
    let failed = |message: String| HarnessError::InitCommand {
        command: command.to_string(),
        message,
    };
    let mut result = container
        .exec(ExecCommand::new(shell_command(command)).with_cmd_ready_condition(CmdWaitFor::exit()))
        .await
        .map_err(|err| failed(err.to_string()))?;
    let exit_code = result.exit_code().await.map_err(|err| failed(err.to_string()))?;
    if exit_code != Some(0) {
        let stderr = result.stderr_to_vec().await.unwrap_or_default();
        let code = exit_code.map_or_else(|| "unknown".to_string(), |code| code.to_string());
        return Err(failed(format!(
            "exit code {code}: {}",
            String::from_utf8_lossy(&stderr).trim()
        )));
    }
    debug!(command, "init command succeeded");
    Ok(())
}

/// Running secrets server with its root token.
pub struct VaultFixture {
    /// HTTP address reachable from the test process.
    address: String,
    /// Root token.
    token: String,
    /// Container handle; dropping it removes the container.
    container: ContainerAsync<GenericImage>,
}

impl VaultFixture {
    /// Returns a builder with the default token and no init commands.
    #[must_use]
    pub fn builder() -> VaultFixtureBuilder {
        VaultFixtureBuilder::default()
    }

    /// Returns the HTTP address (`http://{host}:{port}`).
    #[must_use]
    pub fn http_host_address(&self) -> &str {
        &self.address
    }

    /// Returns the root token.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Builds an authenticated client with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the client settings are rejected.
    pub fn client(&self, request_timeout: Duration) -> Result<VaultClient, HarnessError> {
        let settings = VaultClientSettingsBuilder::default()
            .address(self.address.as_str())
            .token(self.token.as_str())
            .timeout(Some(request_timeout))
            .build()
            .map_err(|err| HarnessError::Client(format!("vault client settings: {err}")))?;
        VaultClient::new(settings).map_err(|err| HarnessError::Client(format!("vault client: {err}")))
    }

    /// Removes the secrets server container.
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

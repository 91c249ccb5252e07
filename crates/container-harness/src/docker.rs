// crates/container-harness/src/docker.rs
// ============================================================================
// Module: Docker Plumbing
// Description: Daemon availability probe and per-test private networks.
// Purpose: Fail fast without Docker and scope networks to one fixture.
// Dependencies: bollard, tokio, uuid, tracing
// ============================================================================

//! ## Overview
//! Containers that must reach each other by name share a user-defined bridge
//! network. [`ScopedNetwork`] owns one such network: `remove` deletes it and
//! reports failures, `Drop` removes it best-effort when a test bails early.
//! Invariants:
//! - Network names carry a uuid suffix and never collide across tests.
//! - Networks are removed after the containers attached to them.

use bollard::Docker;
use bollard::container::InspectContainerOptions;
use bollard::errors::Error as BollardError;
use bollard::network::CreateNetworkOptions;
use bollard::network::InspectNetworkOptions;
use tokio::runtime::Handle;
use tokio::runtime::RuntimeFlavor;
use tracing::debug;
use tracing::warn;
use uuid::Uuid;

use crate::error::HarnessError;

/// Connects to the local Docker daemon.
fn connect() -> Result<Docker, HarnessError> {
    Docker::connect_with_local_defaults()
        .map_err(|err| HarnessError::DockerUnavailable(err.to_string()))
}

/// Verifies the Docker daemon answers a ping.
///
/// # Errors
///
/// Returns [`HarnessError::DockerUnavailable`] when the daemon is unreachable.
pub async fn ensure_docker_available() -> Result<(), HarnessError> {
    let docker = connect()?;
    docker.ping().await.map_err(|err| HarnessError::DockerUnavailable(err.to_string()))?;
    Ok(())
}

/// Formats a plain-HTTP endpoint for a host-mapped port.
pub(crate) fn http_endpoint(host: &str, port: u16) -> String {
    format!("http://{host}:{port}")
}

/// Builds a unique name from a prefix.
pub(crate) fn unique_name(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4().simple())
}

/// User-defined bridge network removed when the owner is done with it.
pub struct ScopedNetwork {
    /// Docker client used for removal.
    docker: Docker,
    /// Network name, unique per instance.
    name: String,
    /// Set once the network has been removed explicitly.
    removed: bool,
}

impl ScopedNetwork {
    /// Creates a bridge network named `{prefix}-{uuid}`.
    ///
    /// # Errors
    ///
    /// Returns an error when Docker is unreachable or rejects the network.
    pub async fn create(prefix: &str) -> Result<Self, HarnessError> {
        let docker = connect()?;
        let name = unique_name(prefix);
        docker
            .create_network(CreateNetworkOptions {
                name: name.as_str(),
                check_duplicate: true,
                driver: "bridge",
                ..Default::default()
            })
            .await
            .map_err(|err| HarnessError::Network(format!("create {name}: {err}")))?;
        debug!(network = %name, "created network");
        Ok(Self {
            docker,
            name,
            removed: false,
        })
    }

    /// Returns the network name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Removes the network. Attached containers must already be gone.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Teardown`] when Docker refuses the removal.
    pub async fn remove(mut self) -> Result<(), HarnessError> {
        self.removed = true;
        self.docker
            .remove_network(&self.name)
            .await
            .map_err(|err| HarnessError::Teardown(format!("remove network {}: {err}", self.name)))?;
        debug!(network = %self.name, "removed network");
        Ok(())
    }
}

impl Drop for ScopedNetwork {
    fn drop(&mut self) {
        if self.removed {
            return;
        }
        let name = std::mem::take(&mut self.name);
        match Handle::try_current() {
            Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
                let docker = self.docker.clone();
                tokio::task::block_in_place(|| {
                    handle.block_on(remove_network_best_effort(docker, name));
                });
            }
            _ => {
                // Current-thread runtimes cannot block in place.
                let removal = std::thread::spawn(move || remove_on_fresh_runtime(name));
                if removal.join().is_err() {
                    warn!("network removal thread panicked");
                }
            }
        }
    }
}

/// Removes a network, logging instead of returning failures.
async fn remove_network_best_effort(docker: Docker, name: String) {
    match docker.remove_network(&name).await {
        Ok(()) => debug!(network = %name, "removed network on drop"),
        Err(err) => warn!(network = %name, error = %err, "best-effort network removal failed"),
    }
}

/// Removes a network from a dedicated current-thread runtime.
fn remove_on_fresh_runtime(name: String) {
    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(err) => {
            warn!(network = %name, error = %err, "no runtime for network removal");
            return;
        }
    };
    runtime.block_on(async move {
        match connect() {
            Ok(docker) => remove_network_best_effort(docker, name).await,
            Err(err) => warn!(network = %name, error = %err, "network left behind"),
        }
    });
}

/// Returns true when Docker still knows a network by this name.
///
/// # Errors
///
/// Returns [`HarnessError::DockerUnavailable`] when the daemon is unreachable
/// and [`HarnessError::Client`] for any answer other than found or not found.
pub async fn network_exists(name: &str) -> Result<bool, HarnessError> {
    let docker = connect()?;
    let inspected = docker.inspect_network(name, None::<InspectNetworkOptions<String>>).await;
    found_or_missing(inspected.map(|_| ()), "network", name)
}

/// Returns true when Docker still knows a container by this id.
///
/// # Errors
///
/// Returns [`HarnessError::DockerUnavailable`] when the daemon is unreachable
/// and [`HarnessError::Client`] for any answer other than found or not found.
pub async fn container_exists(id: &str) -> Result<bool, HarnessError> {
    let docker = connect()?;
    let inspected = docker.inspect_container(id, None::<InspectContainerOptions>).await;
    found_or_missing(inspected.map(|_| ()), "container", id)
}

/// Maps an inspect result to presence, treating 404 as absent.
fn found_or_missing(
    inspected: Result<(), BollardError>,
    kind: &str,
    name: &str,
) -> Result<bool, HarnessError> {
    match inspected {
        Ok(()) => Ok(true),
        Err(BollardError::DockerResponseServerError {
            status_code: 404,
            ..
        }) => Ok(false),
        Err(err) => Err(HarnessError::Client(format!("inspect {kind} {name}: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use bollard::errors::Error as BollardError;

    use super::found_or_missing;
    use super::http_endpoint;
    use super::unique_name;
    use crate::error::HarnessError;

    fn server_error(status_code: u16) -> BollardError {
        BollardError::DockerResponseServerError {
            status_code,
            message: "daemon says no".to_string(),
        }
    }

    #[test]
    fn inspect_not_found_means_removed() {
        assert!(matches!(found_or_missing(Ok(()), "network", "chaos-1"), Ok(true)));
        assert!(matches!(found_or_missing(Err(server_error(404)), "network", "chaos-1"), Ok(false)));
    }

    #[test]
    fn other_inspect_failures_are_errors() {
        let result = found_or_missing(Err(server_error(500)), "container", "abc");
        assert!(matches!(result, Err(HarnessError::Client(message)) if message.contains("abc")));
    }

    #[test]
    fn endpoint_uses_plain_http_and_mapped_port() {
        assert_eq!(http_endpoint("localhost", 49153), "http://localhost:49153");
    }

    #[test]
    fn unique_names_keep_prefix_and_differ() {
        let first = unique_name("chaos");
        let second = unique_name("chaos");
        assert!(first.starts_with("chaos-"));
        assert_ne!(first, second);
    }
}

// crates/container-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Error taxonomy for fixture setup, client wiring, and teardown.
// Purpose: Let tests distinguish setup failures from teardown failures.
// Dependencies: thiserror
// ============================================================================

//! ## Overview
//! Every fixture operation returns [`HarnessError`]. Variants carry rendered
//! messages from the underlying crates so errors stay `Send + Sync` and cheap
//! to box into test results.

use thiserror::Error;

/// Errors raised while provisioning, wiring, or tearing down fixtures.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Docker daemon could not be reached.
    #[error("docker unavailable: {0}")]
    DockerUnavailable(String),
    /// Private network creation failed.
    #[error("network setup failed: {0}")]
    Network(String),
    /// A container failed to start.
    #[error("failed to start {service} container: {message}")]
    ContainerStart {
        /// Service label (for example `localstack`).
        service: &'static str,
        /// Underlying failure message.
        message: String,
    },
    /// Host or port mapping could not be resolved.
    #[error("failed to resolve {service} port mapping: {message}")]
    PortMapping {
        /// Service label.
        service: &'static str,
        /// Underlying failure message.
        message: String,
    },
    /// Service did not become ready in time.
    #[error("{0}")]
    Readiness(String),
    /// A post-start init command failed.
    #[error("init command `{command}` failed: {message}")]
    InitCommand {
        /// Command as passed to the service CLI.
        command: String,
        /// Exit status or exec failure message.
        message: String,
    },
    /// A client could not be configured or a client call failed.
    #[error("client error: {0}")]
    Client(String),
    /// Fault-injection control API returned a non-success status.
    #[error("control api returned {status}: {body}")]
    ControlApi {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },
    /// Container or network removal failed.
    #[error("teardown failed: {0}")]
    Teardown(String),
    /// Harness configuration is invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl HarnessError {
    /// Returns true when the failure stems from an unreachable Docker daemon.
    #[must_use]
    pub const fn is_docker_unavailable(&self) -> bool {
        matches!(self, Self::DockerUnavailable(_))
    }

    /// Builds a [`HarnessError::ContainerStart`] from any displayable error.
    pub(crate) fn start(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::ContainerStart {
            service,
            message: err.to_string(),
        }
    }

    /// Builds a [`HarnessError::PortMapping`] from any displayable error.
    pub(crate) fn port(service: &'static str, err: impl std::fmt::Display) -> Self {
        Self::PortMapping {
            service,
            message: err.to_string(),
        }
    }
}

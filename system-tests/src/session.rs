// system-tests/src/session.rs
// ============================================================================
// Module: Test Session
// Description: Per-test configuration, reporter, and skip policy.
// Purpose: Keep container scenarios focused on setup → exercise → teardown.
// Dependencies: container-harness, thiserror
// ============================================================================

//! ## Overview
//! [`TestSession::begin`] is the first call in every container scenario.
//! Fixture start results pass through [`TestSession::provision`]: success
//! yields the fixture, an unreachable Docker daemon yields
//! [`Provisioned::Skipped`] when the configuration allows it, and every other
//! failure is fatal.

use std::io;

use container_harness::HarnessConfig;
use container_harness::HarnessError;
use container_harness::TestReporter;
use container_harness::init_tracing;
use thiserror::Error;
use tracing::warn;

/// Errors surfaced by a test session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Harness configuration could not be loaded.
    #[error("harness configuration: {0}")]
    Config(String),
    /// Summary artifacts could not be written.
    #[error("test artifacts: {0}")]
    Artifacts(#[from] io::Error),
    /// A fixture failed to start.
    #[error("setup failed: {0}")]
    Setup(#[from] HarnessError),
}

/// Outcome of provisioning a fixture.
#[derive(Debug)]
pub enum Provisioned<T> {
    /// Fixture is running.
    Ready(T),
    /// Docker is unreachable and the session recorded a skip.
    Skipped,
}

/// Configuration and reporter scoped to one test.
pub struct TestSession {
    /// Harness configuration.
    config: HarnessConfig,
    /// Summary reporter.
    reporter: TestReporter,
}

impl TestSession {
    /// Installs tracing, loads configuration from the environment, and opens
    /// the reporter for `test_name`.
    ///
    /// # Errors
    ///
    /// Returns an error when configuration is invalid or the artifact root
    /// cannot be created.
    pub fn begin(test_name: &str) -> Result<Self, SessionError> {
        init_tracing();
        let config = HarnessConfig::load().map_err(SessionError::Config)?;
        Self::with_config(config, test_name)
    }

    /// Opens a session with an explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the artifact root cannot be created.
    pub fn with_config(config: HarnessConfig, test_name: &str) -> Result<Self, SessionError> {
        let reporter = TestReporter::new(&config, test_name)?;
        Ok(Self {
            config,
            reporter,
        })
    }

    /// Returns the harness configuration.
    #[must_use]
    pub const fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Returns the reporter.
    #[must_use]
    pub const fn reporter(&self) -> &TestReporter {
        &self.reporter
    }

    /// Applies the skip policy to a fixture start result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Setup`] for any failure that is not a tolerated
    /// Docker outage.
    pub fn provision<T>(
        &mut self,
        started: Result<T, HarnessError>,
    ) -> Result<Provisioned<T>, SessionError> {
        match started {
            Ok(fixture) => Ok(Provisioned::Ready(fixture)),
            Err(err) if err.is_docker_unavailable() && self.config.skip_without_docker => {
                warn!(error = %err, "docker unavailable; skipping");
                self.reporter.finish("skip", vec![format!("fixture unavailable: {err}")])?;
                Ok(Provisioned::Skipped)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Records a passing summary.
    ///
    /// # Errors
    ///
    /// Returns an error when the summary cannot be written.
    pub fn pass(mut self, notes: Vec<String>) -> Result<(), SessionError> {
        self.reporter.finish("pass", notes)?;
        Ok(())
    }
}

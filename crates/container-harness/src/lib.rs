// crates/container-harness/src/lib.rs
// ============================================================================
// Module: Container Harness Library
// Description: Ephemeral dependency containers wired to typed clients.
// Purpose: Start a service container, hand back a configured client, tear down.
// Dependencies: testcontainers, bollard, aws-sdk-s3, redis, vaultrs, reqwest
// ============================================================================

//! ## Overview
//! Container Harness owns the setup → exercise → teardown shape shared by the
//! system-tests: each fixture starts one or more containers, resolves their
//! host-mapped endpoints, and builds a client bound to them.
//! Invariants:
//! - A fixture owns its containers; dropping it removes them.
//! - `terminate` surfaces teardown failures; `Drop` is the unconditional fallback.
//! - Network and container names are unique per fixture.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod artifacts;
pub mod chaos;
pub mod config;
pub mod docker;
pub mod error;
pub mod localstack;
pub mod readiness;
pub mod store;
pub mod telemetry;
pub mod toxiproxy;
pub mod vault;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use artifacts::TestArtifacts;
pub use artifacts::TestReporter;
pub use chaos::ProxiedRedisFixture;
pub use config::HarnessConfig;
pub use config::HarnessEnv;
pub use config::ImageRef;
pub use docker::ScopedNetwork;
pub use docker::ensure_docker_available;
pub use error::HarnessError;
pub use localstack::LocalStackFixture;
pub use store::RedisFixture;
pub use telemetry::init_tracing;
pub use toxiproxy::ProxyConfig;
pub use toxiproxy::StreamDirection;
pub use toxiproxy::Toxic;
pub use toxiproxy::ToxicKind;
pub use toxiproxy::ToxiproxyClient;
pub use toxiproxy::ToxiproxyFixture;
pub use vault::VaultFixture;
pub use vault::VaultFixtureBuilder;

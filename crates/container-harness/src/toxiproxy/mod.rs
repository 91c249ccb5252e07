// crates/container-harness/src/toxiproxy/mod.rs
// ============================================================================
// Module: Fault Injection
// Description: Toxiproxy container fixture and control-plane client.
// Purpose: Inject latency and connection faults between a client and backend.
// Dependencies: testcontainers, reqwest, serde
// ============================================================================

//! ## Overview
//! The proxy server runs in a container on a private network, forwarding a
//! host-published listener to a backend reachable only by network alias.
//! Toxics are attached over the control API while traffic is flowing.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod client;
mod fixture;
mod types;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::ToxiproxyClient;
pub use fixture::CONTROL_PORT;
pub use fixture::PROXY_PORT;
pub use fixture::ToxiproxyFixture;
pub use types::ProxyConfig;
pub use types::ProxyState;
pub use types::StreamDirection;
pub use types::Toxic;
pub use types::ToxicKind;

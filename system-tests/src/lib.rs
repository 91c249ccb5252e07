// system-tests/src/lib.rs
// ============================================================================
// Module: Container System Tests Library
// Description: Shared session handling for container-backed test scenarios.
// Purpose: Provide common setup, skip policy, and summaries for test binaries.
// Dependencies: container-harness
// ============================================================================

//! ## Overview
//! This crate hosts the session helper used by the container scenarios in
//! `system-tests/tests`. A session loads the harness configuration, installs
//! tracing, owns the per-test reporter, and decides whether a missing Docker
//! daemon fails the test or records a skip.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod session;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use session::Provisioned;
pub use session::SessionError;
pub use session::TestSession;

// crates/container-harness/src/config/mod.rs
// ============================================================================
// Module: Harness Configuration
// Description: Centralized configuration for ephemeral container fixtures.
// Purpose: Provide typed access to image overrides, timeouts, and run policy.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Harness configuration is read from environment variables and mapped into a
//! small typed structure shared by every fixture. Unset variables fall back to
//! pinned image tags and conservative timeouts.

// ============================================================================
// SECTION: Modules
// ============================================================================

mod env;
mod image;

// ============================================================================
// SECTION: Tests
// ============================================================================


// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use env::HarnessConfig;
pub use env::HarnessEnv;
pub use image::ImageRef;

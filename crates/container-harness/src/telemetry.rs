// crates/container-harness/src/telemetry.rs
// ============================================================================
// Module: Telemetry
// Description: Test-friendly tracing subscriber setup.
// Purpose: Route fixture lifecycle events through the test output capture.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Fixtures log lifecycle events through `tracing`. [`init_tracing`] installs
//! the subscriber that routes them into libtest's captured output, filtered
//! by `RUST_LOG`.

use tracing_subscriber::EnvFilter;

/// Filter applied when `RUST_LOG` is unset or invalid.
const DEFAULT_FILTER: &str = "info";

/// Installs a fmt subscriber filtered by `RUST_LOG`. Later calls are no-ops.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_test_writer().try_init();
}

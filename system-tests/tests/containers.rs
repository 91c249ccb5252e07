// system-tests/tests/containers.rs
// ============================================================================
// Module: Container Suite
// Description: Aggregates container-backed integration scenarios.
// Purpose: Run storage, fault-injection, secrets, and teardown tests in one binary.
// Dependencies: suites/*, system-tests, container-harness
// ============================================================================

//! Container suite entry point for system-tests.

#[path = "suites/fault_injection.rs"]
mod fault_injection;
#[path = "suites/object_store.rs"]
mod object_store;
#[path = "suites/secrets.rs"]
mod secrets;
#[path = "suites/teardown.rs"]
mod teardown;

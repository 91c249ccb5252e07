// crates/container-harness/src/config/env.rs
// ============================================================================
// Module: Harness Environment
// Description: Environment-backed configuration for container fixtures.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use super::image::ImageRef;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Default container startup timeout.
const DEFAULT_STARTUP_TIMEOUT: Duration = Duration::from_secs(120);

/// Environment keys for harness configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HarnessEnv {
    /// Optional artifact root override.
    RunRoot,
    /// Optional startup timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Skip container tests when Docker is unreachable (`true`/`false` or `1`/`0`).
    SkipWithoutDocker,
    /// Storage emulator image override (`name:tag`).
    LocalStackImage,
    /// Cache/store image override (`name:tag`).
    RedisImage,
    /// Fault-injection proxy image override (`name:tag`).
    ToxiproxyImage,
    /// Secrets server image override (`name:tag`).
    VaultImage,
}

impl HarnessEnv {
    /// Every recognized key, in declaration order.
    pub const ALL: [Self; 7] = [
        Self::RunRoot,
        Self::TimeoutSeconds,
        Self::SkipWithoutDocker,
        Self::LocalStackImage,
        Self::RedisImage,
        Self::ToxiproxyImage,
        Self::VaultImage,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RunRoot => "CONTAINER_HARNESS_RUN_ROOT",
            Self::TimeoutSeconds => "CONTAINER_HARNESS_TIMEOUT_SEC",
            Self::SkipWithoutDocker => "CONTAINER_HARNESS_SKIP_WITHOUT_DOCKER",
            Self::LocalStackImage => "CONTAINER_HARNESS_LOCALSTACK_IMAGE",
            Self::RedisImage => "CONTAINER_HARNESS_REDIS_IMAGE",
            Self::ToxiproxyImage => "CONTAINER_HARNESS_TOXIPROXY_IMAGE",
            Self::VaultImage => "CONTAINER_HARNESS_VAULT_IMAGE",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed harness configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Container startup timeout.
    pub startup_timeout: Duration,
    /// Record a skip instead of failing when Docker is unreachable.
    pub skip_without_docker: bool,
    /// Storage emulator image.
    pub localstack_image: ImageRef,
    /// Cache/store image.
    pub redis_image: ImageRef,
    /// Fault-injection proxy image.
    pub toxiproxy_image: ImageRef,
    /// Secrets server image.
    pub vault_image: ImageRef,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            run_root: None,
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
            skip_without_docker: false,
            localstack_image: ImageRef::new("localstack/localstack", "3.2.0"),
            redis_image: ImageRef::new("redis", "7.2"),
            toxiproxy_image: ImageRef::new("ghcr.io/shopify/toxiproxy", "2.9.0"),
            vault_image: ImageRef::new("hashicorp/vault", "1.15"),
        }
    }
}

impl HarnessConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or image reference).
    pub fn load() -> Result<Self, String> {
        let defaults = Self::default();
        let run_root = read_env_nonempty(HarnessEnv::RunRoot.as_str())?.map(PathBuf::from);
        let startup_timeout = read_env_nonempty(HarnessEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(HarnessEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.startup_timeout);
        let skip_without_docker = parse_bool_env(
            HarnessEnv::SkipWithoutDocker.as_str(),
            read_env_nonempty(HarnessEnv::SkipWithoutDocker.as_str())?,
        )?;
        Ok(Self {
            run_root,
            startup_timeout,
            skip_without_docker,
            localstack_image: read_image(HarnessEnv::LocalStackImage, defaults.localstack_image)?,
            redis_image: read_image(HarnessEnv::RedisImage, defaults.redis_image)?,
            toxiproxy_image: read_image(HarnessEnv::ToxiproxyImage, defaults.toxiproxy_image)?,
            vault_image: read_image(HarnessEnv::VaultImage, defaults.vault_image)?,
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value)),
        None => Ok(None),
    }
}

/// Reads an image override, falling back to the pinned default.
///
/// # Errors
///
/// Returns an error when the override is empty or not `name:tag`.
fn read_image(key: HarnessEnv, default: ImageRef) -> Result<ImageRef, String> {
    match read_env_nonempty(key.as_str())? {
        Some(raw) => ImageRef::parse(&raw).map_err(|err| format!("{}: {err}", key.as_str())),
        None => Ok(default),
    }
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is missing, non-numeric, or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(format!("{name} must be a positive integer number of seconds"));
    }
    let secs: u64 = trimmed
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of seconds"))?;
    if secs == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(Duration::from_secs(secs))
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}

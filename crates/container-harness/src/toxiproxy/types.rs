// crates/container-harness/src/toxiproxy/types.rs
// ============================================================================
// Module: Toxiproxy Control Types
// Description: Proxy and toxic payloads of the fault-injection control API.
// Purpose: Keep request/response bodies typed instead of ad-hoc JSON.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Wire types for the control API. Field names match the server's JSON, with
//! the toxic kind serialized as `type`.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Proxy definition as accepted and returned by `/proxies`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyConfig {
    /// Proxy name, unique within one proxy server.
    pub name: String,
    /// Listen address inside the proxy container.
    pub listen: String,
    /// Upstream address as resolved from the proxy container.
    pub upstream: String,
    /// Whether the proxy accepts connections.
    #[serde(default = "enabled_default")]
    pub enabled: bool,
}

/// Serde default for [`ProxyConfig::enabled`].
const fn enabled_default() -> bool {
    true
}

impl ProxyConfig {
    /// Builds an enabled proxy definition.
    #[must_use]
    pub fn new(name: &str, listen: &str, upstream: &str) -> Self {
        Self {
            name: name.to_string(),
            listen: listen.to_string(),
            upstream: upstream.to_string(),
            enabled: true,
        }
    }
}

/// Proxy state reported by the server, including active toxics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProxyState {
    /// Proxy definition.
    #[serde(flatten)]
    pub config: ProxyConfig,
    /// Toxics currently attached.
    #[serde(default)]
    pub toxics: Vec<Toxic>,
}

/// Direction of traffic a toxic applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamDirection {
    /// Client to upstream.
    Upstream,
    /// Upstream to client.
    Downstream,
}

/// Fault-injection rule types understood by the proxy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToxicKind {
    /// Delay every chunk by `latency` ± `jitter` milliseconds.
    Latency,
    /// Cap throughput at `rate` KB/s.
    Bandwidth,
    /// Delay socket close by `delay` milliseconds.
    SlowClose,
    /// Stop traffic and close after `timeout` milliseconds (0 = never).
    Timeout,
    /// Reset the connection after `timeout` milliseconds.
    ResetPeer,
    /// Slice data into `average_size` byte chunks.
    Slicer,
    /// Close the connection after `bytes` bytes.
    LimitData,
}

/// Toxic attached to a proxy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toxic {
    /// Toxic name, unique within its proxy.
    pub name: String,
    /// Rule type.
    #[serde(rename = "type")]
    pub kind: ToxicKind,
    /// Affected direction.
    pub stream: StreamDirection,
    /// Probability in `[0.0, 1.0]` that a connection is affected.
    pub toxicity: f32,
    /// Integer attributes specific to the rule type.
    #[serde(default)]
    pub attributes: BTreeMap<String, i64>,
}

impl Toxic {
    /// Builds a toxic that always applies, with no attributes yet.
    #[must_use]
    pub fn new(name: &str, kind: ToxicKind, stream: StreamDirection) -> Self {
        Self {
            name: name.to_string(),
            kind,
            stream,
            toxicity: 1.0,
            attributes: BTreeMap::new(),
        }
    }

    /// Builds a latency toxic with the given base latency and jitter.
    #[must_use]
    pub fn latency(name: &str, stream: StreamDirection, latency_ms: i64, jitter_ms: i64) -> Self {
        Self::new(name, ToxicKind::Latency, stream)
            .with_attribute("latency", latency_ms)
            .with_attribute("jitter", jitter_ms)
    }

    /// Builds a timeout toxic; `0` holds connections open indefinitely.
    #[must_use]
    pub fn timeout(name: &str, stream: StreamDirection, timeout_ms: i64) -> Self {
        Self::new(name, ToxicKind::Timeout, stream).with_attribute("timeout", timeout_ms)
    }

    /// Sets one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: &str, value: i64) -> Self {
        self.attributes.insert(key.to_string(), value);
        self
    }

    /// Sets the probability that a connection is affected.
    #[must_use]
    pub const fn with_toxicity(mut self, toxicity: f32) -> Self {
        self.toxicity = toxicity;
        self
    }

    /// Checks the toxicity lies in `[0.0, 1.0]` and the name is present.
    ///
    /// # Errors
    ///
    /// Returns a description of the first violated constraint.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("toxic name must not be empty".to_string());
        }
        if !(0.0 ..= 1.0).contains(&self.toxicity) {
            return Err(format!(
                "toxic {} toxicity {} outside [0.0, 1.0]",
                self.name, self.toxicity
            ));
        }
        Ok(())
    }
}

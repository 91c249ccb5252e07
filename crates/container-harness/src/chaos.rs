// crates/container-harness/src/chaos.rs
// ============================================================================
// Module: Proxied Store Fixture
// Description: Redis reached through Toxiproxy over a private network.
// Purpose: Let tests inject faults between a store client and its backend.
// Dependencies: redis, testcontainers, bollard, tokio
// ============================================================================

//! ## Overview
//! [`ProxiedRedisFixture`] wires the full chain used by fault-injection tests:
//! a scoped network, the proxy server, the store (reachable only by name on
//! that network), a proxy forwarding the published listener to the store, and
//! a store client connected through the listener.
//! Invariants:
//! - The client never talks to the store directly; every byte crosses the proxy.
//! - Teardown removes containers before the network they are attached to.

use std::time::Duration;

use redis::AsyncCommands;
use redis::RedisResult;
use redis::aio::MultiplexedConnection;
use tokio::time::timeout;
use tracing::info;
use tracing::warn;

use crate::config::HarnessConfig;
use crate::docker::ScopedNetwork;
use crate::docker::ensure_docker_available;
use crate::error::HarnessError;
use crate::store::RedisFixture;
use crate::toxiproxy::ProxyConfig;
use crate::toxiproxy::ToxiproxyClient;
use crate::toxiproxy::ToxiproxyFixture;

/// Name of the proxy fronting the store.
pub const PROXY_NAME: &str = "redis";
/// Read timeout applied to store reads.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(2);
/// Bound on connecting through the proxy.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Store client routed through a fault-injection proxy.
pub struct ProxiedRedisFixture {
    /// Client connection through the proxy listener.
    connection: MultiplexedConnection,
    /// Proxy server; fields drop in order, so containers go before the network.
    toxiproxy: ToxiproxyFixture,
    /// Backend store.
    store: RedisFixture,
    /// Network shared by proxy and store.
    network: ScopedNetwork,
}

impl ProxiedRedisFixture {
    /// Creates the network, starts both containers, creates the proxy, and
    /// connects a store client through it.
    ///
    /// # Errors
    ///
    /// Returns an error when any setup step fails; resources created before
    /// the failure are released on drop.
    pub async fn start(config: &HarnessConfig) -> Result<Self, HarnessError> {
        ensure_docker_available().await?;
        let network = ScopedNetwork::create("chaos").await?;
        let toxiproxy = ToxiproxyFixture::start(config, &network).await?;
        let store = RedisFixture::start(config, &network).await?;

        let proxy =
            ProxyConfig::new(PROXY_NAME, &ToxiproxyFixture::listen_address(), &store.upstream());
        toxiproxy.client().create_proxy(&proxy).await?;

        let url = format!("redis://{}:{}", toxiproxy.host(), toxiproxy.proxy_port());
        let client = redis::Client::open(url.as_str())
            .map_err(|err| HarnessError::Client(format!("invalid store url {url}: {err}")))?;
        let connection = timeout(CONNECT_TIMEOUT, client.get_multiplexed_async_connection())
            .await
            .map_err(|_| HarnessError::Client(format!("connecting to {url} timed out")))?
            .map_err(|err| HarnessError::Client(format!("connecting to {url}: {err}")))?;
        info!(%url, upstream = %proxy.upstream, "store client routed through proxy");
        Ok(Self {
            connection,
            toxiproxy,
            store,
            network,
        })
    }

    /// Returns the name of the proxy fronting the store.
    #[must_use]
    pub const fn proxy_name(&self) -> &'static str {
        PROXY_NAME
    }

    /// Returns the proxy control client.
    #[must_use]
    pub const fn toxiproxy(&self) -> &ToxiproxyClient {
        self.toxiproxy.client()
    }

    /// Returns the backend store fixture.
    #[must_use]
    pub const fn store(&self) -> &RedisFixture {
        &self.store
    }

    /// Returns the name of the network shared by proxy and store.
    #[must_use]
    pub fn network_name(&self) -> &str {
        self.network.name()
    }

    /// Returns the ids of the proxy and store containers.
    #[must_use]
    pub fn container_ids(&self) -> [String; 2] {
        [self.toxiproxy.container_id().to_string(), self.store.container_id().to_string()]
    }

    /// Writes `value` under `key` with an expiry.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the write fails.
    pub async fn set_with_ttl(
        &self,
        key: &str,
        value: &str,
        ttl: Duration,
    ) -> Result<(), HarnessError> {
        let mut connection = self.connection.clone();
        let written: RedisResult<()> = connection.set_ex(key, value, ttl.as_secs()).await;
        written.map_err(|err| HarnessError::Client(format!("SET {key}: {err}")))
    }

    /// Reads `key`, failing if no reply arrives within `read_timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Client`] when the read fails, the key is
    /// missing, or the timeout elapses.
    pub async fn get_with_timeout(
        &self,
        key: &str,
        read_timeout: Duration,
    ) -> Result<String, HarnessError> {
        let mut connection = self.connection.clone();
        let read: RedisResult<String> = timeout(read_timeout, connection.get(key))
            .await
            .map_err(|_| {
                HarnessError::Client(format!(
                    "GET {key} exceeded read timeout of {} ms",
                    read_timeout.as_millis()
                ))
            })?;
        read.map_err(|err| HarnessError::Client(format!("GET {key}: {err}")))
    }

    /// Flushes the store, then removes the proxy, the store, and the network.
    /// Every step runs; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Teardown`] when a container or the network
    /// cannot be removed. A failed flush is logged, not returned.
    pub async fn terminate(self) -> Result<(), HarnessError> {
        let Self {
            mut connection,
            toxiproxy,
            store,
            network,
        } = self;
        let flush = timeout(DEFAULT_READ_TIMEOUT, async {
            let flushed: RedisResult<()> = redis::cmd("FLUSHALL").query_async(&mut connection).await;
            flushed
        })
        .await;
        match flush {
            Ok(Ok(())) => {}
            Ok(Err(err)) => warn!(error = %err, "store flush failed"),
            Err(_) => warn!("store flush timed out"),
        }
        drop(connection);

        let results = [toxiproxy.terminate().await, store.terminate().await, network.remove().await];
        results.into_iter().find_map(Result::err).map_or(Ok(()), Err)
    }
}

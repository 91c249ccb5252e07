// system-tests/tests/suites/teardown.rs
// ============================================================================
// Module: Teardown Tests
// Description: Containers and networks are gone after a fixture is released.
// Purpose: Cover explicit terminate and the drop fallback on both runtimes.
// Dependencies: system-tests, container-harness
// ============================================================================

//! ## Overview
//! Each scenario records the Docker ids a fixture owns, releases the fixture,
//! then asks the daemon whether those ids still exist.

use std::time::Duration;
use std::time::Instant;

use container_harness::HarnessError;
use container_harness::ProxiedRedisFixture;
use container_harness::ScopedNetwork;
use container_harness::docker::container_exists;
use container_harness::docker::network_exists;
use container_harness::ensure_docker_available;
use system_tests::Provisioned;
use system_tests::TestSession;

/// Upper bound on waiting for the daemon to forget released resources.
const RELEASE_TIMEOUT: Duration = Duration::from_secs(30);
/// Delay between existence checks.
const RELEASE_POLL: Duration = Duration::from_millis(250);

/// Resources owned by one proxied-store fixture.
struct Owned {
    /// Scoped network name.
    network: String,
    /// Proxy and store container ids.
    containers: [String; 2],
}

impl Owned {
    /// Records the resources `fixture` currently owns.
    fn of(fixture: &ProxiedRedisFixture) -> Self {
        Self {
            network: fixture.network_name().to_string(),
            containers: fixture.container_ids(),
        }
    }

    /// Returns the first resource Docker still reports, if any.
    async fn leftover(&self) -> Result<Option<String>, HarnessError> {
        for id in &self.containers {
            if container_exists(id).await? {
                return Ok(Some(format!("container {id}")));
            }
        }
        if network_exists(&self.network).await? {
            return Ok(Some(format!("network {}", self.network)));
        }
        Ok(None)
    }

    /// Waits until every resource is gone, returning what remains on timeout.
    async fn wait_released(&self) -> Result<Option<String>, HarnessError> {
        let start = Instant::now();
        loop {
            let leftover = self.leftover().await?;
            if leftover.is_none() || start.elapsed() > RELEASE_TIMEOUT {
                return Ok(leftover);
            }
            tokio::time::sleep(RELEASE_POLL).await;
        }
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn terminate_removes_containers_and_network() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("terminate_removes_containers_and_network")?;
    let started = ProxiedRedisFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let owned = Owned::of(&fixture);
    let store_name = fixture.store().name().to_string();
    if owned.leftover().await?.is_none() {
        return Err("fixture resources not visible before teardown".into());
    }
    fixture.terminate().await?;

    if let Some(leftover) = owned.leftover().await? {
        return Err(format!("{leftover} survived terminate").into());
    }
    session.pass(vec![format!("store {store_name} and network {} removed", owned.network)])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn dropped_fixture_releases_containers_and_network() -> Result<(), Box<dyn std::error::Error>>
{
    let mut session = TestSession::begin("dropped_fixture_releases_containers_and_network")?;
    let started = ProxiedRedisFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let owned = Owned::of(&fixture);
    drop(fixture);

    if let Some(leftover) = owned.wait_released().await? {
        return Err(format!("{leftover} survived drop").into());
    }
    session.pass(vec![format!("network {} removed on drop", owned.network)])?;
    Ok(())
}

#[tokio::test]
async fn dropped_network_is_removed_on_current_thread_runtime()
-> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("dropped_network_is_removed_on_current_thread_runtime")?;
    let started: Result<ScopedNetwork, HarnessError> = async {
        ensure_docker_available().await?;
        ScopedNetwork::create("teardown").await
    }
    .await;
    let Provisioned::Ready(network) = session.provision(started)? else {
        return Ok(());
    };

    let name = network.name().to_string();
    if !network_exists(&name).await? {
        return Err(format!("network {name} not visible after create").into());
    }
    drop(network);

    if network_exists(&name).await? {
        return Err(format!("network {name} survived drop").into());
    }
    session.pass(vec![format!("network {name} removed on drop")])?;
    Ok(())
}

// system-tests/tests/suites/fault_injection.rs
// ============================================================================
// Module: Fault Injection Tests
// Description: Store reads through a proxy with injected latency and outages.
// Purpose: Show that faults added at the proxy are visible to the client.
// Dependencies: system-tests, container-harness
// ============================================================================

//! ## Overview
//! The store client talks to Redis only through Toxiproxy. Tests add toxics
//! or disable the proxy through its control API and observe the effect on
//! ordinary reads.

use std::time::Duration;
use std::time::Instant;

use container_harness::ProxiedRedisFixture;
use container_harness::StreamDirection;
use container_harness::Toxic;
use container_harness::chaos::DEFAULT_READ_TIMEOUT;
use system_tests::Provisioned;
use system_tests::TestSession;

/// Value stored by every scenario.
const FAVORITE_FOOD: &str = "Cabbage Biscuits";
/// Expiry applied to stored keys.
const KEY_TTL: Duration = Duration::from_secs(2 * 60 * 60);
/// Latency injected on the downstream path.
const LATENCY_MS: i64 = 1_000;
/// Jitter around the injected latency.
const JITTER_MS: i64 = 100;
/// Lower bound for an observed delayed read.
const MIN_DELAYED_READ: Duration = Duration::from_millis(800);

/// Builds a key unique to one test run.
fn favorite_food_key() -> String {
    format!("{{user.{}}}.favoritefood", uuid::Uuid::new_v4())
}

#[tokio::test(flavor = "multi_thread")]
async fn latency_toxic_delays_but_preserves_reads() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("latency_toxic_delays_but_preserves_reads")?;
    let started = ProxiedRedisFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let key = favorite_food_key();
    fixture.set_with_ttl(&key, FAVORITE_FOOD, KEY_TTL).await?;

    let toxic = Toxic::latency("latency_down", StreamDirection::Downstream, LATENCY_MS, JITTER_MS);
    fixture.toxiproxy().add_toxic(fixture.proxy_name(), &toxic).await?;
    let toxics = fixture.toxiproxy().toxics(fixture.proxy_name()).await?;

    let began = Instant::now();
    let value = fixture.get_with_timeout(&key, DEFAULT_READ_TIMEOUT).await?;
    let elapsed = began.elapsed();

    fixture.toxiproxy().remove_toxic(fixture.proxy_name(), &toxic.name).await?;
    fixture.terminate().await?;

    if value != FAVORITE_FOOD {
        return Err(format!("expected {FAVORITE_FOOD:?}, read {value:?}").into());
    }
    if !toxics.iter().any(|listed| listed.name == toxic.name) {
        return Err("latency toxic missing from proxy listing".into());
    }
    if elapsed < MIN_DELAYED_READ {
        return Err(format!("read finished in {elapsed:?}; latency was not applied").into());
    }
    session.pass(vec![format!("delayed read completed in {} ms", elapsed.as_millis())])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn disabled_proxy_fails_reads() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("disabled_proxy_fails_reads")?;
    let started = ProxiedRedisFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let key = favorite_food_key();
    fixture.set_with_ttl(&key, FAVORITE_FOOD, KEY_TTL).await?;
    let state = fixture.toxiproxy().set_enabled(fixture.proxy_name(), false).await?;
    let read = fixture.get_with_timeout(&key, DEFAULT_READ_TIMEOUT).await;

    fixture.toxiproxy().set_enabled(fixture.proxy_name(), true).await?;
    fixture.terminate().await?;

    if state.config.enabled {
        return Err("proxy still reported enabled after disabling".into());
    }
    let Err(err) = read else {
        return Err("read succeeded through a disabled proxy".into());
    };
    session.pass(vec![format!("read failed as expected: {err}")])?;
    Ok(())
}

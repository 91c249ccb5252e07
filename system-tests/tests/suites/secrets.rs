// system-tests/tests/suites/secrets.rs
// ============================================================================
// Module: Secrets Tests
// Description: KV v2 reads and writes against a dev-mode Vault container.
// Purpose: Confirm seeded secrets and client writes are readable.
// Dependencies: system-tests, container-harness, vaultrs, serde
// ============================================================================

//! ## Overview
//! Vault runs in dev mode with a fixed root token. The fixture seeds a secret
//! through the container's own CLI before the client connects.

use container_harness::VaultFixture;
use container_harness::vault::DEFAULT_KV_MOUNT;
use container_harness::vault::DEFAULT_REQUEST_TIMEOUT;
use serde::Deserialize;
use serde::Serialize;
use system_tests::Provisioned;
use system_tests::TestSession;
use vaultrs::kv2;

/// Root token for the dev server.
const ROOT_TOKEN: &str = "MyToKeN";
/// Seed command run inside the container.
const SEED_COMMAND: &str = "kv put -mount=secret testing value=password1234";

/// Single-field secret payload.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
struct Secret {
    /// Secret value.
    value: String,
}

#[tokio::test(flavor = "multi_thread")]
async fn seeded_secret_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("seeded_secret_reads_back")?;
    let started = VaultFixture::builder()
        .token(ROOT_TOKEN)
        .init_command(SEED_COMMAND)
        .start(session.config())
        .await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.client(DEFAULT_REQUEST_TIMEOUT)?;
    let secret: Secret = kv2::read(&client, DEFAULT_KV_MOUNT, "testing").await?;
    let address = fixture.http_host_address().to_string();
    let token_matches = fixture.token() == ROOT_TOKEN;

    fixture.terminate().await?;
    if !token_matches {
        return Err("fixture did not keep the configured root token".into());
    }
    if secret.value != "password1234" {
        return Err(format!("unexpected seeded value {:?}", secret.value).into());
    }
    session.pass(vec![format!("seeded secret read through kv2 at {address}")])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn written_secret_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("written_secret_reads_back")?;
    let started = VaultFixture::builder().token(ROOT_TOKEN).start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.client(DEFAULT_REQUEST_TIMEOUT)?;
    let written = Secret {
        value: format!("rotated-{}", uuid::Uuid::new_v4().simple()),
    };
    kv2::set(&client, DEFAULT_KV_MOUNT, "app/database", &written).await?;
    let read: Secret = kv2::read(&client, DEFAULT_KV_MOUNT, "app/database").await?;

    fixture.terminate().await?;
    if read != written {
        return Err(format!("read {read:?}, wrote {written:?}").into());
    }
    session.pass(vec!["client write visible to subsequent read".to_string()])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn missing_secret_is_an_error() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("missing_secret_is_an_error")?;
    let started = VaultFixture::builder().start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.client(DEFAULT_REQUEST_TIMEOUT)?;
    let read = kv2::read::<Secret>(&client, DEFAULT_KV_MOUNT, "does/not/exist").await;

    fixture.terminate().await?;
    let Err(err) = read else {
        return Err("read of an unwritten path succeeded".into());
    };
    session.pass(vec![format!("missing path rejected: {err}")])?;
    Ok(())
}

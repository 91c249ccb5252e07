// system-tests/tests/suites/object_store.rs
// ============================================================================
// Module: Object Store Tests
// Description: S3-compatible storage against an emulated cloud container.
// Purpose: Prove the emulator fixture hands out a working, isolated client.
// Dependencies: system-tests, container-harness, aws-sdk-s3
// ============================================================================

//! ## Overview
//! Each test starts its own emulator, so bucket state never leaks between
//! tests.

use aws_sdk_s3::primitives::ByteStream;
use container_harness::LocalStackFixture;
use system_tests::Provisioned;
use system_tests::TestSession;

#[tokio::test(flavor = "multi_thread")]
async fn list_buckets_succeeds_on_fresh_emulator() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("list_buckets_succeeds_on_fresh_emulator")?;
    let started = LocalStackFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.s3_client().await;
    let listed = client.list_buckets().send().await?;
    let count = listed.buckets().len();

    let endpoint = fixture.endpoint().to_string();
    fixture.terminate().await?;
    if !endpoint.starts_with("http://") {
        return Err(format!("emulator endpoint {endpoint} is not plain http").into());
    }
    session.pass(vec![format!("buckets listed at {endpoint}: {count}")])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn created_bucket_appears_in_listing() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("created_bucket_appears_in_listing")?;
    let started = LocalStackFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.s3_client().await;
    let bucket = format!("harness-{}", uuid::Uuid::new_v4().simple());
    client.create_bucket().bucket(&bucket).send().await?;
    let listed = client.list_buckets().send().await?;
    let found = listed.buckets().iter().any(|entry| entry.name() == Some(bucket.as_str()));

    fixture.terminate().await?;
    if !found {
        return Err(format!("bucket {bucket} missing from listing").into());
    }
    session.pass(vec![format!("bucket {bucket} listed after creation")])?;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stored_object_reads_back() -> Result<(), Box<dyn std::error::Error>> {
    let mut session = TestSession::begin("stored_object_reads_back")?;
    let started = LocalStackFixture::start(session.config()).await;
    let Provisioned::Ready(fixture) = session.provision(started)? else {
        return Ok(());
    };

    let client = fixture.s3_client().await;
    let bucket = format!("harness-{}", uuid::Uuid::new_v4().simple());
    let payload = b"cabbage biscuits".to_vec();
    client.create_bucket().bucket(&bucket).send().await?;
    client
        .put_object()
        .bucket(&bucket)
        .key("pantry/recipe.txt")
        .body(ByteStream::from(payload.clone()))
        .send()
        .await?;
    let object = client.get_object().bucket(&bucket).key("pantry/recipe.txt").send().await?;
    let body = object.body.collect().await?.into_bytes();

    fixture.terminate().await?;
    if body.as_ref() != payload.as_slice() {
        return Err("object body differs from what was stored".into());
    }
    session.pass(vec![format!("{} bytes round-tripped", payload.len())])?;
    Ok(())
}

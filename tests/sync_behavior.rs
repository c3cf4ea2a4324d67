//! Behavior-driven end-to-end tests for the full transfer pipeline.
//!
//! Every test spawns its own mock API with the canonical failure schedule:
//! 25 source records across 3 pages, page 2 failing once with a transient
//! server error, and every 5th sink write rate-limited with `Retry-After: 1`.

use siphon_core::TransferOptions;
use siphon_mockapi::MockApiConfig;
use siphon_tests::{context, engine, reset_api, sink_count, spawn_api};

#[tokio::test]
async fn first_sync_transfers_every_record_despite_injected_faults() {
    // Given: a source with a transient page failure and a rate-limiting sink
    let api = spawn_api(MockApiConfig::default()).await;
    let ctx = context(&api.base_url());

    // When: a full sync runs
    let outcome = engine()
        .sync(&ctx, TransferOptions::default())
        .await
        .expect("sync must complete");

    // Then: all 25 records land, none failed, none duplicated
    assert_eq!(outcome.created_count, 25);
    assert_eq!(outcome.updated_count, 0);
    assert_eq!(outcome.failed_count, 0);
    assert_eq!(sink_count(&api.base_url()).await, 25);
}

#[tokio::test]
async fn rerunning_against_an_unreset_sink_creates_no_duplicates() {
    let api = spawn_api(MockApiConfig::default()).await;

    let first = context(&api.base_url());
    engine()
        .sync(&first, TransferOptions::default())
        .await
        .expect("first sync must complete");
    assert_eq!(sink_count(&api.base_url()).await, 25);

    // A second run sees the same source; every upsert resolves to an update.
    let second = context(&api.base_url());
    let outcome = engine()
        .sync(&second, TransferOptions::default())
        .await
        .expect("second sync must complete");

    assert_eq!(outcome.created_count, 0);
    assert_eq!(outcome.updated_count, 25);
    assert_eq!(outcome.failed_count, 0);
    assert_eq!(sink_count(&api.base_url()).await, 25);
}

#[tokio::test]
async fn fetch_preserves_source_order_across_the_transient_page_failure() {
    let api = spawn_api(MockApiConfig::default()).await;
    let ctx = context(&api.base_url());

    let records = engine()
        .fetch(&ctx, TransferOptions::default())
        .await
        .expect("fetch must complete");

    assert_eq!(records.len(), 25);
    let ids: Vec<String> = records.iter().map(|r| r.external_id.clone()).collect();
    let expected: Vec<String> = (1..=25).map(|i| format!("item-{i}")).collect();
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn limit_bounds_both_the_fetch_and_the_writes() {
    let api = spawn_api(MockApiConfig::default()).await;
    let ctx = context(&api.base_url());

    let outcome = engine()
        .sync(
            &ctx,
            TransferOptions {
                page_size: 10,
                limit: Some(5),
            },
        )
        .await
        .expect("limited sync must complete");

    assert_eq!(outcome.total(), 5);
    assert_eq!(outcome.failed_count, 0);
    assert_eq!(sink_count(&api.base_url()).await, 5);
}

#[tokio::test]
async fn admin_reset_clears_the_sink_and_rearms_injection() {
    let api = spawn_api(MockApiConfig::default()).await;

    let first = context(&api.base_url());
    engine()
        .sync(&first, TransferOptions::default())
        .await
        .expect("first sync must complete");
    assert_eq!(sink_count(&api.base_url()).await, 25);

    reset_api(&api.base_url()).await;
    assert_eq!(sink_count(&api.base_url()).await, 0);

    // Post-reset the page fault is armed again and the sync still completes.
    let second = context(&api.base_url());
    let outcome = engine()
        .sync(&second, TransferOptions::default())
        .await
        .expect("post-reset sync must complete");
    assert_eq!(outcome.created_count, 25);
    assert_eq!(sink_count(&api.base_url()).await, 25);
}

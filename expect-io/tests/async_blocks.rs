mod common;

use std::{sync::Arc, time::Duration};

use expect_io::{CacheExpectation, EventBus, Probe, QueryExpectation};

use common::{FakeDatabase, MemoryCache};

#[tokio::test]
async fn queries_across_await_points_are_counted() {
    let bus = EventBus::new();
    let db = FakeDatabase::new(&bus);
    let probe = Probe::new(bus.clone());

    let outcome = probe
        .expect_queries_async(QueryExpectation::exactly(2), async {
            db.insert_user("ada");
            tokio::time::sleep(Duration::from_millis(5)).await;
            db.update_user(1, "grace");
            "done"
        })
        .await
        .unwrap();

    assert!(outcome.passed(), "{:?}", outcome.failure_message());
    assert_eq!(outcome.into_value(), "done");
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cache_ops_from_spawned_tasks_are_counted() {
    let bus = EventBus::new();
    let cache = Arc::new(MemoryCache::new(&bus));
    let probe = Probe::new(bus.clone());

    let worker = cache.clone();
    let outcome = probe
        .expect_cache_ops_async(CacheExpectation::new().store(&*cache).writes(2), async move {
            let handles: Vec<_> = (0..2)
                .map(|i| {
                    let cache = worker.clone();
                    tokio::spawn(async move { cache.write(&format!("job:{i}"), i) })
                })
                .collect();
            for handle in handles {
                handle.await.unwrap();
            }
        })
        .await
        .unwrap();

    assert!(outcome.passed(), "{:?}", outcome.failure_message());
}

#[tokio::test]
async fn dropping_the_future_releases_the_subscription() {
    let bus = EventBus::new();
    let probe = Probe::new(bus.clone());

    let pending = probe.expect_queries_async(QueryExpectation::new(), std::future::pending::<()>());
    let timed_out = tokio::time::timeout(Duration::from_millis(10), pending).await;

    assert!(timed_out.is_err());
    assert_eq!(bus.subscriber_count(), 0);
}

async fn never_runs() {
    panic!("block must not run")
}

#[tokio::test]
async fn usage_errors_are_reported_without_polling_the_block() {
    let bus = EventBus::new();
    let probe = Probe::new(bus.clone());

    let result = probe
        .expect_cache_ops_async(CacheExpectation::new().total(1), never_runs())
        .await;

    assert!(result.is_err());
}

//! Integration Tests for the Cache Handle
//!
//! Exercises the public API end to end: recency order, TTL behavior,
//! the background sweeper and concurrent access.

use std::collections::HashSet;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use lru_ttl_cache::{Cache, CacheConfig, CacheError, ManualClock};

// == Helper Functions ==

/// Cache driven by a manual clock, with a sweeper too slow to interfere.
fn cache_with_clock(capacity: usize) -> (Cache<String>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(1_700_000_000_000));
    let config = CacheConfig::new(capacity, Duration::from_secs(3600));
    let cache = Cache::with_clock(&config, clock.clone()).unwrap();
    (cache, clock)
}

fn value(s: &str) -> String {
    s.to_string()
}

// == Recency Order ==

#[tokio::test]
async fn test_fourth_set_evicts_oldest() {
    let (cache, _clock) = cache_with_clock(3);

    cache.set("a", value("1"));
    cache.set("b", value("2"));
    cache.set("c", value("3"));
    cache.set("d", value("4"));

    assert_eq!(cache.get("a"), None);
    assert_eq!(cache.keys(), vec!["d", "c", "b"]);
}

#[tokio::test]
async fn test_get_refreshes_recency() {
    let (cache, _clock) = cache_with_clock(3);

    cache.set("a", value("1"));
    cache.set("b", value("2"));
    cache.set("c", value("3"));

    assert_eq!(cache.get("b").as_deref(), Some("2"));
    assert_eq!(cache.keys(), vec!["b", "c", "a"]);
}

#[tokio::test]
async fn test_overwrite_updates_value_and_position() {
    let (cache, _clock) = cache_with_clock(3);

    cache.set("key1", value("value1"));
    cache.set("key2", value("value2"));
    cache.set("key3", value("value3"));
    cache.set("key2", value("new_value2"));

    assert_eq!(cache.get("key2").as_deref(), Some("new_value2"));

    cache.set("key4", value("value4"));
    assert_eq!(cache.get("key1"), None);
    assert_eq!(cache.len(), 3);
    assert!(cache.is_consistent());
}

#[tokio::test]
async fn test_remove_absent_key_is_noop() {
    let (cache, _clock) = cache_with_clock(3);
    cache.set("a", value("1"));

    assert_eq!(cache.remove("missing"), None);
    assert_eq!(cache.len(), 1);
}

// == TTL ==

#[tokio::test]
async fn test_ttl_entry_expires() {
    let (cache, clock) = cache_with_clock(3);

    cache.set_with_ttl("k", value("v"), Duration::from_secs(2));
    clock.advance(Duration::from_secs(1));
    assert_eq!(cache.get("k").as_deref(), Some("v"));

    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.get("k"), None);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_overwrite_supersedes_earlier_ttl() {
    let (cache, clock) = cache_with_clock(3);

    cache.set_with_ttl("k", value("v1"), Duration::from_secs(2));
    cache.set_with_ttl("k", value("v2"), Duration::from_secs(10));
    clock.advance(Duration::from_secs(3));

    assert_eq!(cache.get("k").as_deref(), Some("v2"));
}

#[tokio::test]
async fn test_capacity_and_ttl_combined() {
    let (cache, clock) = cache_with_clock(2);

    cache.set_with_ttl("a", value("1"), Duration::from_secs(10));
    cache.set_with_ttl("b", value("2"), Duration::from_secs(60));
    let evicted = cache.set_with_ttl("c", value("3"), Duration::from_secs(1));

    assert_eq!(evicted, Some(("a".to_string(), value("1"))));
    assert!(!cache.contains("a"));

    clock.advance(Duration::from_secs(7));
    assert_eq!(cache.remove_expired(), 1);
    assert!(!cache.contains("c"));
    assert_eq!(cache.get("b").as_deref(), Some("2"));
}

#[tokio::test]
async fn test_remove_expired_spares_live_and_permanent_entries() {
    let (cache, clock) = cache_with_clock(5);

    cache.set_with_ttl("key1", value("value1"), Duration::from_secs(1));
    cache.set_with_ttl("key2", value("value2"), Duration::from_secs(2));
    cache.set_with_ttl("key3", value("value3"), Duration::from_secs(12));
    cache.set("key4", value("value4"));

    clock.advance(Duration::from_secs(7));
    assert_eq!(cache.remove_expired(), 2);

    assert_eq!(cache.get("key1"), None);
    assert_eq!(cache.get("key2"), None);
    assert_eq!(cache.get("key3").as_deref(), Some("value3"));
    assert_eq!(cache.get("key4").as_deref(), Some("value4"));
}

// == Background Sweeper ==

#[tokio::test]
async fn test_sweeper_removes_expired_entries_in_background() {
    let cache = Cache::new(100, Duration::from_millis(25)).unwrap();

    for i in 0..10 {
        cache.set_with_ttl(format!("key{}", i), i, Duration::from_millis(40));
    }
    cache.set("permanent", 99);

    tokio::time::sleep(Duration::from_millis(300)).await;

    assert_eq!(cache.keys(), vec!["permanent"]);
    assert_eq!(cache.stats().expirations, 10);
}

#[tokio::test]
async fn test_shutdown_stops_background_sweeps() {
    let cache = Cache::new(10, Duration::from_millis(10)).unwrap();
    cache.shutdown();
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert!(!cache.sweeper_running());

    cache.set_with_ttl("k", 1u32, Duration::from_millis(10));
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Nothing swept it; the explicit pass still can
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.remove_expired(), 1);
}

#[tokio::test]
async fn test_sub_millisecond_durations_round_up() {
    let cache = Cache::new(4, Duration::from_micros(500)).unwrap();

    cache.set_with_ttl("k", 1u32, Duration::from_micros(500));
    assert_eq!(cache.get("k"), Some(1));
}

#[test]
fn test_construction_errors() {
    assert_eq!(
        Cache::<u32>::new(10, Duration::from_secs(1)).unwrap_err(),
        CacheError::NoRuntime
    );

    let runtime = tokio::runtime::Runtime::new().unwrap();
    let _guard = runtime.enter();
    assert_eq!(
        Cache::<u32>::new(0, Duration::from_secs(1)).unwrap_err(),
        CacheError::InvalidCapacity(0)
    );
}

// == Concurrency ==

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_sets_never_exceed_capacity() {
    let cache = Arc::new(Cache::new(64, Duration::from_millis(5)).unwrap());

    thread::scope(|scope| {
        for t in 0..8 {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..500 {
                    cache.set(format!("key{}-{}", t, i), i);
                    assert!(cache.len() <= 64);
                    if i % 3 == 0 {
                        cache.get(&format!("key{}-{}", t, i / 2));
                    }
                }
            });
        }
    });

    assert_eq!(cache.len(), 64);
    assert!(cache.is_consistent());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_get_and_remove_stay_consistent() {
    let cache = Arc::new(Cache::new(1000, Duration::from_millis(5)).unwrap());
    for i in 0..100 {
        cache.set_with_ttl(format!("key{}", i), i, Duration::from_millis(20 + i as u64));
    }

    thread::scope(|scope| {
        for t in 0..6 {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..2000usize {
                    let key = format!("key{}", (i * 7 + t) % 100);
                    match i % 4 {
                        0 => {
                            cache.remove(&key);
                        }
                        1 => {
                            cache.set_with_ttl(key, i, Duration::from_millis(10));
                        }
                        _ => {
                            cache.get(&key);
                        }
                    }
                }
            });
        }
    });

    assert!(cache.is_consistent());
    let keys = cache.keys();
    let unique: HashSet<_> = keys.iter().collect();
    assert_eq!(unique.len(), keys.len());
    assert_eq!(keys.len(), cache.len());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_ttl_sets_drain_via_sweeper() {
    let cache = Arc::new(Cache::new(1000, Duration::from_millis(20)).unwrap());

    thread::scope(|scope| {
        for t in 0..2 {
            let cache = &cache;
            scope.spawn(move || {
                for i in 0..10u64 {
                    let ttl = Duration::from_millis(10 + (i % 3) * 10);
                    cache.set_with_ttl(format!("key{}-{}", t, i), i, ttl);
                }
            });
        }
    });

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(cache.len(), 0);
}

//! Integration tests for the caches over real storage mediums
//!
//! Exercises the public API end to end: persistent directory storage, session
//! storage, expiry driven by a manual clock, and a wall-clock smoke test.

use std::sync::{Arc, Once};
use std::thread::sleep;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use ttl_shelf::{
    CollectionCache, CollectionCacheConfig, Config, FileStorage, ManualClock, MemoryStorage,
    RawStorage, ScalarCache, StorageContext, StorageMedium,
};

static TRACING: Once = Once::new();

fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "ttl_shelf=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Item {
    id: u32,
    n: String,
}

fn item(id: u32, n: &str) -> Item {
    Item {
        id,
        n: n.to_string(),
    }
}

/// Context over a fresh temp directory with a manual clock and 1s default TTL.
fn test_context() -> (TempDir, ManualClock, StorageContext) {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let clock = ManualClock::new(1_700_000_000_000);
    let config = Config {
        storage_dir: dir.path().to_path_buf(),
        default_timeout_ms: 1_000,
    };
    let context = StorageContext::from_config(&config)
        .unwrap()
        .with_clock(Arc::new(clock.clone()));
    (dir, clock, context)
}

// == Scalar Cache ==

#[test]
fn test_scalar_set_then_get() {
    let (_dir, _clock, context) = test_context();
    let cache = context.cache::<Item>("current");

    cache.set_value(item(1, "a"));
    assert_eq!(cache.get_value(), Some(item(1, "a")));
}

#[test]
fn test_scalar_expired_key_is_removed_from_medium() {
    let (_dir, clock, context) = test_context();
    let cache = context.cache::<Item>("current");

    cache.set_value(item(1, "a"));
    clock.advance(1_001);

    assert_eq!(cache.get_value(), None);
    assert_eq!(context.persistent_medium().get("current").unwrap(), None);
}

#[test]
fn test_scalar_null_default_without_write() {
    let (_dir, _clock, context) = test_context();
    let cache = context.cache::<Item>("never-written");

    assert_eq!(cache.get_value(), None);
    assert_eq!(cache.remove_value(), None);
}

#[test]
fn test_scalar_remove_twice() {
    let (_dir, _clock, context) = test_context();
    let cache = context.cache::<u64>("counter").with_default(0);

    cache.set_value(9);
    assert_eq!(cache.remove_value(), Some(9));
    assert_eq!(cache.remove_value(), Some(0));
}

#[test]
fn test_scalar_survives_reopening_storage() {
    let (dir, clock, context) = test_context();
    context.cache::<String>("token").set_value("abc".to_string());

    let reopened = StorageContext::new(
        Arc::new(FileStorage::open(dir.path()).unwrap()),
        Arc::new(MemoryStorage::new()),
    )
    .with_clock(Arc::new(clock.clone()))
    .with_default_timeout(Duration::from_millis(1_000));

    assert_eq!(
        reopened.cache::<String>("token").get_value(),
        Some("abc".to_string())
    );
}

// == Collection Cache ==

#[test]
fn test_collection_per_element_expiry_scenario() {
    let (_dir, clock, context) = test_context();
    let cache = context.collection("items", |x: &Item| x.id);

    cache.add_value(item(1, "a"));
    clock.advance(500);
    cache.add_value(item(2, "b"));
    clock.advance(600);

    assert_eq!(cache.get_value(), vec![item(2, "b")]);
}

#[test]
fn test_collection_upsert_keeps_latest() {
    let (_dir, _clock, context) = test_context();
    let cache = context.collection("items", |x: &Item| x.id);

    cache.add_value(item(1, "a"));
    cache.add_value(item(1, "b"));

    let values = cache.get_value();
    assert_eq!(values.iter().filter(|x| x.id == 1).count(), 1);
    assert_eq!(values, vec![item(1, "b")]);
}

#[test]
fn test_collection_remove_by_id_then_get_by_id() {
    let (_dir, _clock, context) = test_context();
    let cache = context.collection("items", |x: &Item| x.id);

    cache.add_value(item(7, "seven"));

    assert_eq!(cache.remove_value_by_id(&7), Some(item(7, "seven")));
    assert_eq!(cache.get_value_by_id(&7), None);
}

#[test]
fn test_collection_remove_twice() {
    let (_dir, _clock, context) = test_context();
    let cache = context.collection("items", |x: &Item| x.id);

    cache.set_value(vec![item(1, "a"), item(2, "b")]);

    assert_eq!(cache.remove_value(), vec![item(1, "a"), item(2, "b")]);
    assert!(cache.remove_value().is_empty());
}

#[test]
fn test_collection_built_from_config_struct() {
    init_tracing();
    let storage: Arc<dyn StorageMedium> = Arc::new(MemoryStorage::new());
    let clock = ManualClock::new(0);
    let config = CollectionCacheConfig::new("tags", Duration::from_millis(50), |t: &String| {
        t.clone()
    });
    let cache = CollectionCache::new(storage, config).with_clock(Arc::new(clock.clone()));

    cache.set_value(vec!["a".to_string(), "b".to_string()]);
    clock.advance(30);
    cache.add_value("a".to_string());
    clock.advance(30);

    assert_eq!(cache.get_value(), vec!["a".to_string()]);
    assert_eq!(cache.purge_expired(), 1);
}

// == Malformed Data ==

#[test]
fn test_malformed_text_degrades_for_every_wrapper() {
    let (_dir, _clock, context) = test_context();
    let persistent = context.persistent_medium();
    let session = context.session_medium();
    for key in ["scalar", "collection", "raw"] {
        persistent.set(key, "<html>not json</html>").unwrap();
    }
    session.set("raw", "<html>not json</html>").unwrap();

    let scalar = context.cache::<Item>("scalar").with_default(item(0, "default"));
    let collection = context.collection("collection", |x: &Item| x.id);
    let raw = context.persistent::<Item>("raw");
    let session_raw = context.session::<Item>("raw").with_default(item(0, "session"));

    assert_eq!(scalar.get_value(), Some(item(0, "default")));
    assert!(collection.get_value().is_empty());
    assert_eq!(raw.get_value(), None);
    assert_eq!(session_raw.get_value(), Some(item(0, "session")));
}

// == Raw Storage ==

#[test]
fn test_raw_storage_never_expires() {
    let (_dir, clock, context) = test_context();
    let raw: RawStorage<Vec<String>> = context.session("recent");

    raw.set_value(vec!["x".to_string()]);
    clock.advance(10_000_000);

    assert_eq!(raw.get_value(), Some(vec!["x".to_string()]));
    assert_eq!(raw.medium_name(), "memory");
}

#[test]
fn test_persistent_wrapper_accepts_long_keys() {
    let (_dir, _clock, context) = test_context();
    let key = format!("user/{}/preferences", "x".repeat(300));
    let raw: RawStorage<u32> = context.persistent(key.clone());

    raw.set_value(7);
    assert_eq!(raw.get_value(), Some(7));
    assert_eq!(context.persistent_medium().keys().unwrap(), vec![key]);
    assert_eq!(raw.remove_value(), Some(7));
    assert!(context.persistent_medium().keys().unwrap().is_empty());
}

// == Wall Clock ==

#[test]
fn test_scalar_expires_with_system_clock() {
    init_tracing();
    let storage = Arc::new(MemoryStorage::new());
    let cache: ScalarCache<String> =
        ScalarCache::new(storage.clone(), "short", Duration::from_millis(50));

    cache.set_value("soon gone".to_string());
    assert_eq!(cache.get_value(), Some("soon gone".to_string()));

    sleep(Duration::from_millis(150));

    assert_eq!(cache.get_value(), None);
    assert!(storage.is_empty());
}

//! Load, write-through and fallback behaviour of the economy engine.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use backend::config::{Config, StoreKind};
use backend::services::economy::EconomyEngine;
use backend::storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
use shared::constants::{COINS_KEY, SCRATCHES_KEY, SPINS_KEY};
use shared::Balances;

/// A store whose every read and write fails.
struct FailingStore;

#[async_trait]
impl KeyValueStore for FailingStore {
    async fn get(&self, _key: &str) -> StorageResult<Option<String>> {
        Err(StorageError::Unavailable("disk gone".to_string()))
    }

    async fn set(&self, _key: &str, _value: &str) -> StorageResult<()> {
        Err(StorageError::Unavailable("disk gone".to_string()))
    }
}

fn engine_over(store: &Arc<MemoryStore>) -> EconomyEngine {
    EconomyEngine::new(store.clone(), Balances::default())
}

/// Polls until the background writer has stored `expected` under `key`.
async fn wait_for_value(store: &MemoryStore, key: &str, expected: &str) {
    for _ in 0..200 {
        if store.get(key).await.unwrap().as_deref() == Some(expected) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("{} never became {:?}, was {:?}", key, expected, store.get(key).await.unwrap());
}

#[tokio::test]
async fn test_load_uses_defaults_for_empty_store() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&store);
    assert!(!engine.is_loaded());

    let state = engine.load().await;
    assert!(state.loaded);
    assert_eq!(state.balances, Balances { coins: 0, spins: 10, scratches: 10 });
}

#[tokio::test]
async fn test_load_reads_stored_values() {
    let store = Arc::new(MemoryStore::with_values([
        (COINS_KEY, "1500"),
        (SPINS_KEY, "0"),
        (SCRATCHES_KEY, "3"),
    ]));
    let engine = engine_over(&store);

    let state = engine.load().await;
    assert_eq!(state.balances, Balances { coins: 1500, spins: 0, scratches: 3 });
}

#[tokio::test]
async fn test_unparseable_value_falls_back_per_key() {
    let store = Arc::new(MemoryStore::with_values([(COINS_KEY, "lots"), (SPINS_KEY, "4")]));
    let engine = engine_over(&store);

    let state = engine.load().await;
    assert_eq!(state.balances, Balances { coins: 0, spins: 4, scratches: 10 });
}

#[tokio::test]
async fn test_failing_store_keeps_session_playable() {
    let engine = EconomyEngine::new(Arc::new(FailingStore), Balances::default());

    let state = engine.load().await;
    assert!(state.loaded);
    assert_eq!(state.balances, Balances::default());

    assert!(engine.spend_spin());
    engine.add_coins(50);
    assert_eq!(engine.balances(), Balances { coins: 50, spins: 9, scratches: 10 });
    assert!(engine.flush().await.is_err());
}

#[tokio::test]
async fn test_mutations_are_written_through() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&store);
    engine.load().await;

    assert!(engine.spend_spin());
    engine.add_coins(100);
    engine.add_scratches(5);

    wait_for_value(&store, COINS_KEY, "100").await;
    wait_for_value(&store, SPINS_KEY, "9").await;
    wait_for_value(&store, SCRATCHES_KEY, "15").await;
}

#[tokio::test]
async fn test_no_save_before_load() {
    let store = Arc::new(MemoryStore::with_values([(COINS_KEY, "700")]));
    let engine = engine_over(&store);

    engine.add_coins(25);
    engine.save();
    assert_eq!(engine.flush().await.ok(), Some(()));
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(store.get(COINS_KEY).await.unwrap().as_deref(), Some("700"));

    // Stored values replace the pre-load defaults
    let state = engine.load().await;
    assert_eq!(state.balances.coins, 700);
}

#[tokio::test]
async fn test_load_is_idempotent() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&store);
    engine.load().await;
    engine.add_coins(10);

    let again = engine.load().await;
    assert_eq!(again.balances.coins, 10);
}

#[tokio::test]
async fn test_add_coins_accumulates() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&store);
    engine.load().await;

    let rewards = [10, 0, 50, 500, 25, 100];
    for amount in rewards {
        engine.add_coins(amount);
    }

    let total: u64 = rewards.iter().sum();
    assert_eq!(engine.balances().coins, total);
    wait_for_value(&store, COINS_KEY, &total.to_string()).await;
}

#[tokio::test]
async fn test_spend_never_goes_negative() {
    let store = Arc::new(MemoryStore::with_values([(SPINS_KEY, "1"), (SCRATCHES_KEY, "0")]));
    let engine = engine_over(&store);
    engine.load().await;

    assert!(engine.spend_spin());
    assert!(!engine.spend_spin());
    assert!(!engine.spend_scratch());
    assert_eq!(engine.balances().spins, 0);
    assert_eq!(engine.balances().scratches, 0);
}

#[tokio::test]
async fn test_flush_writes_current_balances() {
    let store = Arc::new(MemoryStore::new());
    let engine = engine_over(&store);
    engine.load().await;
    engine.add_coins(42);

    engine.flush().await.unwrap();
    assert_eq!(store.get(COINS_KEY).await.unwrap().as_deref(), Some("42"));
    assert_eq!(store.get(SPINS_KEY).await.unwrap().as_deref(), Some("10"));
}

#[tokio::test]
async fn test_unreachable_redis_falls_back_to_defaults() {
    let config = Config {
        store: StoreKind::Redis("redis://127.0.0.1:1".to_string()),
        ..Config::default()
    };
    let store = config.build_store().unwrap();
    let engine = EconomyEngine::new(store, config.initial_balances);

    let state = engine.load().await;
    assert!(state.loaded);
    assert_eq!(state.balances, Balances { coins: 0, spins: 10, scratches: 10 });

    assert!(engine.spend_spin());
    assert_eq!(engine.balances().spins, 9);
}

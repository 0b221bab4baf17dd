//! Balances stored in a JSON file survive a restart.

use std::sync::Arc;

use backend::services::economy::EconomyEngine;
use backend::storage::{FileStore, KeyValueStore, StorageError};
use shared::constants::COINS_KEY;
use shared::Balances;

#[tokio::test]
async fn test_missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path().join("state.json"));
    assert_eq!(store.get(COINS_KEY).await.unwrap(), None);
}

#[tokio::test]
async fn test_values_survive_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    let store = FileStore::new(&path);
    store.set("a", "1").await.unwrap();
    store.set("b", "2").await.unwrap();
    store.set("a", "3").await.unwrap();

    let reopened = FileStore::new(&path);
    assert_eq!(reopened.get("a").await.unwrap().as_deref(), Some("3"));
    assert_eq!(reopened.get("b").await.unwrap().as_deref(), Some("2"));
}

#[tokio::test]
async fn test_corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");
    std::fs::write(&path, b"{not json").unwrap();

    let store = FileStore::new(&path);
    assert!(matches!(store.get(COINS_KEY).await, Err(StorageError::Json(_))));
}

#[tokio::test]
async fn test_balances_persist_across_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("state.json");

    {
        let engine = EconomyEngine::new(Arc::new(FileStore::new(&path)), Balances::default());
        engine.load().await;
        assert!(engine.spend_spin());
        engine.add_coins(500);
        engine.flush().await.unwrap();
    }

    let engine = EconomyEngine::new(Arc::new(FileStore::new(&path)), Balances::default());
    let state = engine.load().await;
    assert_eq!(state.balances, Balances { coins: 500, spins: 9, scratches: 10 });
}

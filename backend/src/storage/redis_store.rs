use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::Client as RedisClient;
use tokio::sync::Mutex;

use super::{KeyValueStore, StorageResult};

/// Plain GET/SET against a Redis server.
///
/// The connection is opened on first use and reopened after a failed call,
/// so an unreachable server shows up as per-call errors rather than at
/// startup.
pub struct RedisStore {
    client: RedisClient,
    conn: Mutex<Option<MultiplexedConnection>>,
}

impl RedisStore {
    /// Only validates the URL; no connection is made yet.
    pub fn open(url: &str) -> StorageResult<Self> {
        Ok(Self {
            client: RedisClient::open(url)?,
            conn: Mutex::new(None),
        })
    }

    async fn connection(&self) -> StorageResult<MultiplexedConnection> {
        let mut cached = self.conn.lock().await;
        if let Some(conn) = cached.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *cached = Some(conn.clone());
        Ok(conn)
    }

    async fn reset(&self) {
        self.conn.lock().await.take();
    }

    async fn query<T: redis::FromRedisValue>(&self, cmd: &redis::Cmd) -> StorageResult<T> {
        let mut conn = self.connection().await?;
        match cmd.query_async(&mut conn).await {
            Ok(value) => Ok(value),
            Err(e) => {
                if e.is_io_error() || e.is_connection_dropped() {
                    self.reset().await;
                }
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.query(redis::cmd("GET").arg(key)).await
    }

    async fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.query(redis::cmd("SET").arg(key).arg(value)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_server_fails_per_call() {
        let store = RedisStore::open("redis://127.0.0.1:1").unwrap();
        assert!(store.get("a").await.is_err());
        assert!(store.set("a", "1").await.is_err());
    }

    #[test]
    fn test_bad_url_rejected() {
        assert!(RedisStore::open("not a url").is_err());
    }
}

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use serde_json::Value;

use super::KeyValueStore;
use crate::error::GatewayError;

/// Redis-backed store. Each table is a hash whose fields are record keys and
/// whose values are JSON text.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
    key_prefix: Option<String>,
}

impl fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .field("connection", &"<ConnectionManager>")
            .finish()
    }
}

impl RedisStore {
    pub async fn connect(url: &str) -> Result<Self, GatewayError> {
        let client = redis::Client::open(url)
            .map_err(|e| GatewayError::storage(format!("Failed to create Redis client: {}", e)))?;

        let connection = ConnectionManager::new(client)
            .await
            .map_err(|e| GatewayError::storage(format!("Failed to connect to Redis: {}", e)))?;

        tracing::info!("Connected to Redis store");
        Ok(Self {
            connection,
            key_prefix: None,
        })
    }

    /// Namespaces every table hash under `prefix:`.
    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    fn hash_key(&self, table: &str) -> String {
        match &self.key_prefix {
            Some(prefix) => format!("{}:{}", prefix, table),
            None => table.to_string(),
        }
    }
}

fn decode(table: &str, key: &str, raw: &str) -> Result<Value, GatewayError> {
    serde_json::from_str(raw).map_err(|e| {
        GatewayError::storage(format!(
            "Corrupt document '{}' in table '{}': {}",
            key, table, e
        ))
    })
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, GatewayError> {
        let mut conn = self.connection.clone();

        let raw: Option<String> = conn.hget(self.hash_key(table), key).await.map_err(|e| {
            GatewayError::storage(format!("Failed to get key '{}': {}", key, e))
        })?;

        raw.map(|raw| decode(table, key, &raw)).transpose()
    }

    async fn put(&self, table: &str, key: &str, value: &Value) -> Result<(), GatewayError> {
        let mut conn = self.connection.clone();
        let raw = serde_json::to_string(value)?;

        let _: () = conn
            .hset(self.hash_key(table), key, raw)
            .await
            .map_err(|e| GatewayError::storage(format!("Failed to put key '{}': {}", key, e)))?;

        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<bool, GatewayError> {
        let mut conn = self.connection.clone();

        let removed: i64 = conn.hdel(self.hash_key(table), key).await.map_err(|e| {
            GatewayError::storage(format!("Failed to delete key '{}': {}", key, e))
        })?;

        Ok(removed > 0)
    }

    async fn scan(&self, table: &str) -> Result<Vec<(String, Value)>, GatewayError> {
        let mut conn = self.connection.clone();

        let rows: HashMap<String, String> =
            conn.hgetall(self.hash_key(table)).await.map_err(|e| {
                GatewayError::storage(format!("Failed to scan table '{}': {}", table, e))
            })?;

        rows.into_iter()
            .map(|(key, raw)| decode(table, &key, &raw).map(|value| (key, value)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // These tests require a running Redis instance
    // Run with: cargo test -- --ignored

    async fn test_store() -> RedisStore {
        RedisStore::connect("redis://127.0.0.1:6379")
            .await
            .unwrap()
            .with_key_prefix("gateway-test")
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_put_get_delete() {
        let store = test_store().await;

        store.put("entries", "foo", &json!({"a": 1})).await.unwrap();
        assert_eq!(
            store.get("entries", "foo").await.unwrap(),
            Some(json!({"a": 1}))
        );

        assert!(store.delete("entries", "foo").await.unwrap());
        assert_eq!(store.get("entries", "foo").await.unwrap(), None);
    }

    #[tokio::test]
    #[ignore = "Requires running Redis instance"]
    async fn test_redis_scan() {
        let store = test_store().await;

        store.put("scan", "a", &json!(1)).await.unwrap();
        store.put("scan", "b", &json!("two")).await.unwrap();

        let rows = store.scan("scan").await.unwrap();
        assert_eq!(rows.len(), 2);

        // Cleanup
        store.delete("scan", "a").await.unwrap();
        store.delete("scan", "b").await.unwrap();
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = decode("t", "k", "{not json").unwrap_err();
        assert!(err.to_string().contains("Corrupt document 'k' in table 't'"));
    }
}

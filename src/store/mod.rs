//! Key-value persistence used by the gateway and the record endpoints.
//!
//! A store holds JSON documents grouped into named tables. Single-key reads,
//! writes and deletes are atomic; nothing spans more than one key.

mod memory;
mod redis_store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::GatewayError;

#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches the document stored under `key`, if any.
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, GatewayError>;

    /// Writes `value` under `key`, replacing whatever was there.
    async fn put(&self, table: &str, key: &str, value: &Value) -> Result<(), GatewayError>;

    /// Removes `key`. Returns whether a document was present.
    async fn delete(&self, table: &str, key: &str) -> Result<bool, GatewayError>;

    /// Returns every document in `table`, in no particular order.
    async fn scan(&self, table: &str) -> Result<Vec<(String, Value)>, GatewayError>;
}

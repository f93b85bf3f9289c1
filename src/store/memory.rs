use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;

use super::KeyValueStore;
use crate::error::GatewayError;

// In-process store, one map per table
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: DashMap<String, DashMap<String, Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    // Number of documents in a table
    pub fn len(&self, table: &str) -> usize {
        self.tables.get(table).map(|t| t.len()).unwrap_or(0)
    }

    pub fn is_empty(&self, table: &str) -> bool {
        self.len(table) == 0
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, table: &str, key: &str) -> Result<Option<Value>, GatewayError> {
        Ok(self
            .tables
            .get(table)
            .and_then(|t| t.get(key).map(|v| v.value().clone())))
    }

    async fn put(&self, table: &str, key: &str, value: &Value) -> Result<(), GatewayError> {
        self.tables
            .entry(table.to_string())
            .or_default()
            .insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn delete(&self, table: &str, key: &str) -> Result<bool, GatewayError> {
        Ok(self
            .tables
            .get(table)
            .map(|t| t.remove(key).is_some())
            .unwrap_or(false))
    }

    async fn scan(&self, table: &str) -> Result<Vec<(String, Value)>, GatewayError> {
        Ok(self
            .tables
            .get(table)
            .map(|t| {
                t.iter()
                    .map(|entry| (entry.key().clone(), entry.value().clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        store.put("t", "a", &json!({"v": 1})).await.unwrap();

        assert_eq!(store.get("t", "a").await.unwrap(), Some(json!({"v": 1})));
        assert_eq!(store.get("t", "missing").await.unwrap(), None);
        assert_eq!(store.get("other", "a").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = MemoryStore::new();
        store.put("t", "a", &json!(1)).await.unwrap();
        store.put("t", "a", &json!(2)).await.unwrap();

        assert_eq!(store.get("t", "a").await.unwrap(), Some(json!(2)));
        assert_eq!(store.len("t"), 1);
    }

    #[tokio::test]
    async fn delete_reports_presence() {
        let store = MemoryStore::new();
        store.put("t", "a", &json!(1)).await.unwrap();

        assert!(store.delete("t", "a").await.unwrap());
        assert!(!store.delete("t", "a").await.unwrap());
        assert!(!store.delete("nope", "a").await.unwrap());
        assert!(store.is_empty("t"));
    }

    #[tokio::test]
    async fn scan_is_per_table() {
        let store = MemoryStore::new();
        store.put("t", "a", &json!(1)).await.unwrap();
        store.put("t", "b", &json!(2)).await.unwrap();
        store.put("u", "c", &json!(3)).await.unwrap();

        let mut rows = store.scan("t").await.unwrap();
        rows.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            rows,
            vec![("a".to_string(), json!(1)), ("b".to_string(), json!(2))]
        );
        assert!(store.scan("empty").await.unwrap().is_empty());
    }
}

//! PowerPlays: Pinterest funnel sessions, several per user, looked up by email.
//!
//! Documents are kept as loose JSON because clients patch arbitrary nested
//! fields with dot-notation paths such as `pinterest.niche.niche3`.

use std::sync::Arc;

use serde_json::{Map, Value, json};
use uuid::Uuid;

use super::{normalize_email, now_unix};
use crate::error::GatewayError;
use crate::store::KeyValueStore;

const REQUIRED_FIELDS: [&str; 7] = [
    "topic",
    "businessName",
    "style",
    "colors",
    "fonts",
    "websiteUrl",
    "hasBrand",
];

// Body keys that select the target instead of naming a field
const SELECTOR_KEYS: [&str; 3] = ["email", "method", "id"];

/// Empty Pinterest plan every new PowerPlay starts with.
fn pinterest_skeleton() -> Value {
    let blank = |prefix: &str, count: usize, value: Value| -> Value {
        (1..=count)
            .map(|i| (format!("{}{}", prefix, i), value.clone()))
            .collect::<Map<String, Value>>()
            .into()
    };

    json!({
        "niche": blank("niche", 5, json!("")),
        "affiliate": blank("product", 5, json!("")),
        "board": blank("board", 10, json!("")),
        "pins": blank("day", 31, json!([])),
    })
}

/// Sets `value` at a dot-separated `path`, creating intermediate objects.
pub fn set_path(document: &mut Value, path: &str, value: Value) -> Result<(), GatewayError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(GatewayError::validation(format!(
            "Invalid field path '{}'",
            path
        )));
    }

    let (last, parents) = segments
        .split_last()
        .ok_or_else(|| GatewayError::validation("Empty field path"))?;

    let mut cursor = document;
    for segment in parents {
        let Value::Object(map) = cursor else {
            return Err(GatewayError::validation(format!(
                "Cannot set '{}': '{}' is not an object",
                path, segment
            )));
        };
        cursor = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }

    let Value::Object(map) = cursor else {
        return Err(GatewayError::validation(format!(
            "Cannot set '{}': parent is not an object",
            path
        )));
    };
    map.insert(last.to_string(), value);
    Ok(())
}

fn created_at(document: &Value) -> i64 {
    document
        .get("createdAt")
        .and_then(Value::as_i64)
        .unwrap_or(0)
}

#[derive(Clone)]
pub struct PowerplayRecords {
    store: Arc<dyn KeyValueStore>,
    table: String,
}

impl PowerplayRecords {
    pub fn new(store: Arc<dyn KeyValueStore>, table: impl Into<String>) -> Self {
        Self {
            store,
            table: table.into(),
        }
    }

    pub async fn create(&self, body: Map<String, Value>) -> Result<Value, GatewayError> {
        let email = normalize_email(body.get("email").and_then(Value::as_str))?;

        if let Some(missing) = REQUIRED_FIELDS.iter().find(|f| !body.contains_key(**f)) {
            return Err(GatewayError::validation(format!(
                "Missing required field: {}",
                missing
            )));
        }

        let id = Uuid::new_v4().to_string();
        let mut document = Map::new();
        document.insert("id".into(), json!(id));
        document.insert("email".into(), json!(email));
        document.insert("createdAt".into(), json!(now_unix()));
        for field in REQUIRED_FIELDS {
            document.insert(field.into(), body[field].clone());
        }
        document.insert("pinterest".into(), pinterest_skeleton());

        let document = Value::Object(document);
        self.store.put(&self.table, &id, &document).await?;

        tracing::info!(email = %email, id = %id, "powerplay created");
        Ok(document)
    }

    /// Every PowerPlay owned by `email`, most recent first.
    pub async fn list(&self, email: Option<&str>) -> Result<Vec<Value>, GatewayError> {
        let email = normalize_email(email)?;
        self.owned_by(&email).await
    }

    /// Patches the PowerPlay named by `id`, or the most recent one for the
    /// email when no id is given. Returns the paths that were set.
    pub async fn update(&self, body: Map<String, Value>) -> Result<Vec<String>, GatewayError> {
        let email = normalize_email(body.get("email").and_then(Value::as_str))?;

        let mut document = match body.get("id").and_then(Value::as_str) {
            Some(id) => self
                .store
                .get(&self.table, id)
                .await?
                .filter(|doc| doc.get("email").and_then(Value::as_str) == Some(email.as_str())),
            None => self.owned_by(&email).await?.into_iter().next(),
        }
        .ok_or_else(|| GatewayError::not_found("PowerPlay not found"))?;

        let id = document
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| GatewayError::storage("Stored PowerPlay has no id"))?;

        let mut updated_fields = Vec::new();
        for (path, value) in body {
            if SELECTOR_KEYS.contains(&path.as_str()) {
                continue;
            }
            set_path(&mut document, &path, value)?;
            updated_fields.push(path);
        }
        set_path(&mut document, "lastUpdated", json!(now_unix()))?;

        self.store.put(&self.table, &id, &document).await?;
        tracing::debug!(id = %id, fields = updated_fields.len(), "powerplay updated");
        Ok(updated_fields)
    }

    /// Removes every PowerPlay owned by `email`. Returns the normalized email
    /// and how many were deleted.
    pub async fn delete_all(&self, email: Option<&str>) -> Result<(String, usize), GatewayError> {
        let email = normalize_email(email)?;
        let mut deleted = 0;

        for document in self.owned_by(&email).await? {
            if let Some(id) = document.get("id").and_then(Value::as_str) {
                if self.store.delete(&self.table, id).await? {
                    deleted += 1;
                }
            }
        }

        Ok((email, deleted))
    }

    async fn owned_by(&self, email: &str) -> Result<Vec<Value>, GatewayError> {
        let mut owned: Vec<Value> = self
            .store
            .scan(&self.table)
            .await?
            .into_iter()
            .map(|(_, document)| document)
            .filter(|doc| doc.get("email").and_then(Value::as_str) == Some(email))
            .collect();

        owned.sort_by_key(|doc| std::cmp::Reverse(created_at(doc)));
        Ok(owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn records() -> PowerplayRecords {
        PowerplayRecords::new(Arc::new(MemoryStore::new()), "Powerplays")
    }

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    fn new_powerplay(email: &str) -> Map<String, Value> {
        body(json!({
            "email": email,
            "topic": "baking",
            "businessName": "Crumbs",
            "style": "rustic",
            "colors": ["#fff", "#000"],
            "fonts": ["Lora"],
            "websiteUrl": "https://crumbs.example",
            "hasBrand": true
        }))
    }

    #[test]
    fn skeleton_shape() {
        let skeleton = pinterest_skeleton();
        assert_eq!(skeleton["niche"].as_object().unwrap().len(), 5);
        assert_eq!(skeleton["affiliate"]["product5"], json!(""));
        assert_eq!(skeleton["board"].as_object().unwrap().len(), 10);
        assert_eq!(skeleton["pins"]["day31"], json!([]));
        assert!(skeleton["pins"].get("day32").is_none());
    }

    #[test]
    fn set_path_creates_intermediate_objects() {
        let mut doc = json!({"pinterest": {"niche": {"niche1": ""}}});
        set_path(&mut doc, "pinterest.niche.niche3", json!("vegan")).unwrap();
        set_path(&mut doc, "extra.deep.field", json!(1)).unwrap();

        assert_eq!(doc["pinterest"]["niche"]["niche3"], json!("vegan"));
        assert_eq!(doc["pinterest"]["niche"]["niche1"], json!(""));
        assert_eq!(doc["extra"]["deep"]["field"], json!(1));
    }

    #[test]
    fn set_path_rejects_non_object_parent() {
        let mut doc = json!({"topic": "baking"});
        let err = set_path(&mut doc, "topic.sub", json!(1)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));

        let err = set_path(&mut doc, "a..b", json!(1)).unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn create_builds_document() {
        let powerplays = records();
        let created = powerplays
            .create(new_powerplay(" Sam@Example.com "))
            .await
            .unwrap();

        assert_eq!(created["email"], json!("sam@example.com"));
        assert_eq!(created["hasBrand"], json!(true));
        assert!(Uuid::parse_str(created["id"].as_str().unwrap()).is_ok());
        assert_eq!(created["pinterest"]["board"]["board10"], json!(""));
    }

    #[tokio::test]
    async fn create_reports_first_missing_field() {
        let mut incomplete = new_powerplay("sam@example.com");
        incomplete.remove("fonts");
        let err = records().create(incomplete).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing required field: fonts");
    }

    #[tokio::test]
    async fn list_filters_by_email() {
        let powerplays = records();
        powerplays.create(new_powerplay("sam@example.com")).await.unwrap();
        powerplays.create(new_powerplay("sam@example.com")).await.unwrap();
        powerplays.create(new_powerplay("kim@example.com")).await.unwrap();

        assert_eq!(powerplays.list(Some("SAM@example.com")).await.unwrap().len(), 2);
        assert!(powerplays.list(Some("nobody@example.com")).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_patches_nested_fields() {
        let powerplays = records();
        let created = powerplays.create(new_powerplay("sam@example.com")).await.unwrap();

        let fields = powerplays
            .update(body(json!({
                "email": "sam@example.com",
                "id": created["id"],
                "pinterest.niche.niche3": "sourdough",
                "style": "modern"
            })))
            .await
            .unwrap();
        assert_eq!(fields.len(), 2);
        assert!(fields.contains(&"pinterest.niche.niche3".to_string()));

        let stored = &powerplays.list(Some("sam@example.com")).await.unwrap()[0];
        assert_eq!(stored["pinterest"]["niche"]["niche3"], json!("sourdough"));
        assert_eq!(stored["style"], json!("modern"));
        assert!(stored["lastUpdated"].as_i64().is_some());
    }

    #[tokio::test]
    async fn update_other_users_powerplay_is_not_found() {
        let powerplays = records();
        let created = powerplays.create(new_powerplay("sam@example.com")).await.unwrap();

        let err = powerplays
            .update(body(json!({
                "email": "kim@example.com",
                "id": created["id"],
                "style": "modern"
            })))
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::NotFound { .. }));
    }

    #[tokio::test]
    async fn delete_all_for_email() {
        let powerplays = records();
        powerplays.create(new_powerplay("sam@example.com")).await.unwrap();
        powerplays.create(new_powerplay("sam@example.com")).await.unwrap();
        powerplays.create(new_powerplay("kim@example.com")).await.unwrap();

        let (email, deleted) = powerplays.delete_all(Some("sam@example.com")).await.unwrap();
        assert_eq!(email, "sam@example.com");
        assert_eq!(deleted, 2);
        assert_eq!(powerplays.list(Some("kim@example.com")).await.unwrap().len(), 1);
    }
}
